//! Builder for constructing Settings.

use super::{
    ArtifactSources, Coordinates, PomSettings, RepositorySettings, Settings, SigningSettings,
};
use crate::bundler::{ArchiveFormat, ChecksumAlgorithm, error::Context};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_maven::bundler::{ArchiveFormat, Coordinates, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_maven::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .coordinates(Coordinates::new("com.example", "library", "1.0.0", "jar"))
///     .build_directory("build")
///     .staging_directory("build/publish")
///     .archive_format(ArchiveFormat::TarGz)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    coordinates: Option<Coordinates>,
    pom: PomSettings,
    build_directory: Option<PathBuf>,
    staging_directory: Option<PathBuf>,
    archive_path: Option<PathBuf>,
    archive_format: ArchiveFormat,
    artifact_sources: ArtifactSources,
    optional_artifacts: bool,
    signing: SigningSettings,
    repository: RepositorySettings,
    checksum_algorithms: Option<Vec<ChecksumAlgorithm>>,
    skip_signature_checksums: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the Maven coordinates.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Sets POM metadata for placeholder descriptors.
    pub fn pom(mut self, pom: PomSettings) -> Self {
        self.pom = pom;
        self
    }

    /// Sets the build output directory.
    ///
    /// Default: "build"
    pub fn build_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the staging directory. It is deleted at the start of every run.
    ///
    /// Default: "publish"
    pub fn staging_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the final archive path.
    ///
    /// Default: `<staging parent>/<group-dashed>-<artifactId>-<version>-bundle.<ext>`
    pub fn archive_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the archive format.
    ///
    /// Default: [`ArchiveFormat::Zip`]
    pub fn archive_format(mut self, format: ArchiveFormat) -> Self {
        self.archive_format = format;
        self
    }

    /// Overrides artifact source locations.
    pub fn artifact_sources(mut self, sources: ArtifactSources) -> Self {
        self.artifact_sources = sources;
        self
    }

    /// Marks every artifact optional, which silences placeholder warnings.
    ///
    /// Default: false (all artifacts required)
    pub fn optional_artifacts(mut self, optional: bool) -> Self {
        self.optional_artifacts = optional;
        self
    }

    /// Sets signing configuration.
    pub fn signing(mut self, signing: SigningSettings) -> Self {
        self.signing = signing;
        self
    }

    /// Sets remote repository configuration.
    pub fn repository(mut self, repository: RepositorySettings) -> Self {
        self.repository = repository;
        self
    }

    /// Sets checksum algorithms. Duplicates are dropped, order is kept.
    ///
    /// Default: MD5 and SHA-1
    pub fn checksum_algorithms(mut self, algorithms: Vec<ChecksumAlgorithm>) -> Self {
        self.checksum_algorithms = Some(algorithms);
        self
    }

    /// Whether `.asc` files get checksums.
    ///
    /// Default: true
    pub fn checksum_signatures(mut self, enabled: bool) -> Self {
        self.skip_signature_checksums = !enabled;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - coordinates are missing
    /// - any of group id, artifact id, version or packaging is blank
    /// - a coordinate (or a group segment) contains `/` or `\`, or is `.`
    ///   or `..`, since it would place files outside the staging directory
    /// - the packaging is `asc` or a checksum extension, which would collide
    ///   with the signature and checksum siblings
    pub fn build(self) -> crate::bundler::Result<Settings> {
        let coordinates = self.coordinates.context("coordinates are required")?;

        for (field, value) in [
            ("group id", &coordinates.group_id),
            ("artifact id", &coordinates.artifact_id),
            ("version", &coordinates.version),
            ("packaging", &coordinates.packaging),
        ] {
            if value.trim().is_empty() {
                crate::bail!("{} must not be empty", field);
            }
        }
        if coordinates.group_path().as_os_str().is_empty() {
            crate::bail!("group id '{}' has no path segments", coordinates.group_id);
        }

        for segment in coordinates.group_id.split('.').filter(|s| !s.is_empty()) {
            check_path_segment("group id", segment)?;
        }
        check_path_segment("artifact id", &coordinates.artifact_id)?;
        check_path_segment("version", &coordinates.version)?;
        check_path_segment("packaging", &coordinates.packaging)?;

        let packaging = coordinates.packaging.as_str();
        if packaging == "asc"
            || ChecksumAlgorithm::ALL
                .iter()
                .any(|alg| alg.extension() == packaging)
        {
            crate::bail!(
                "packaging '{}' collides with signature or checksum files",
                packaging
            );
        }

        let staging_directory = self
            .staging_directory
            .unwrap_or_else(|| PathBuf::from("publish"));

        let archive_path = self.archive_path.unwrap_or_else(|| {
            let name = format!(
                "{}.{}",
                coordinates.bundle_file_stem(),
                self.archive_format.extension()
            );
            match staging_directory.parent() {
                Some(parent) => parent.join(name),
                None => PathBuf::from(name),
            }
        });

        let mut algorithms: Vec<ChecksumAlgorithm> = Vec::new();
        for alg in self
            .checksum_algorithms
            .unwrap_or_else(|| ChecksumAlgorithm::DEFAULT.to_vec())
        {
            if !algorithms.contains(&alg) {
                algorithms.push(alg);
            }
        }
        if algorithms.is_empty() {
            crate::bail!("at least one checksum algorithm is required");
        }

        Ok(Settings::new(
            coordinates,
            self.pom,
            self.build_directory
                .unwrap_or_else(|| PathBuf::from("build")),
            staging_directory,
            archive_path,
            self.archive_format,
            self.artifact_sources,
            !self.optional_artifacts,
            self.signing,
            self.repository,
            algorithms,
            !self.skip_signature_checksums,
        ))
    }
}

/// Rejects a value that would not stay a single directory or file name.
fn check_path_segment(field: &str, value: &str) -> crate::bundler::Result<()> {
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        crate::bail!(
            "{} '{}' must not contain path separators or be '.' or '..'",
            field,
            value
        );
    }
    Ok(())
}
