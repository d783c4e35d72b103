//! Core Settings struct and implementations.

use super::{Coordinates, PomSettings, RepositorySettings, SigningSettings};
use crate::bundler::{ArchiveFormat, ArtifactKind, ArtifactSpec, ChecksumAlgorithm};
use std::path::{Path, PathBuf};

/// Source path overrides for individual artifacts.
///
/// Any artifact left as `None` is looked up at its Gradle default location
/// under the build directory (see [`Settings::artifact_specs`]).
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct ArtifactSources {
    /// Compiled binary.
    pub primary: Option<PathBuf>,
    /// POM descriptor.
    pub pom: Option<PathBuf>,
    /// Javadoc JAR.
    pub javadoc: Option<PathBuf>,
    /// Sources JAR.
    pub sources: Option<PathBuf>,
}

impl ArtifactSources {
    /// Override for `kind`, if any.
    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        match kind {
            ArtifactKind::Primary => self.primary.as_deref(),
            ArtifactKind::Pom => self.pom.as_deref(),
            ArtifactKind::Javadoc => self.javadoc.as_deref(),
            ArtifactKind::Sources => self.sources.as_deref(),
        }
    }
}

/// Main settings for one bundle run.
///
/// Everything the pipeline reads comes from here; there is no other shared
/// state. Constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_maven::bundler::{Coordinates, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_maven::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .coordinates(Coordinates::new("com.example", "library", "1.0.0", "aar"))
///     .build_directory("library/build")
///     .staging_directory("publish")
///     .build()?;
/// assert_eq!(settings.artifact_specs().len(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    coordinates: Coordinates,
    pom: PomSettings,

    /// Root of the build outputs.
    build_directory: PathBuf,

    /// Top-level directory that is wiped and rebuilt on every run.
    staging_directory: PathBuf,

    archive_path: PathBuf,
    archive_format: ArchiveFormat,

    artifact_sources: ArtifactSources,
    required: bool,

    signing: SigningSettings,
    repository: RepositorySettings,

    checksum_algorithms: Vec<ChecksumAlgorithm>,
    checksum_signatures: bool,
}

impl Settings {
    /// Returns the Maven coordinates.
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    /// Returns the POM metadata used for placeholder descriptors.
    pub fn pom(&self) -> &PomSettings {
        &self.pom
    }

    /// Returns the build output directory.
    pub fn build_directory(&self) -> &Path {
        &self.build_directory
    }

    /// Returns the staging directory.
    pub fn staging_directory(&self) -> &Path {
        &self.staging_directory
    }

    /// Returns the final archive path.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Returns the archive format.
    pub fn archive_format(&self) -> ArchiveFormat {
        self.archive_format
    }

    /// Returns signing configuration.
    pub fn signing(&self) -> &SigningSettings {
        &self.signing
    }

    /// Returns remote repository configuration.
    pub fn repository(&self) -> &RepositorySettings {
        &self.repository
    }

    /// Returns the checksum algorithms, in output order.
    pub fn checksum_algorithms(&self) -> &[ChecksumAlgorithm] {
        &self.checksum_algorithms
    }

    /// Whether signature files get checksums of their own.
    pub fn checksum_signatures(&self) -> bool {
        self.checksum_signatures
    }

    /// The declarative artifact table.
    ///
    /// Default source locations follow the Gradle Android library layout:
    ///
    /// | Kind    | Source                                                    |
    /// |---------|-----------------------------------------------------------|
    /// | primary | `outputs/<packaging>/<artifactId>-release.<packaging>`    |
    /// | pom     | `publications/release/pom-default.xml`                    |
    /// | javadoc | `libs/<artifactId>-<version>-javadoc.jar`                 |
    /// | sources | `libs/<artifactId>-<version>-sources.jar`                 |
    ///
    /// With `pom` packaging (a BOM or parent POM) the descriptor is the
    /// primary artifact, so the table has no separate primary row.
    pub fn artifact_specs(&self) -> Vec<ArtifactSpec> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|&kind| !(kind == ArtifactKind::Primary && self.coordinates.is_pom_only()))
            .map(|kind| ArtifactSpec {
                kind,
                source: self
                    .artifact_sources
                    .get(kind)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.default_source(kind)),
                destination: self.destination_name(kind),
                required: self.required,
            })
            .collect()
    }

    /// Canonical staged file name for `kind`.
    pub fn destination_name(&self, kind: ArtifactKind) -> String {
        let stem = self.coordinates.file_stem();
        match kind {
            ArtifactKind::Primary => format!("{stem}.{}", self.coordinates.packaging),
            ArtifactKind::Pom => format!("{stem}.pom"),
            ArtifactKind::Javadoc => format!("{stem}-javadoc.jar"),
            ArtifactKind::Sources => format!("{stem}-sources.jar"),
        }
    }

    fn default_source(&self, kind: ArtifactKind) -> PathBuf {
        let coords = &self.coordinates;
        match kind {
            ArtifactKind::Primary => self
                .build_directory
                .join("outputs")
                .join(&coords.packaging)
                .join(format!("{}-release.{}", coords.artifact_id, coords.packaging)),
            ArtifactKind::Pom => self
                .build_directory
                .join("publications")
                .join("release")
                .join("pom-default.xml"),
            ArtifactKind::Javadoc => self
                .build_directory
                .join("libs")
                .join(format!("{}-javadoc.jar", coords.file_stem())),
            ArtifactKind::Sources => self
                .build_directory
                .join("libs")
                .join(format!("{}-sources.jar", coords.file_stem())),
        }
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        coordinates: Coordinates,
        pom: PomSettings,
        build_directory: PathBuf,
        staging_directory: PathBuf,
        archive_path: PathBuf,
        archive_format: ArchiveFormat,
        artifact_sources: ArtifactSources,
        required: bool,
        signing: SigningSettings,
        repository: RepositorySettings,
        checksum_algorithms: Vec<ChecksumAlgorithm>,
        checksum_signatures: bool,
    ) -> Self {
        Self {
            coordinates,
            pom,
            build_directory,
            staging_directory,
            archive_path,
            archive_format,
            artifact_sources,
            required,
            signing,
            repository,
            checksum_algorithms,
            checksum_signatures,
        }
    }
}
