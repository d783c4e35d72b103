//! Main bundle assembly orchestration.
//!
//! This module provides the [`Bundler`] that drives one run of the pipeline
//! through its phases and collects the outcome into a [`Bundle`].

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::bundler::{
    Origin, ResolvedArtifact, Result, Settings,
    utils::archive::write_archive,
};

use super::{
    checksum::{ChecksumRecord, write_checksums},
    layout::RepositoryLayout,
    report::{BundleReport, DEFAULT_UPLOAD_URL, scan_directory},
    resolver::ArtifactResolver,
    signing::{Signature, SignatureEngine},
};

/// Pipeline phases, in the only order they are ever entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Settings accepted.
    Init,
    /// Staging directory reset.
    Stage,
    /// Artifacts located or substituted.
    Resolve,
    /// Artifacts copied into the repository layout.
    Layout,
    /// Checksums written for every artifact.
    Checksum,
    /// Signatures written, plus their checksums.
    Sign,
    /// Staging tree archived.
    Archive,
    /// Manifest produced.
    Report,
    /// Run complete.
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Init => "INIT",
            Phase::Stage => "STAGE",
            Phase::Resolve => "RESOLVE",
            Phase::Layout => "LAYOUT",
            Phase::Checksum => "CHECKSUM",
            Phase::Sign => "SIGN",
            Phase::Archive => "ARCHIVE",
            Phase::Report => "REPORT",
            Phase::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// A non-fatal problem absorbed during a run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BundleWarning {
    /// Phase that raised it.
    pub phase: Phase,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for BundleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

/// Outcome of one [`Bundler::bundle`] call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Bundle {
    /// Staging root, left on disk for inspection.
    pub staging_dir: PathBuf,
    /// `group/artifact/version` directory inside the staging root.
    pub version_dir: PathBuf,
    /// Staged artifacts, one per spec.
    pub artifacts: Vec<ResolvedArtifact>,
    /// Every checksum written, artifacts first then signatures.
    pub checksums: Vec<ChecksumRecord>,
    /// One signature per staged artifact.
    pub signatures: Vec<Signature>,
    /// The archive, when it could be written.
    pub archive: Option<PathBuf>,
    /// Problems absorbed along the way.
    pub warnings: Vec<BundleWarning>,
    /// Final manifest.
    pub report: BundleReport,
}

impl Bundle {
    /// Whether any staged file is a placeholder.
    pub fn has_placeholders(&self) -> bool {
        self.artifacts.iter().any(|a| a.origin.is_placeholder())
            || self.signatures.iter().any(|s| s.origin.is_placeholder())
            || self.checksums.iter().any(|c| c.origin.is_placeholder())
    }
}

/// Phase tracker and warning accumulator for a single run.
struct Run {
    phase: Phase,
    warnings: Vec<BundleWarning>,
}

impl Run {
    fn new() -> Self {
        log::debug!("Bundle phase: {}", Phase::Init);
        Self {
            phase: Phase::Init,
            warnings: Vec::new(),
        }
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(next > self.phase, "phase {next} entered after {}", self.phase);
        log::debug!("Bundle phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(BundleWarning {
            phase: self.phase,
            message: message.into(),
        });
    }
}

/// Release bundle assembler.
///
/// Drives resolve, layout, checksum, sign, archive and report for the
/// component described by its [`Settings`]. Missing inputs and tool failures
/// become placeholders and warnings; only a staging directory that cannot be
/// prepared aborts the run.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_maven::bundler::{Bundler, Coordinates, SettingsBuilder};
///
/// # async fn example() -> kodegen_bundler_maven::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .coordinates(Coordinates::new("com.example", "library", "1.0.0", "aar"))
///     .build_directory("library/build")
///     .staging_directory("publish")
///     .build()?;
///
/// let bundle = Bundler::new(settings).bundle().await?;
/// println!("{}", bundle.report);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a bundler for `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Settings this bundler runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the full pipeline once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Staging`](crate::bundler::Error::Staging) when the
    /// staging directory cannot be reset. Nothing else is reported as an
    /// error; see [`Bundle::warnings`].
    pub async fn bundle(&self) -> Result<Bundle> {
        let settings = &self.settings;
        let coordinates = settings.coordinates();
        let mut run = Run::new();
        log::info!(
            "Assembling Maven bundle for {}",
            coordinates.deployment_name()
        );

        run.enter(Phase::Stage);
        let layout = RepositoryLayout::new(settings.staging_directory(), coordinates);
        layout.prepare().await?;

        let temp = tempfile::Builder::new()
            .prefix("kodegen-maven-placeholders-")
            .tempdir();
        let placeholder_dir = match &temp {
            Ok(dir) => dir.path().to_path_buf(),
            Err(e) => {
                // Layout writes placeholders in place when these cannot be copied.
                run.warn(format!("Cannot create placeholder directory: {e}"));
                std::env::temp_dir().join(format!(
                    "kodegen-maven-placeholders-{}",
                    std::process::id()
                ))
            }
        };

        run.enter(Phase::Resolve);
        let specs = settings.artifact_specs();
        let resolved = ArtifactResolver::new(settings, &placeholder_dir)
            .resolve_all(&specs)
            .await;
        for artifact in resolved.iter().filter(|a| a.origin.is_placeholder()) {
            if artifact.spec.required {
                run.warn(format!(
                    "{} artifact not found at {}, using a placeholder",
                    artifact.spec.name(),
                    artifact.spec.source.display()
                ));
            }
        }

        run.enter(Phase::Layout);
        let mut artifacts = Vec::with_capacity(resolved.len());
        for artifact in &resolved {
            let staged = layout.place(artifact, coordinates, settings.pom()).await;
            if staged.origin.is_placeholder() && !artifact.origin.is_placeholder() {
                run.warn(format!(
                    "Copying {} failed, a placeholder was staged instead",
                    artifact.path.display()
                ));
            }
            artifacts.push(staged);
        }

        run.enter(Phase::Checksum);
        let algorithms = settings.checksum_algorithms();
        let mut checksums = Vec::new();
        for artifact in &artifacts {
            let records = write_checksums(&artifact.path, algorithms, artifact.origin).await;
            if !artifact.origin.is_placeholder() && records.iter().any(|r| r.origin.is_placeholder())
            {
                run.warn(format!(
                    "Could not hash {}, zero digests written",
                    artifact.spec.destination
                ));
            }
            checksums.extend(records);
        }

        run.enter(Phase::Sign);
        let engine = SignatureEngine::probe(settings.signing()).await;
        if !engine.is_available() {
            run.warn(format!(
                "Signing tool `{}` is unavailable, all signatures are placeholders",
                settings.signing().program()
            ));
        }
        let mut signatures = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            let signature = engine.sign(&artifact.path).await;
            if engine.is_available() && signature.origin.is_placeholder() {
                run.warn(format!(
                    "Signing {} failed, a placeholder signature was written",
                    artifact.spec.destination
                ));
            }
            signatures.push(signature);
        }
        if settings.checksum_signatures() {
            for signature in &signatures {
                checksums.extend(write_checksums(&signature.path, algorithms, signature.origin).await);
            }
        }

        run.enter(Phase::Archive);
        let archive = match write_archive(
            layout.root(),
            settings.archive_path(),
            settings.archive_format(),
        )
        .await
        {
            Ok(count) => {
                log::info!(
                    "✓ Archived {} files into {}",
                    count,
                    settings.archive_path().display()
                );
                Some(settings.archive_path().to_path_buf())
            }
            Err(e) => {
                log::warn!("Failed to create bundle archive: {e}");
                run.warn(format!("Failed to create bundle archive: {e}"));
                None
            }
        };

        run.enter(Phase::Report);
        let placeholders: HashSet<&Path> = artifacts
            .iter()
            .filter(|a| a.origin.is_placeholder())
            .map(|a| a.path.as_path())
            .chain(
                signatures
                    .iter()
                    .filter(|s| s.origin.is_placeholder())
                    .map(|s| s.path.as_path()),
            )
            .chain(
                checksums
                    .iter()
                    .filter(|c| c.origin.is_placeholder())
                    .map(|c| c.path.as_path()),
            )
            .collect();
        let entries = match scan_directory(
            layout.version_dir(),
            Some(coordinates.packaging.as_str()),
            |path| {
                if placeholders.contains(path) {
                    Origin::Placeholder
                } else {
                    Origin::Real
                }
            },
        ) {
            Ok(entries) => entries,
            Err(e) => {
                run.warn(format!("Cannot list staged files: {e}"));
                Vec::new()
            }
        };
        let upload_url = settings
            .repository()
            .url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string());
        let report = BundleReport {
            coordinates: coordinates.clone(),
            layout_path: layout.display_path(),
            staging_dir: layout.root().to_path_buf(),
            archive: archive.clone(),
            entries,
            warnings: run.warnings.len(),
            upload_url,
            generated_at: chrono::Utc::now(),
        };

        run.enter(Phase::Done);
        for warning in &run.warnings {
            log::debug!("{warning}");
        }
        log::info!(
            "Bundle assembled with {} warning(s), {} placeholder file(s)",
            run.warnings.len(),
            report.placeholder_count()
        );

        // Keep the placeholder directory alive until every copy is done.
        drop(temp);

        Ok(Bundle {
            staging_dir: layout.root().to_path_buf(),
            version_dir: layout.version_dir().to_path_buf(),
            artifacts,
            checksums,
            signatures,
            archive,
            warnings: run.warnings,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Coordinates, SettingsBuilder, SigningSettings};

    fn settings(root: &Path) -> Settings {
        SettingsBuilder::new()
            .coordinates(Coordinates::new("com.example.lib", "core", "2.0.0", "jar"))
            .build_directory(root.join("build"))
            .staging_directory(root.join("publish"))
            .signing(SigningSettings {
                program: Some("kodegen-no-such-gpg".into()),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Init < Phase::Stage);
        assert!(Phase::Checksum < Phase::Sign);
        assert!(Phase::Report < Phase::Done);
        assert_eq!(Phase::Archive.to_string(), "ARCHIVE");
    }

    #[tokio::test]
    async fn empty_build_yields_complete_placeholder_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = Bundler::new(settings(dir.path())).bundle().await.unwrap();

        assert_eq!(bundle.artifacts.len(), 4);
        assert_eq!(bundle.signatures.len(), 4);
        // 4 artifacts + 4 signatures, two algorithms each.
        assert_eq!(bundle.checksums.len(), 16);
        assert!(bundle.has_placeholders());
        assert!(bundle.archive.as_ref().is_some_and(|a| a.is_file()));

        let version_dir = dir.path().join("publish/com/example/lib/core/2.0.0");
        assert_eq!(bundle.version_dir, version_dir);
        assert_eq!(
            std::fs::metadata(version_dir.join("core-2.0.0.jar")).unwrap().len(),
            0
        );
        assert_eq!(
            std::fs::read_to_string(version_dir.join("core-2.0.0.jar.sha1")).unwrap(),
            "0".repeat(40)
        );

        let phases: Vec<Phase> = bundle.warnings.iter().map(|w| w.phase).collect();
        assert!(phases.contains(&Phase::Resolve));
        assert!(phases.contains(&Phase::Sign));
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(bundle.report.warnings, bundle.warnings.len());
        assert_eq!(bundle.report.entries.len(), 4 * 2 + 16);
        assert_eq!(bundle.report.placeholder_count(), bundle.report.entries.len());
    }

    #[tokio::test]
    async fn unarchivable_destination_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let settings = SettingsBuilder::new()
            .coordinates(Coordinates::new("com.example", "core", "1.0", "jar"))
            .build_directory(dir.path().join("build"))
            .staging_directory(dir.path().join("publish"))
            .archive_path(blocker.join("bundle.zip"))
            .signing(SigningSettings {
                program: Some("kodegen-no-such-gpg".into()),
                ..Default::default()
            })
            .build()
            .unwrap();

        let bundle = Bundler::new(settings).bundle().await.unwrap();
        assert!(bundle.archive.is_none());
        assert!(bundle.warnings.iter().any(|w| w.phase == Phase::Archive));
        assert!(bundle.report.to_string().contains("NOT created"));
    }

    #[tokio::test]
    async fn signature_checksums_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .coordinates(Coordinates::new("com.example", "core", "1.0", "jar"))
            .build_directory(dir.path().join("build"))
            .staging_directory(dir.path().join("publish"))
            .checksum_signatures(false)
            .signing(SigningSettings {
                program: Some("kodegen-no-such-gpg".into()),
                ..Default::default()
            })
            .build()
            .unwrap();

        let bundle = Bundler::new(settings).bundle().await.unwrap();
        assert_eq!(bundle.checksums.len(), 8);
        assert!(!bundle.version_dir.join("core-1.0.jar.asc.md5").exists());
    }
}
