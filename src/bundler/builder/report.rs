//! Bundle contents classification and the final human-readable manifest.

use super::checksum::ChecksumAlgorithm;
use crate::bundler::{Coordinates, Origin, Result, placeholder};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

/// Where the manual upload happens when no repository URL is configured.
pub const DEFAULT_UPLOAD_URL: &str = "https://central.sonatype.com/publishing";

/// Role of a staged file, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    /// The compiled binary.
    PrimaryArtifact,
    /// The POM.
    PomDescriptor,
    /// Documentation archive.
    JavadocJar,
    /// Source archive.
    SourcesJar,
    /// Detached signature.
    Signature,
    /// Checksum sibling.
    Checksum(ChecksumAlgorithm),
    /// Anything else.
    Unknown,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::PrimaryArtifact => f.write_str("Primary artifact"),
            FileKind::PomDescriptor => f.write_str("POM descriptor"),
            FileKind::JavadocJar => f.write_str("Javadoc JAR"),
            FileKind::SourcesJar => f.write_str("Sources JAR"),
            FileKind::Signature => f.write_str("PGP signature"),
            FileKind::Checksum(alg) => write!(f, "{alg} checksum ({}-bit)", alg.bits()),
            FileKind::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Classifies `file_name` by suffix.
///
/// Checksum and signature suffixes are tested first so `x.jar.sha1` is a
/// checksum and not a JAR; the classifier suffixes are tested before the
/// packaging extension so `-sources.jar` wins over `.jar`.
pub fn classify(file_name: &str, packaging: Option<&str>) -> FileKind {
    if let Some((_, ext)) = file_name.rsplit_once('.')
        && let Some(alg) = ChecksumAlgorithm::parse(ext)
        && alg.extension() == ext
    {
        return FileKind::Checksum(alg);
    }
    if file_name.ends_with(".asc") {
        return FileKind::Signature;
    }
    if file_name.ends_with("-javadoc.jar") {
        return FileKind::JavadocJar;
    }
    if file_name.ends_with("-sources.jar") {
        return FileKind::SourcesJar;
    }
    if file_name.ends_with(".pom") {
        return FileKind::PomDescriptor;
    }
    match packaging {
        Some(ext) if file_name.ends_with(&format!(".{ext}")) => FileKind::PrimaryArtifact,
        _ => FileKind::Unknown,
    }
}

/// Guesses the packaging extension from a list of file names in one
/// version directory: the primary is `<stem>.<ext>` next to `<stem>.pom`.
pub fn infer_packaging<'a>(file_names: impl IntoIterator<Item = &'a str> + Clone) -> Option<String> {
    file_names.clone().into_iter().find_map(|pom| {
        let stem = pom.strip_suffix(".pom")?;
        file_names.clone().into_iter().find_map(|candidate| {
            let ext = candidate.strip_prefix(stem)?.strip_prefix('.')?;
            let simple = !ext.is_empty() && !ext.contains('.') && ext != "pom" && ext != "asc";
            (simple && ChecksumAlgorithm::parse(ext).is_none()).then(|| ext.to_string())
        })
    })
}

/// One line of the manifest.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReportEntry {
    /// Path relative to the directory that was scanned.
    pub name: String,
    /// Absolute or staging-relative location on disk.
    pub path: PathBuf,
    /// Classification.
    pub kind: FileKind,
    /// Real content or placeholder.
    pub origin: Origin,
}

/// Walks `dir` and classifies every regular file, in sorted order.
///
/// `origin_of` decides whether a file is real; packaging is inferred per
/// directory unless `packaging` is given.
pub fn scan_directory(
    dir: &Path,
    packaging: Option<&str>,
    mut origin_of: impl FnMut(&Path) -> Origin,
) -> Result<Vec<ReportEntry>> {
    let mut by_dir: BTreeMap<PathBuf, Vec<walkdir::DirEntry>> = BTreeMap::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let parent = entry.path().parent().unwrap_or(dir).to_path_buf();
            by_dir.entry(parent).or_default().push(entry);
        }
    }

    let mut entries = Vec::new();
    for files in by_dir.values() {
        let names: Vec<String> = files
            .iter()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        let packaging = packaging
            .map(String::from)
            .or_else(|| infer_packaging(names.iter().map(String::as_str)));

        for (entry, file_name) in files.iter().zip(&names) {
            let name = entry
                .path()
                .strip_prefix(dir)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(ReportEntry {
                name,
                path: entry.path().to_path_buf(),
                kind: classify(file_name, packaging.as_deref()),
                origin: origin_of(entry.path()),
            });
        }
    }
    Ok(entries)
}

/// Origin decided by looking at file contents.
pub fn origin_from_contents(path: &Path) -> Origin {
    match std::fs::read(path) {
        Ok(bytes) if !placeholder::is_placeholder_content(&bytes) => Origin::Real,
        _ => Origin::Placeholder,
    }
}

/// Final summary of a bundle run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BundleReport {
    /// Component coordinates.
    pub coordinates: Coordinates,
    /// `group/path/artifact/version/`.
    pub layout_path: String,
    /// Staging directory root.
    pub staging_dir: PathBuf,
    /// Archive written, if archiving succeeded.
    pub archive: Option<PathBuf>,
    /// Files in the version directory.
    pub entries: Vec<ReportEntry>,
    /// Number of warnings raised during the run.
    pub warnings: usize,
    /// Where to upload the archive.
    pub upload_url: String,
    /// When the report was produced.
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl BundleReport {
    /// Number of placeholder files in the bundle.
    pub fn placeholder_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.origin.is_placeholder())
            .count()
    }

    /// True when every file holds real content.
    pub fn is_publishable(&self) -> bool {
        self.archive.is_some() && self.placeholder_count() == 0
    }
}

impl fmt::Display for BundleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Maven Central Bundle Contents ===")?;
        match &self.archive {
            Some(archive) => writeln!(f, "Bundle created at: {}", archive.display())?,
            None => writeln!(f, "Bundle archive was NOT created (see warnings above)")?,
        }
        writeln!(f)?;
        writeln!(f, "Maven Repository Layout:")?;
        writeln!(f, "{}", self.layout_path)?;
        writeln!(f)?;
        writeln!(f, "Files included:")?;
        for entry in &self.entries {
            match entry.origin {
                Origin::Real => writeln!(f, "- {} ({})", entry.name, entry.kind)?,
                Origin::Placeholder => {
                    writeln!(f, "- {} ({}) [PLACEHOLDER]", entry.name, entry.kind)?
                }
            }
        }

        let placeholders = self.placeholder_count();
        if placeholders > 0 {
            writeln!(f)?;
            writeln!(
                f,
                "WARNING: {} file(s) are placeholders. Do not publish this bundle as-is.",
                placeholders
            )?;
        }

        writeln!(f)?;
        writeln!(f, "To publish to Maven Central:")?;
        writeln!(f, "1. Go to {}", self.upload_url)?;
        writeln!(f, "2. Click on 'Publish Component'")?;
        writeln!(
            f,
            "3. Enter deployment name: {}",
            self.coordinates.deployment_name()
        )?;
        match &self.archive {
            Some(archive) => writeln!(f, "4. Upload the bundle: {}", archive.display()),
            None => writeln!(
                f,
                "4. Archive {} manually and upload it",
                self.staging_dir.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_suffix() {
        let aar = Some("aar");
        assert_eq!(classify("library-1.0.aar", aar), FileKind::PrimaryArtifact);
        assert_eq!(classify("library-1.0.pom", aar), FileKind::PomDescriptor);
        assert_eq!(classify("library-1.0-javadoc.jar", aar), FileKind::JavadocJar);
        assert_eq!(classify("library-1.0-sources.jar", aar), FileKind::SourcesJar);
        assert_eq!(classify("library-1.0.aar.asc", aar), FileKind::Signature);
        assert_eq!(
            classify("library-1.0.aar.md5", aar),
            FileKind::Checksum(ChecksumAlgorithm::Md5)
        );
        assert_eq!(
            classify("library-1.0.pom.asc.sha1", aar),
            FileKind::Checksum(ChecksumAlgorithm::Sha1)
        );
        assert_eq!(classify("notes.txt", aar), FileKind::Unknown);
    }

    #[test]
    fn jar_packaging_does_not_swallow_classifiers() {
        let jar = Some("jar");
        assert_eq!(classify("core-2.0.jar", jar), FileKind::PrimaryArtifact);
        assert_eq!(classify("core-2.0-sources.jar", jar), FileKind::SourcesJar);
        assert_eq!(classify("core-2.0-javadoc.jar", jar), FileKind::JavadocJar);
        assert_eq!(classify("core-2.0.jar", None), FileKind::Unknown);
    }

    #[test]
    fn checksum_labels_carry_width() {
        assert_eq!(
            FileKind::Checksum(ChecksumAlgorithm::Md5).to_string(),
            "MD5 checksum (128-bit)"
        );
        assert_eq!(
            FileKind::Checksum(ChecksumAlgorithm::Sha1).to_string(),
            "SHA-1 checksum (160-bit)"
        );
    }

    #[test]
    fn packaging_is_inferred_from_pom_sibling() {
        let names = [
            "lib-1.0-javadoc.jar",
            "lib-1.0.aar",
            "lib-1.0.aar.md5",
            "lib-1.0.pom",
            "lib-1.0.pom.asc",
        ];
        assert_eq!(infer_packaging(names), Some("aar".to_string()));
        assert_eq!(infer_packaging(["lib-1.0.pom", "lib-1.0.pom.md5"]), None);
    }

    #[test]
    fn report_lists_placeholders_and_upload_steps() {
        let report = BundleReport {
            coordinates: Coordinates::new("com.example", "lib", "1.0", "aar"),
            layout_path: "com/example/lib/1.0/".into(),
            staging_dir: PathBuf::from("publish"),
            archive: Some(PathBuf::from("bundle.zip")),
            entries: vec![
                ReportEntry {
                    name: "lib-1.0.aar".into(),
                    path: PathBuf::from("publish/com/example/lib/1.0/lib-1.0.aar"),
                    kind: FileKind::PrimaryArtifact,
                    origin: Origin::Placeholder,
                },
                ReportEntry {
                    name: "lib-1.0.pom".into(),
                    path: PathBuf::from("publish/com/example/lib/1.0/lib-1.0.pom"),
                    kind: FileKind::PomDescriptor,
                    origin: Origin::Real,
                },
            ],
            warnings: 1,
            upload_url: DEFAULT_UPLOAD_URL.into(),
            generated_at: chrono::Utc::now(),
        };
        let text = report.to_string();
        assert!(text.contains("- lib-1.0.aar (Primary artifact) [PLACEHOLDER]"));
        assert!(text.contains("- lib-1.0.pom (POM descriptor)\n"));
        assert!(text.contains("Enter deployment name: com.example:lib:1.0"));
        assert!(text.contains("Upload the bundle: bundle.zip"));
        assert!(!report.is_publishable());
    }

    #[test]
    fn scan_infers_origin_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let version = dir.path().join("com/example/lib/1.0");
        std::fs::create_dir_all(&version).unwrap();
        std::fs::write(version.join("lib-1.0.aar"), b"").unwrap();
        std::fs::write(version.join("lib-1.0.pom"), b"<project/>").unwrap();

        let entries = scan_directory(dir.path(), None, origin_from_contents).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "com/example/lib/1.0/lib-1.0.aar");
        assert_eq!(entries[0].kind, FileKind::PrimaryArtifact);
        assert_eq!(entries[0].origin, Origin::Placeholder);
        assert_eq!(entries[1].origin, Origin::Real);
    }
}
