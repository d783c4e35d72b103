//! Maven coordinates and the repository naming convention derived from them.

use std::path::PathBuf;

/// Maven coordinates identifying the published component.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_maven::bundler::Coordinates;
///
/// let coords = Coordinates::new("com.example.lib", "library", "1.0.1", "aar");
/// assert_eq!(coords.file_stem(), "library-1.0.1");
/// assert_eq!(coords.deployment_name(), "com.example.lib:library:1.0.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Coordinates {
    /// Dotted group identifier, e.g. "com.example.lib".
    pub group_id: String,

    /// Artifact identifier, e.g. "library".
    pub artifact_id: String,

    /// Version string, e.g. "1.0.1".
    pub version: String,

    /// Extension of the primary artifact.
    ///
    /// Default: "jar"
    #[serde(default = "default_packaging")]
    pub packaging: String,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl Coordinates {
    /// Creates coordinates from their parts.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: packaging.into(),
        }
    }

    /// Group identifier split on '.' into path segments.
    ///
    /// Empty segments (from leading, trailing or doubled dots) are dropped.
    pub fn group_path(&self) -> PathBuf {
        self.group_id
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Relative path `group/path/artifactId/version`.
    pub fn repository_path(&self) -> PathBuf {
        self.group_path()
            .join(&self.artifact_id)
            .join(&self.version)
    }

    /// `<artifactId>-<version>`, the prefix shared by every staged file.
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.artifact_id, self.version)
    }

    /// `groupId:artifactId:version`, used as the deployment name on upload.
    pub fn deployment_name(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// True for `pom` packaging, where the POM is the only primary file.
    pub fn is_pom_only(&self) -> bool {
        self.packaging == "pom"
    }

    /// Default archive file name: dots in the group become dashes.
    pub fn bundle_file_stem(&self) -> String {
        format!(
            "{}-{}-{}-bundle",
            self.group_id.replace('.', "-"),
            self.artifact_id,
            self.version
        )
    }
}
