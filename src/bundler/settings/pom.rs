//! Project metadata used to render a placeholder POM descriptor.

/// Descriptive POM metadata.
///
/// Only consulted when the build did not produce a POM and a placeholder has
/// to be synthesized. Maps from the `[pom]` section of the config file:
///
/// ```toml
/// [pom]
/// name = "Example Library"
/// description = "Does example things"
/// url = "https://github.com/example/library"
///
/// [[pom.licenses]]
/// name = "MIT License"
/// url = "https://opensource.org/licenses/MIT"
///
/// [[pom.developers]]
/// id = "example"
/// name = "Example"
/// email = "dev@example.com"
///
/// [pom.scm]
/// connection = "scm:git:git://github.com/example/library.git"
/// developer_connection = "scm:git:ssh://github.com:example/library.git"
/// url = "https://github.com/example/library"
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct PomSettings {
    /// Human readable project name.
    pub name: Option<String>,

    /// One-line project description.
    pub description: Option<String>,

    /// Project homepage.
    pub url: Option<String>,

    /// Licenses the project is published under.
    pub licenses: Vec<LicenseSettings>,

    /// Project developers.
    pub developers: Vec<DeveloperSettings>,

    /// Source control coordinates.
    pub scm: Option<ScmSettings>,
}

/// A `<license>` entry.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct LicenseSettings {
    /// License name, e.g. "MIT License".
    pub name: String,
    /// License text URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// A `<developer>` entry.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct DeveloperSettings {
    /// Developer id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// The `<scm>` block.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct ScmSettings {
    /// Read-only connection string.
    #[serde(default)]
    pub connection: Option<String>,
    /// Read-write connection string.
    #[serde(default)]
    pub developer_connection: Option<String>,
    /// Browsable URL.
    #[serde(default)]
    pub url: Option<String>,
}
