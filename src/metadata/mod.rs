//! Bundle configuration discovery and loading.
//!
//! A configuration file is optional. It may be a TOML document
//! (`kodegen-bundle.toml`) or a Java `.properties` file such as Gradle's
//! `local.properties`. Relative paths inside it resolve against the file's
//! own directory.

use crate::bundler::{
    ArchiveFormat, ArtifactSources, ChecksumAlgorithm, PomSettings, RepositorySettings,
    SigningSettings,
};
use crate::error::{ConfigError, Result};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Config file looked up in the current directory.
pub const CONFIG_FILE: &str = "kodegen-bundle.toml";

/// Config file looked up under the user's config directory.
pub const USER_CONFIG_FILE: &str = "kodegen/bundler-maven.toml";

/// Coordinates as they appear in a config file, each one optional so the
/// command line can supply the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoordinatesConfig {
    /// Group id, e.g. `com.example.lib`.
    pub group_id: Option<String>,
    /// Artifact id.
    pub artifact_id: Option<String>,
    /// Version.
    pub version: Option<String>,
    /// Packaging extension of the primary artifact.
    pub packaging: Option<String>,
}

/// `[paths]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Build output root.
    pub build_directory: Option<PathBuf>,
    /// Staging root, reset on every run.
    pub staging_directory: Option<PathBuf>,
}

/// `[artifacts]` section: explicit source paths per artifact kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Primary binary.
    pub primary: Option<PathBuf>,
    /// POM descriptor.
    pub pom: Option<PathBuf>,
    /// Javadoc JAR.
    pub javadoc: Option<PathBuf>,
    /// Sources JAR.
    pub sources: Option<PathBuf>,
    /// Treat every artifact as optional.
    pub optional: bool,
}

impl ArtifactsConfig {
    /// Source overrides in builder form.
    pub fn sources(&self) -> ArtifactSources {
        ArtifactSources {
            primary: self.primary.clone(),
            pom: self.pom.clone(),
            javadoc: self.javadoc.clone(),
            sources: self.sources.clone(),
        }
    }
}

/// `[checksums]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChecksumsConfig {
    /// Algorithms to write, in order.
    pub algorithms: Vec<ChecksumAlgorithm>,
    /// Also checksum `.asc` files.
    pub include_signatures: bool,
}

impl Default for ChecksumsConfig {
    fn default() -> Self {
        Self {
            algorithms: ChecksumAlgorithm::DEFAULT.to_vec(),
            include_signatures: true,
        }
    }
}

/// `[archive]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Archive container format.
    pub format: ArchiveFormat,
    /// Archive location.
    pub path: Option<PathBuf>,
}

/// Everything a config file can carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundleManifest {
    /// Maven coordinates.
    pub coordinates: CoordinatesConfig,
    /// Build and staging roots.
    pub paths: PathsConfig,
    /// Per-artifact source overrides.
    pub artifacts: ArtifactsConfig,
    /// POM metadata for placeholder descriptors.
    pub pom: PomSettings,
    /// Signing tool and identity.
    pub signing: SigningSettings,
    /// Upload endpoint and credentials.
    pub repository: RepositorySettings,
    /// Checksum algorithms.
    pub checksums: ChecksumsConfig,
    /// Final archive.
    pub archive: ArchiveConfig,
}

impl BundleManifest {
    /// Resolves every relative path against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let fields = [
            &mut self.paths.build_directory,
            &mut self.paths.staging_directory,
            &mut self.artifacts.primary,
            &mut self.artifacts.pom,
            &mut self.artifacts.javadoc,
            &mut self.artifacts.sources,
            &mut self.signing.gnupg_home,
            &mut self.archive.path,
        ];
        for path in fields.into_iter().flatten() {
            *path = absolutize_from(path, base);
        }
    }
}

/// Makes `path` absolute relative to `base`, leaving it untouched if that
/// fails.
pub fn absolutize_from(path: &Path, base: &Path) -> PathBuf {
    match path.absolutize_from(base) {
        Ok(absolute) => absolute.into_owned(),
        Err(e) => {
            log::debug!("Cannot absolutize {}: {}", path.display(), e);
            path.to_path_buf()
        }
    }
}

/// First existing default config file: `./kodegen-bundle.toml`, then the
/// user-level file under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Loads a config file, TOML or `.properties` depending on its extension.
///
/// Relative paths in the file resolve against its parent directory.
///
/// # Arguments
///
/// * `path` - `kodegen-bundle.toml`, or a `.properties` file such as
///   Gradle's `local.properties`
///
/// # Returns
///
/// * `Ok(BundleManifest)` - Parsed config with absolute paths
/// * `Err` - [`ConfigError::Read`] or a parse error
pub fn load_manifest(path: &Path) -> Result<BundleManifest> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut manifest = if path.extension().is_some_and(|ext| ext == "properties") {
        manifest_from_properties(&parse_properties(&text))?
    } else {
        toml::from_str::<BundleManifest>(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?
    };

    let base = path
        .absolutize()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    manifest.resolve_paths(&base);

    log::debug!("Loaded bundle configuration from {}", path.display());
    Ok(manifest)
}

/// Parses Java `.properties` text.
///
/// Supports `#`/`!` comments, `=`, `:` or whitespace separators, trailing
/// backslash continuations and the common backslash escapes. Later keys win.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut logical = String::new();

    for raw in text.lines() {
        let line = raw.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }
        logical.push_str(line);

        let (key, value) = split_property(&logical);
        properties.insert(unescape(key), unescape(value));
        logical.clear();
    }

    if !logical.is_empty() {
        let (key, value) = split_property(&logical);
        properties.insert(unescape(key), unescape(value));
    }

    properties
}

fn ends_with_continuation(line: &str) -> bool {
    let slashes = line.chars().rev().take_while(|&c| c == '\\').count();
    slashes % 2 == 1
}

fn split_property(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (line[..i].trim_end(), line[i + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..i], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Builds a manifest from Gradle-style properties.
///
/// Recognized keys:
/// - `signing.keyId`, `signing.password`, `signing.gnupgHome`
/// - `mavenCentralUsername`/`mavenCentralPassword`, falling back to
///   `ossrhUsername`/`ossrhPassword`
/// - `GROUP`, `POM_ARTIFACT_ID`, `VERSION_NAME`, `POM_PACKAGING`,
///   `POM_NAME`, `POM_DESCRIPTION`, `POM_URL`
pub fn manifest_from_properties(props: &BTreeMap<String, String>) -> Result<BundleManifest> {
    let get = |key: &str| {
        props
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut manifest = BundleManifest::default();

    manifest.coordinates = CoordinatesConfig {
        group_id: get("GROUP"),
        artifact_id: get("POM_ARTIFACT_ID"),
        version: get("VERSION_NAME"),
        packaging: get("POM_PACKAGING"),
    };

    manifest.pom.name = get("POM_NAME");
    manifest.pom.description = get("POM_DESCRIPTION");
    manifest.pom.url = get("POM_URL");

    manifest.signing.key_id = get("signing.keyId");
    // Passphrases may legitimately carry surrounding spaces.
    manifest.signing.passphrase = props
        .get("signing.password")
        .filter(|v| !v.is_empty())
        .cloned();
    manifest.signing.gnupg_home = get("signing.gnupgHome").map(PathBuf::from);

    manifest.repository.username = get("mavenCentralUsername").or_else(|| get("ossrhUsername"));
    manifest.repository.password = props
        .get("mavenCentralPassword")
        .or_else(|| props.get("ossrhPassword"))
        .filter(|v| !v.is_empty())
        .cloned();
    if let Some(url) = get("mavenCentralUrl") {
        manifest.repository.url = Some(url.parse().map_err(|e: url::ParseError| {
            ConfigError::InvalidValue {
                key: "mavenCentralUrl".to_string(),
                reason: e.to_string(),
            }
        })?);
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_separators_comments_and_continuations() {
        let props = parse_properties(
            "# credentials\n\
             ! also a comment\n\
             signing.keyId=ABCD1234\n\
             signing.password : s3cr\\=et\n\
             sdk.dir /opt/android\n\
             long=first \\\n    second\n\
             empty=\n",
        );
        assert_eq!(props["signing.keyId"], "ABCD1234");
        assert_eq!(props["signing.password"], "s3cr=et");
        assert_eq!(props["sdk.dir"], "/opt/android");
        assert_eq!(props["long"], "first second");
        assert_eq!(props["empty"], "");
        assert_eq!(props.len(), 5);
    }

    #[test]
    fn gradle_properties_map_to_credentials() {
        let props = parse_properties(
            "signing.keyId=ABCD1234\n\
             signing.password=pass phrase\n\
             ossrhUsername=legacy\n\
             ossrhPassword=legacy-pw\n\
             mavenCentralUsername=token-user\n\
             GROUP=com.example\n\
             VERSION_NAME=2.1.0\n",
        );
        let manifest = manifest_from_properties(&props).unwrap();
        assert_eq!(manifest.signing.key_id(), Some("ABCD1234"));
        assert_eq!(manifest.signing.passphrase(), Some("pass phrase"));
        assert_eq!(manifest.repository.username.as_deref(), Some("token-user"));
        assert_eq!(manifest.repository.password.as_deref(), Some("legacy-pw"));
        assert_eq!(manifest.coordinates.group_id.as_deref(), Some("com.example"));
        assert_eq!(manifest.coordinates.version.as_deref(), Some("2.1.0"));
        assert!(manifest.coordinates.artifact_id.is_none());
    }

    #[test]
    fn invalid_repository_url_is_rejected() {
        let props = parse_properties("mavenCentralUrl=not a url\n");
        assert!(manifest_from_properties(&props).is_err());
    }

    #[test]
    fn toml_manifest_resolves_paths_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("kodegen-bundle.toml");
        std::fs::write(
            &config,
            r#"
[coordinates]
group_id = "com.telnyx.webrtc.lib"
artifact_id = "library"
version = "1.0.1"
packaging = "aar"

[paths]
build_directory = "library/build"
staging_directory = "publish"

[artifacts]
primary = "out/library-release.aar"

[pom]
name = "Telnyx WebRTC"
licenses = [{ name = "MIT", url = "https://opensource.org/licenses/MIT" }]

[signing]
key_id = "ABCD1234"

[repository]
url = "https://central.sonatype.com/publishing"

[checksums]
algorithms = ["md5", "sha1", "sha256"]
include_signatures = false

[archive]
format = "tar.gz"
"#,
        )
        .unwrap();

        let manifest = load_manifest(&config).unwrap();
        assert_eq!(manifest.coordinates.packaging.as_deref(), Some("aar"));
        assert_eq!(
            manifest.paths.build_directory,
            Some(dir.path().join("library/build"))
        );
        assert_eq!(
            manifest.artifacts.primary,
            Some(dir.path().join("out/library-release.aar"))
        );
        assert_eq!(manifest.pom.licenses.len(), 1);
        assert_eq!(
            manifest.checksums.algorithms,
            vec![
                ChecksumAlgorithm::Md5,
                ChecksumAlgorithm::Sha1,
                ChecksumAlgorithm::Sha256
            ]
        );
        assert!(!manifest.checksums.include_signatures);
        assert_eq!(manifest.archive.format, ArchiveFormat::TarGz);
        assert!(manifest.repository.url.is_some());
    }

    #[test]
    fn malformed_toml_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("broken.toml");
        std::fs::write(&config, "[coordinates\n").unwrap();
        let err = load_manifest(&config).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest: BundleManifest = toml::from_str("").unwrap();
        assert_eq!(manifest.checksums, ChecksumsConfig::default());
        assert_eq!(manifest.archive.format, ArchiveFormat::Zip);
        assert!(!manifest.artifacts.optional);
    }
}
