//! Stand-in content for artifacts, checksums and signatures.
//!
//! Every placeholder that has room for text carries [`PLACEHOLDER_MARKER`] in
//! uncompressed form, so a staged tree can be scanned for accidental
//! placeholders before upload. Zero-byte files and all-zero digests are the
//! two shapes that cannot carry the marker; [`is_placeholder_content`]
//! recognizes them by shape instead.

use crate::bundler::{
    Coordinates, PlaceholderPolicy, PomSettings, Result,
    error::ErrorExt,
};
use handlebars::Handlebars;
use std::{
    io::{Cursor, Write},
    path::Path,
};

/// Sentinel embedded in every text-bearing placeholder.
pub const PLACEHOLDER_MARKER: &str = "KODEGEN-BUNDLER-PLACEHOLDER";

const POM_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- {{marker}}: generated on {{generated}} because the build produced no POM -->
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{{coords.group_id}}</groupId>
  <artifactId>{{coords.artifact_id}}</artifactId>
  <version>{{coords.version}}</version>
  <packaging>{{coords.packaging}}</packaging>
{{#if pom.name}}  <name>{{pom.name}}</name>
{{/if}}{{#if pom.description}}  <description>{{pom.description}}</description>
{{/if}}{{#if pom.url}}  <url>{{pom.url}}</url>
{{/if}}{{#if pom.licenses}}  <licenses>
{{#each pom.licenses}}    <license>
      <name>{{name}}</name>
{{#if url}}      <url>{{url}}</url>
{{/if}}    </license>
{{/each}}  </licenses>
{{/if}}{{#if pom.developers}}  <developers>
{{#each pom.developers}}    <developer>
{{#if id}}      <id>{{id}}</id>
{{/if}}{{#if name}}      <name>{{name}}</name>
{{/if}}{{#if email}}      <email>{{email}}</email>
{{/if}}    </developer>
{{/each}}  </developers>
{{/if}}{{#if pom.scm}}  <scm>
{{#if pom.scm.connection}}    <connection>{{pom.scm.connection}}</connection>
{{/if}}{{#if pom.scm.developer_connection}}    <developerConnection>{{pom.scm.developer_connection}}</developerConnection>
{{/if}}{{#if pom.scm.url}}    <url>{{pom.scm.url}}</url>
{{/if}}  </scm>
{{/if}}</project>
"#;

#[derive(serde::Serialize)]
struct PomContext<'a> {
    marker: &'static str,
    generated: String,
    coords: &'a Coordinates,
    pom: &'a PomSettings,
}

/// Renders a minimal, well-formed POM for `coords`.
pub fn render_pom(coords: &Coordinates, pom: &PomSettings) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars
        .register_template_string("pom", POM_TEMPLATE)
        .map_err(Box::new)?;

    let context = PomContext {
        marker: PLACEHOLDER_MARKER,
        generated: timestamp(),
        coords,
        pom,
    };
    Ok(handlebars.render("pom", &context)?)
}

/// Builds a JAR containing a manifest and a `placeholder.txt` entry.
///
/// Entries are stored uncompressed so the marker stays greppable.
pub fn jar_bytes(label: &str) -> Result<Vec<u8>> {
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    let mut jar = zip::ZipWriter::new(Cursor::new(Vec::new()));

    jar.start_file("META-INF/MANIFEST.MF".to_string(), options)?;
    jar.write_all(b"Manifest-Version: 1.0\r\nCreated-By: kodegen_bundler_maven\r\n\r\n")?;

    jar.start_file("placeholder.txt".to_string(), options)?;
    let text = format!(
        "This is a placeholder for {label}. Generated on {}\n{PLACEHOLDER_MARKER}\n",
        timestamp()
    );
    jar.write_all(text.as_bytes())?;

    Ok(jar.finish()?.into_inner())
}

/// ASCII-armored block standing in for a detached signature.
pub fn signature_block(file_name: &str) -> String {
    format!(
        "-----BEGIN PGP SIGNATURE-----\n\
         Comment: {PLACEHOLDER_MARKER}\n\
         \n\
         PLACEHOLDER SIGNATURE FOR {file_name}\n\
         This is not a cryptographic signature and will not verify.\n\
         -----END PGP SIGNATURE-----\n"
    )
}

/// Writes the placeholder for `policy` at `path`, creating parent directories.
pub async fn write_artifact(
    policy: PlaceholderPolicy,
    path: &Path,
    coords: &Coordinates,
    pom: &PomSettings,
) -> Result<()> {
    let contents = match policy {
        PlaceholderPolicy::EmptyBlob => Vec::new(),
        PlaceholderPolicy::PomDocument => render_pom(coords, pom)?.into_bytes(),
        PlaceholderPolicy::Jar { label } => {
            let label = label.to_string();
            tokio::task::spawn_blocking(move || jar_bytes(&label))
                .await
                .map_err(|e| {
                    crate::bundler::Error::GenericError(format!(
                        "Placeholder JAR task panicked: {}",
                        e
                    ))
                })??
        }
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating placeholder directory", parent)?;
    }
    tokio::fs::write(path, contents)
        .await
        .fs_context("writing placeholder", path)
}

/// Writes the placeholder signature for `artifact` at `asc_path`.
pub async fn write_signature(artifact: &Path, asc_path: &Path) -> Result<()> {
    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| artifact.display().to_string());
    tokio::fs::write(asc_path, signature_block(&file_name))
        .await
        .fs_context("writing placeholder signature", asc_path)
}

/// Whether `bytes` look like any placeholder this crate writes.
///
/// True for empty content, all-zero digests, and anything containing
/// [`PLACEHOLDER_MARKER`].
pub fn is_placeholder_content(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }
    if bytes.iter().all(|&b| b == b'0') {
        return true;
    }
    let marker = PLACEHOLDER_MARKER.as_bytes();
    bytes.windows(marker.len()).any(|window| window == marker)
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{DeveloperSettings, LicenseSettings, ScmSettings};

    fn coords() -> Coordinates {
        Coordinates::new("com.example.lib", "library", "1.0.1", "aar")
    }

    #[test]
    fn minimal_pom_has_coordinates_and_marker() {
        let pom = render_pom(&coords(), &PomSettings::default()).unwrap();
        assert!(pom.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(pom.contains("<groupId>com.example.lib</groupId>"));
        assert!(pom.contains("<artifactId>library</artifactId>"));
        assert!(pom.contains("<version>1.0.1</version>"));
        assert!(pom.contains("<packaging>aar</packaging>"));
        assert!(!pom.contains("<licenses>"));
        assert!(pom.contains(PLACEHOLDER_MARKER));
        assert!(pom.trim_end().ends_with("</project>"));
    }

    #[test]
    fn pom_metadata_is_rendered_and_escaped() {
        let pom = PomSettings {
            name: Some("Example & Co".into()),
            description: Some("Library".into()),
            url: Some("https://example.com".into()),
            licenses: vec![LicenseSettings {
                name: "MIT License".into(),
                url: Some("https://opensource.org/licenses/MIT".into()),
            }],
            developers: vec![DeveloperSettings {
                id: Some("dev".into()),
                name: Some("Dev".into()),
                email: Some("dev@example.com".into()),
            }],
            scm: Some(ScmSettings {
                url: Some("https://github.com/example/library".into()),
                ..Default::default()
            }),
        };
        let rendered = render_pom(&coords(), &pom).unwrap();
        assert!(rendered.contains("<name>Example &amp; Co</name>"));
        assert!(rendered.contains("<name>MIT License</name>"));
        assert!(rendered.contains("<email>dev@example.com</email>"));
        assert!(rendered.contains("<scm>"));
        assert!(!rendered.contains("<connection>"));
    }

    #[test]
    fn placeholder_jar_is_a_valid_archive() {
        let bytes = jar_bytes("Javadoc").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(archive.len(), 2);
        let mut text = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("placeholder.txt").unwrap(),
            &mut text,
        )
        .unwrap();
        assert!(text.starts_with("This is a placeholder for Javadoc."));
        assert!(is_placeholder_content(&bytes));
    }

    #[test]
    fn signature_block_is_armored_and_marked() {
        let block = signature_block("library-1.0.1.aar");
        assert!(block.starts_with("-----BEGIN PGP SIGNATURE-----\n"));
        assert!(block.trim_end().ends_with("-----END PGP SIGNATURE-----"));
        assert!(block.contains("PLACEHOLDER SIGNATURE FOR library-1.0.1.aar"));
        assert!(is_placeholder_content(block.as_bytes()));
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder_content(b""));
        assert!(is_placeholder_content(b"00000000000000000000000000000000"));
        assert!(!is_placeholder_content(b"5d41402abc4b2a76b9719d911017c592"));
        assert!(!is_placeholder_content(b"PK\x03\x04real content"));
    }
}
