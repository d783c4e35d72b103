//! Artifact descriptors flowing through the pipeline.

use std::path::PathBuf;

/// The deliverables a Maven release bundle is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Compiled binary (`.aar`, `.jar`, ...).
    Primary,
    /// POM descriptor.
    Pom,
    /// Documentation archive.
    Javadoc,
    /// Source archive.
    Sources,
}

impl ArtifactKind {
    /// All kinds in pipeline order.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Primary,
        ArtifactKind::Pom,
        ArtifactKind::Javadoc,
        ArtifactKind::Sources,
    ];

    /// Short logical name.
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Primary => "primary",
            ArtifactKind::Pom => "pom",
            ArtifactKind::Javadoc => "javadoc",
            ArtifactKind::Sources => "sources",
        }
    }

    /// What to write when the real artifact is unavailable.
    pub fn placeholder(self) -> PlaceholderPolicy {
        match self {
            ArtifactKind::Primary => PlaceholderPolicy::EmptyBlob,
            ArtifactKind::Pom => PlaceholderPolicy::PomDocument,
            ArtifactKind::Javadoc => PlaceholderPolicy::Jar { label: "Javadoc" },
            ArtifactKind::Sources => PlaceholderPolicy::Jar { label: "Sources" },
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Placeholder shape for an artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// Zero-byte file.
    EmptyBlob,
    /// Minimal well-formed POM.
    PomDocument,
    /// JAR holding a single `placeholder.txt` entry.
    Jar {
        /// Label used in the placeholder text.
        label: &'static str,
    },
}

/// One expected deliverable.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArtifactSpec {
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Where the build is expected to have written it.
    pub source: PathBuf,
    /// Canonical file name inside the version directory.
    pub destination: String,
    /// Whether a placeholder for this artifact deserves a warning.
    pub required: bool,
}

impl ArtifactSpec {
    /// Logical name of the artifact.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Whether a file holds real content or a stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Produced by the build or by a working tool.
    Real,
    /// Synthesized because the real thing was unavailable.
    Placeholder,
}

impl Origin {
    /// Returns true for [`Origin::Placeholder`].
    pub fn is_placeholder(self) -> bool {
        matches!(self, Origin::Placeholder)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Real => f.write_str("real"),
            Origin::Placeholder => f.write_str("placeholder"),
        }
    }
}

/// An artifact with the file actually used for it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedArtifact {
    /// The spec it was resolved from.
    pub spec: ArtifactSpec,
    /// Path of the file in use (build output, temp placeholder or staged copy).
    pub path: PathBuf,
    /// Real or placeholder.
    pub origin: Origin,
}
