//! Maven release bundle assembly.
//!
//! Takes the outputs of a library build, lays them out as a Maven repository
//! directory, writes checksums and detached signatures, and archives the
//! result for manual upload. Missing inputs and unavailable tools never abort
//! a run; placeholders take their place and the final report flags them.

pub mod artifact;
pub mod builder;
pub mod error;
pub mod placeholder;
pub mod settings;
pub mod utils;

pub use artifact::{ArtifactKind, ArtifactSpec, Origin, PlaceholderPolicy, ResolvedArtifact};
pub use builder::{
    Bundle, BundleReport, BundleWarning, Bundler, ChecksumAlgorithm, ChecksumRecord, FileKind,
    Phase, ReportEntry, Signature, SignerIdentity,
};
pub use error::{Error, Result};
pub use settings::{
    ArtifactSources, Coordinates, DeveloperSettings, LicenseSettings, PomSettings,
    RepositorySettings, ScmSettings, Settings, SettingsBuilder, SigningSettings,
};
pub use utils::archive::ArchiveFormat;
