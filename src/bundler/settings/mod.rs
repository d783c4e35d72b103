//! Configuration structures for bundle assembly.
//!
//! This module provides the explicit configuration passed into the pipeline:
//! Maven coordinates, POM metadata, signing and repository credentials, and
//! the builder used to put them together.

mod builder;
mod coordinates;
mod core;
mod pom;
mod signing;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use coordinates::Coordinates;
pub use core::{ArtifactSources, Settings};
pub use pom::{DeveloperSettings, LicenseSettings, PomSettings, ScmSettings};
pub use signing::{DEFAULT_SIGNING_PROGRAM, RepositorySettings, SigningSettings};
