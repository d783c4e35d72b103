//! Maven Central release bundle assembler
//!
//! This library stages the outputs of a library build into a Maven
//! repository layout and turns them into a single upload-ready archive:
//! - `.pom`, primary artifact, `-javadoc.jar` and `-sources.jar`
//! - `.md5`/`.sha1` checksums (SHA-256/512 on request)
//! - detached `.asc` signatures via an external OpenPGP tool
//! - a ZIP or tar.gz of the whole staging tree
//!
//! Missing inputs never abort a run; placeholders are staged and reported.
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, ConfigError, Result};
