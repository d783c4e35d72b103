//! Bundle orchestration and the pipeline steps it drives.
//!
//! This module provides the main [`Bundler`] orchestrator and the components
//! it runs, leaf first.
//!
//! # Overview
//!
//! The bundler:
//! 1. Resets the staging directory ([`layout`])
//! 2. Locates build outputs, substituting placeholders ([`resolver`])
//! 3. Copies them into the Maven repository layout ([`layout`])
//! 4. Writes checksum siblings ([`checksum`])
//! 5. Writes detached signatures ([`signing`])
//! 6. Archives the staging tree and builds a [`BundleReport`] ([`report`])
//!
//! # Module Organization
//!
//! - [`checksum`] - MD5/SHA digests written as sibling files
//! - [`layout`] - Staging reset and `group/artifact/version` layout
//! - [`orchestrator`] - Main [`Bundler`] struct and the phase machine
//! - [`report`] - File classification and the final manifest
//! - [`resolver`] - Artifact lookup with placeholder substitution
//! - [`signing`] - Detached OpenPGP signatures
//! - [`tool_detection`] - External tool probing and invocation

pub mod checksum;
pub mod layout;
pub mod orchestrator;
pub mod report;
pub mod resolver;
pub mod signing;
pub mod tool_detection;

pub use checksum::{ChecksumAlgorithm, ChecksumRecord, write_checksums};
pub use layout::RepositoryLayout;
pub use orchestrator::{Bundle, BundleWarning, Bundler, Phase};
pub use report::{BundleReport, FileKind, ReportEntry};
pub use resolver::ArtifactResolver;
pub use signing::{Signature, SignatureEngine, SignerIdentity};
pub use tool_detection::{ToolError, run_external_tool};
