//! Command line argument parsing and validation.
//!
//! Every bundle option can come from the config file; flags given here win.

use crate::bundler::{ArchiveFormat, ChecksumAlgorithm};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Maven Central release bundle assembler
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_maven",
    version,
    about = "Maven Central release bundle assembler",
    long_about = "Assembles build outputs into a Maven repository layout with checksums and detached signatures, then archives it for upload to Maven Central.

Missing artifacts and an unavailable signing tool never abort a run: placeholders are staged instead and flagged in the final report.

Usage:
  kodegen_bundler_maven bundle --group-id com.example --artifact-id lib --release-version 1.0.0 --packaging aar
  kodegen_bundler_maven bundle --config kodegen-bundle.toml --json
  kodegen_bundler_maven inspect publish

Exit code 0 = bundle assembled (possibly with placeholders). Exit code 1 = the staging directory could not be prepared."
)]
pub struct Args {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Show detail lines
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors and requested output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble, checksum, sign and archive a release bundle
    Bundle(BundleArgs),

    /// Classify a staged bundle and flag placeholder files
    ///
    /// Exits with status 2 when any placeholder is found.
    Inspect(InspectArgs),
}

/// Options of the `bundle` command
#[derive(ClapArgs, Debug, Default)]
pub struct BundleArgs {
    /// Configuration file (TOML or .properties)
    ///
    /// Defaults to ./kodegen-bundle.toml, then the user config directory.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maven group id, e.g. com.example.lib
    #[arg(long, value_name = "GROUP")]
    pub group_id: Option<String>,

    /// Maven artifact id
    #[arg(long, value_name = "ARTIFACT")]
    pub artifact_id: Option<String>,

    /// Version of the component being released
    #[arg(long, value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Packaging of the primary artifact (jar, aar, ...)
    #[arg(long, value_name = "EXT")]
    pub packaging: Option<String>,

    /// Build output directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Staging directory (deleted and recreated on every run)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Archive path
    #[arg(long, value_name = "PATH")]
    pub archive: Option<PathBuf>,

    /// Archive format: zip or tar.gz
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ArchiveFormat>,

    /// Primary artifact path
    #[arg(long, value_name = "PATH")]
    pub primary: Option<PathBuf>,

    /// POM descriptor path
    #[arg(long, value_name = "PATH")]
    pub pom: Option<PathBuf>,

    /// Javadoc JAR path
    #[arg(long, value_name = "PATH")]
    pub javadoc: Option<PathBuf>,

    /// Sources JAR path
    #[arg(long, value_name = "PATH")]
    pub sources: Option<PathBuf>,

    /// Do not warn when artifacts are replaced by placeholders
    #[arg(long)]
    pub optional_artifacts: bool,

    /// Signing key id
    #[arg(long, env = "KODEGEN_SIGNING_KEY_ID", value_name = "KEY")]
    pub key_id: Option<String>,

    /// Signing key passphrase
    #[arg(
        long,
        env = "KODEGEN_SIGNING_PASSPHRASE",
        hide_env_values = true,
        value_name = "PASSPHRASE"
    )]
    pub passphrase: Option<String>,

    /// Signing program
    #[arg(long, value_name = "PROGRAM")]
    pub gpg: Option<String>,

    /// Keyring directory for the signing program
    #[arg(long, value_name = "DIR")]
    pub gnupg_home: Option<PathBuf>,

    /// Checksum algorithms (md5, sha1, sha256, sha512)
    #[arg(long = "checksum", value_name = "ALG", value_delimiter = ',', value_parser = parse_algorithm)]
    pub checksums: Vec<ChecksumAlgorithm>,

    /// Do not write checksums of .asc files
    #[arg(long)]
    pub no_signature_checksums: bool,

    /// Print the bundle summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options of the `inspect` command
#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// Staging directory or version directory to inspect
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Packaging of the primary artifact, inferred when omitted
    #[arg(long, value_name = "EXT")]
    pub packaging: Option<String>,

    /// Print the classification as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_algorithm(s: &str) -> Result<ChecksumAlgorithm, String> {
    ChecksumAlgorithm::parse(s).ok_or_else(|| {
        format!("unknown checksum algorithm '{s}' (expected md5, sha1, sha256 or sha512)")
    })
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Bundle(bundle) = &self.command {
            for (flag, value) in [
                ("--group-id", &bundle.group_id),
                ("--artifact-id", &bundle.artifact_id),
                ("--release-version", &bundle.release_version),
                ("--packaging", &bundle.packaging),
            ] {
                if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                    return Err(format!("{flag} cannot be empty"));
                }
            }
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let mut output = super::OutputManager::new(args.verbose, args.quiet);
        if args.no_color {
            output = output.without_color();
        }
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}
