//! Kodegen Bundler Maven - release bundle assembler for Maven Central.
//!
//! This binary stages build outputs in a Maven repository layout, writes
//! checksums and detached signatures, and archives the result for upload.

use kodegen_bundler_maven::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging; per-file status lines are logged at info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code. Errors are already reported by the CLI.
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{e:?}");
            1
        }
    };

    process::exit(exit_code);
}
