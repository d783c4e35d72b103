//! External tool detection and invocation.
//!
//! Every subprocess the pipeline starts goes through [`run_external_tool`], so
//! call sites deal with a single [`ToolError`] type and map it uniformly to
//! their placeholder policy.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Output, Stdio},
};
use tokio::io::AsyncWriteExt;

/// Failure to run an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program is not on `PATH`.
    #[error("`{program}` not found in PATH: {source}")]
    NotFound {
        /// Program name
        program: String,
        /// Lookup failure
        #[source]
        source: which::Error,
    },

    /// The process could not be started.
    #[error("failed to execute `{program}`: {source}")]
    Spawn {
        /// Program path
        program: String,
        /// Spawn failure
        #[source]
        source: std::io::Error,
    },

    /// Writing to the child's stdin failed.
    #[error("failed to write stdin of `{program}`: {source}")]
    Stdin {
        /// Program path
        program: String,
        /// Write failure
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("`{program}` exited with {}: {}", exit_label(.code), .stderr.trim())]
    Failed {
        /// Program path
        program: String,
        /// Exit code, if any
        code: Option<i32>,
        /// Captured stderr
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Options for one external invocation.
#[derive(Debug, Default, Clone)]
pub struct ToolInvocation<'a> {
    /// Bytes written to stdin, which is then closed.
    pub stdin: Option<&'a [u8]>,
    /// Extra environment variables.
    pub envs: Vec<(&'a str, &'a OsStr)>,
}

/// Runs `program` with `args`, waiting for it to exit.
///
/// Output is captured. A non-zero exit status is reported as
/// [`ToolError::Failed`]. There is no timeout: a hung tool blocks the caller.
///
/// # Arguments
///
/// * `program` - Resolved path or bare name of the executable
/// * `args` - Command line arguments
/// * `invocation` - Optional stdin bytes and extra environment
///
/// # Returns
///
/// * `Ok(Output)` - The tool exited successfully
/// * `Err(ToolError)` - Spawn, stdin or exit-status failure
pub async fn run_external_tool<I, S>(
    program: &Path,
    args: I,
    invocation: ToolInvocation<'_>,
) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = program.display().to_string();

    let mut command = tokio::process::Command::new(program);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
    for (key, value) in &invocation.envs {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|source| ToolError::Spawn {
        program: name.clone(),
        source,
    })?;

    if let (Some(input), Some(mut stdin)) = (invocation.stdin, child.stdin.take()) {
        // Drop stdin after writing so the child sees EOF.
        let written = async {
            stdin.write_all(input).await?;
            stdin.flush().await
        }
        .await;
        drop(stdin);
        if let Err(source) = written {
            // Reap the child before reporting.
            let _ = child.wait().await;
            return Err(ToolError::Stdin {
                program: name,
                source,
            });
        }
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| ToolError::Spawn {
            program: name.clone(),
            source,
        })?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(ToolError::Failed {
            program: name,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A tool that was found on `PATH` and answered a version query.
#[derive(Debug, Clone)]
pub struct DetectedTool {
    /// Resolved program path.
    pub path: PathBuf,
    /// First line of the version output.
    pub version: String,
}

/// Looks `program` up on `PATH` and runs `<program> <version_arg>`.
///
/// Returns `None` (with a log line explaining why) when the tool is missing
/// or the version query fails.
pub async fn probe_tool(program: &str, version_arg: &str) -> Option<DetectedTool> {
    let path = match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            path
        }
        Err(source) => {
            let err = ToolError::NotFound {
                program: program.to_string(),
                source,
            };
            log::warn!("{err}");
            return None;
        }
    };

    match run_external_tool(&path, [version_arg], ToolInvocation::default()).await {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            log::info!("✓ {} available: {}", program, version);
            Some(DetectedTool { path, version })
        }
        Err(e) => {
            log::warn!(
                "{} found at {} but {} check failed: {}",
                program,
                path.display(),
                version_arg,
                e
            );
            None
        }
    }
}
