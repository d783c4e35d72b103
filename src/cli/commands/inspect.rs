//! `inspect` command: classify a staged tree and look for placeholders.

use crate::bundler::builder::report::{ReportEntry, origin_from_contents, scan_directory};
use crate::cli::{OutputManager, args::InspectArgs};
use crate::error::{CliError, Result};

/// Exit code when placeholder content is present.
pub const PLACEHOLDER_EXIT_CODE: i32 = 2;

#[derive(serde::Serialize)]
struct Inspection<'a> {
    dir: &'a std::path::Path,
    placeholders: usize,
    entries: &'a [ReportEntry],
}

/// Lists every file under the directory with its kind, judging origin from
/// content. Returns [`PLACEHOLDER_EXIT_CODE`] if anything is a placeholder.
pub fn execute(args: &InspectArgs, output: &OutputManager) -> Result<i32> {
    if !args.dir.is_dir() {
        return Err(CliError::InvalidArguments {
            reason: format!("{} is not a directory", args.dir.display()),
        }
        .into());
    }

    let entries = scan_directory(&args.dir, args.packaging.as_deref(), origin_from_contents)?;
    let placeholders = entries.iter().filter(|e| e.origin.is_placeholder()).count();

    if args.json {
        let inspection = Inspection {
            dir: &args.dir,
            placeholders,
            entries: &entries,
        };
        output.println(&serde_json::to_string_pretty(&inspection)?)?;
    } else {
        output.section(&format!("Contents of {}", args.dir.display()))?;
        for entry in &entries {
            let line = format!("{} ({})", entry.name, entry.kind);
            if entry.origin.is_placeholder() {
                output.warn(&format!("{line} [PLACEHOLDER]"))?;
            } else {
                output.indent(&line)?;
            }
        }
        if placeholders == 0 {
            output.success(&format!("{} file(s), no placeholders", entries.len()))?;
        } else {
            output.error(&format!(
                "{} of {} file(s) are placeholders. Do not publish this bundle.",
                placeholders,
                entries.len()
            ))?;
        }
    }

    Ok(if placeholders == 0 {
        0
    } else {
        PLACEHOLDER_EXIT_CODE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: &std::path::Path) -> InspectArgs {
        InspectArgs {
            dir: dir.to_path_buf(),
            packaging: None,
            json: true,
        }
    }

    #[test]
    fn real_tree_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib-1.0.jar"), b"PK real").unwrap();
        std::fs::write(
            dir.path().join("lib-1.0.jar.md5"),
            b"0cc175b9c0f1b6a831c399e269772661",
        )
        .unwrap();

        let code = execute(&args(dir.path()), &OutputManager::new(false, true)).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn placeholder_content_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib-1.0.aar"), b"").unwrap();

        let code = execute(&args(dir.path()), &OutputManager::new(false, true)).unwrap();
        assert_eq!(code, PLACEHOLDER_EXIT_CODE);
    }

    #[test]
    fn missing_directory_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(&args(&dir.path().join("nope")), &OutputManager::new(false, true))
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
