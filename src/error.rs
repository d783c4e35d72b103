//! Application-level error types.
//!
//! Library failures arrive as [`crate::bundler::Error`]; configuration and
//! command-line problems get their own variants with recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for the command-line application
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The TOML document is malformed
    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A value is present but unusable
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Config key
        key: String,
        /// What is wrong with it
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BundlerError::Bundler(e) if e.is_fatal() => vec![
                "Check that the staging directory's parent exists and is writable".to_string(),
                "Make sure no other process holds files open inside it".to_string(),
            ],
            BundlerError::Config(_) | BundlerError::Toml(_) => vec![
                "Fix the configuration file or pass the values as flags".to_string(),
            ],
            BundlerError::Cli(CliError::MissingArgument { argument }) => vec![format!(
                "Pass --{argument} or set it in the configuration file"
            )],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BundlerError::Bundler(e) if e.is_fatal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_failures_are_not_recoverable() {
        let err = BundlerError::from(crate::bundler::Error::Staging {
            path: PathBuf::from("publish"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert!(!err.is_recoverable());
        assert!(err.recovery_suggestions()[0].contains("writable"));
    }

    #[test]
    fn missing_argument_suggests_flag() {
        let err = BundlerError::from(CliError::MissingArgument {
            argument: "group-id".into(),
        });
        assert!(err.is_recoverable());
        assert_eq!(
            err.recovery_suggestions(),
            vec!["Pass --group-id or set it in the configuration file".to_string()]
        );
    }
}
