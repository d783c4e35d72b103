//! Error types for bundle assembly.
//!
//! Only [`Error::Staging`] is meant to abort a run. Every other variant is
//! produced by a pipeline step and absorbed by the orchestrator as a warning.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use super::builder::tool_detection::ToolError;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling a release bundle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The staging directory could not be reset or created.
    #[error("cannot prepare staging directory {}: {source}", path.display())]
    Staging {
        /// Directory that could not be prepared
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// A filesystem operation failed on a specific path.
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being attempted
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// An external tool could not be run or reported failure.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// IO error without path information.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// ZIP archive error.
    #[error("zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Directory traversal error.
    #[error("walkdir error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    /// Path prefix error while computing archive entry names.
    #[error("path error: {0}")]
    StripPrefixError(#[from] std::path::StripPrefixError),

    /// Template registration error.
    #[error("template error: {0}")]
    TemplateError(#[from] Box<handlebars::TemplateError>),

    /// Template rendering error.
    #[error("render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// Error annotated with additional context.
    #[error("{context}: {source}")]
    Context {
        /// Context message
        context: String,
        /// Wrapped error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Generic error message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns true when the error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Staging { .. })
    }
}

/// Attaches a filesystem context and path to IO results.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Adds a context message to fallible values.
pub trait Context<T> {
    /// Wraps the failure with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e),
        })
    }
}

/// Returns early with [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
