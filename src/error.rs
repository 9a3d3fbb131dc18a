//! Error types for detect-node-support.
//!
//! Uses thiserror for derive macros. Messages are user-facing and name the
//! offending file or source wherever one is known.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for detection operations.
#[derive(Error, Debug)]
pub enum DetectError {
    /// Invalid input or target (bad path, unsupported host, unknown package).
    #[error("{0}")]
    UserError(String),

    /// A file, folder or package that was asked for does not exist.
    ///
    /// Callers treat this as absence for optional files such as `.travis.yml`.
    #[error("{0}")]
    NotFound(String),

    /// CI configuration that cannot be interpreted (merge modes, imports, matrix references).
    #[error("{0}")]
    ConfigError(String),

    /// A loaded document could not be parsed.
    #[error("{0}")]
    ParseError(String),

    /// Fetching from the network, registry or filesystem failed.
    #[error("{0}")]
    LoaderError(String),

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),
}

impl DetectError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DetectError::UserError(_) => exit_codes::USER_ERROR,
            DetectError::NotFound(_) => exit_codes::USER_ERROR,
            DetectError::ConfigError(_) => exit_codes::CONFIG_ERROR,
            DetectError::ParseError(_) => exit_codes::LOADER_FAILURE,
            DetectError::LoaderError(_) => exit_codes::LOADER_FAILURE,
            DetectError::GitError(_) => exit_codes::GIT_FAILURE,
        }
    }

    /// Returns true when the error only signals a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DetectError::NotFound(_))
    }
}

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;
