//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The policy file does not exist.
    #[error("policy file not found at {path}. Pass --policy or set WARDEN_POLICY")]
    PolicyNotFound { path: PathBuf },

    /// A subject or resource document could not be read as JSON.
    #[error("invalid entity in {path}: {source}")]
    Entity {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Validation found rules whose conditions are not built in.
    #[error("{count} rule(s) reference unknown conditions")]
    Unresolved { count: usize },

    /// An error occurred in the policy layer.
    #[error(transparent)]
    Policy(#[from] policy::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
