// packages/httptap/src/utils/errors.rs
//! Error types for the interception layer

use thiserror::Error;

/// Boxed error used for body and transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, TapError>;

/// Errors surfaced by the interceptor, the real transport and the log
#[derive(Debug, Error)]
pub enum TapError {
    /// Strict mode only: no expectation is bound to this method and URL
    #[error("connection to {method} {url} is not permitted: no expectation registered")]
    UnregisteredRoute { method: String, url: String },

    /// Failure reported by the real transport, passed through as-is
    #[error(transparent)]
    Transport(BoxError),

    #[error("failed to read body: {0}")]
    Body(BoxError),

    #[error("no intercepted request at index {index} (log holds {len})")]
    RequestOutOfRange { index: usize, len: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("export failed: {0}")]
    Export(String),
}

impl TapError {
    /// Wrap an error coming out of the real network stack
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        TapError::Transport(err.into())
    }

    /// True when the error was produced by the real transport rather than
    /// by the interceptor itself
    pub fn is_transport(&self) -> bool {
        matches!(self, TapError::Transport(_))
    }
}
