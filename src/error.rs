// Recoverable failure taxonomy. Nothing here is fatal: callers log, tag, and move on.

use std::path::PathBuf;
use thiserror::Error;

/// Target-level failure: the target is skipped for this cycle and retried on the next.
#[derive(Debug, Error)]
pub enum PollError {
    /// Bad credentials, missing CSRF token, or the login page never reached the dashboard.
    #[error("authentication failed for {target}: {message}")]
    Auth { target: String, message: String },

    /// Connection refused, timeout, non-200 response.
    #[error("transport error for {target}: {message}")]
    Transport { target: String, message: String },

    /// Response body had an unexpected shape.
    #[error("unexpected response from {target}: {message}")]
    Parse { target: String, message: String },
}

impl PollError {
    pub fn target(&self) -> &str {
        match self {
            Self::Auth { target, .. } | Self::Transport { target, .. } | Self::Parse { target, .. } => {
                target
            }
        }
    }
}

/// Snapshot file read/write failure. Loads fall back to defaults; writes are logged.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `now + ttl` is not a representable timestamp; nothing is stored.
    #[error("credential expiry out of range: {ttl_hours}h from now")]
    ExpiryOutOfRange { ttl_hours: u32 },
}

/// A loaded value plus the reason it is a fallback, if it is one.
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    pub warning: Option<PersistenceError>,
}

impl<T> Recovered<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn fallback(value: T, warning: PersistenceError) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }

    /// Log the warning (if any) and return the value.
    pub fn into_logged(self, what: &str) -> T {
        if let Some(ref e) = self.warning {
            tracing::warn!(error = %e, store = what, "using empty state");
        }
        self.value
    }
}
