//! Error types for the bootstrap pipeline
//!
//! Provides error handling for:
//! - Scan input validation
//! - Service boundary failures (transport, status, decode)
//! - Missing stage prerequisites
//! - Session store writes
//! - Configuration loading

use crate::pipeline::Stage;
use crate::store::Slot;
use std::path::PathBuf;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Scan input rejected; the pipeline does not advance
    #[error("validation failed: {0}")]
    Validation(String),

    /// Remote call failed
    #[error("{stage} boundary failed: {source}")]
    Boundary {
        /// Stage that issued the call
        stage: Stage,
        /// Underlying failure
        #[source]
        source: BoundaryError,
    },

    /// Stage invoked before its input was stored
    #[error("cannot run {stage}: no {slot} data in session, run {} first", .slot.owner())]
    MissingPrerequisite {
        /// Stage that was refused
        stage: Stage,
        /// Slot that was absent
        slot: Slot,
    },

    /// Session store write failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Check if error is a scan validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if error is a local guard refusal
    #[inline]
    #[must_use]
    pub fn is_missing_prerequisite(&self) -> bool {
        matches!(self, Self::MissingPrerequisite { .. })
    }

    /// Check if repeating the same action by hand can succeed
    ///
    /// Nothing is retried automatically.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Boundary { source, .. } => source.is_retryable(),
            Self::Store(_) => true,
            Self::Validation(_) | Self::MissingPrerequisite { .. } => false,
        }
    }
}

/// Failure of a single request/response call to an external service
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// Request could not be sent or the response not received
    #[error("transport error: {0}")]
    Transport(String),

    /// Service answered with a non-success status
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl BoundaryError {
    /// Check if the status is a client-side (4xx) rejection
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }

    /// Check if error is retryable by hand
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for BoundaryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Session store errors
///
/// Only writes and clears fail; unreadable slots read as absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Value could not be encoded
    #[error("failed to encode {slot} slot: {message}")]
    Encode {
        /// Slot being written
        slot: Slot,
        /// Encoder message
        message: String,
    },

    /// Backend I/O failed
    #[error("session I/O failed on {}: {source}", .path.display())]
    Io {
        /// File being written or removed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the config shape
    #[error("invalid config {}: {message}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// An environment override has an invalid value
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}
