//! Error types for par-walker
//!
//! This module defines the error hierarchy for a walk:
//! - Filesystem errors (stat, open, raw directory read)
//! - Errors returned by the per-entry callback
//! - Cancellation
//! - Option validation errors
//!
//! Filesystem errors may be suppressed by the error callback configured in
//! [`WalkOptions`](crate::WalkOptions). Callback errors and cancellation
//! always end the walk.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type returned by the per-entry callback
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for a walk
#[derive(Error, Debug)]
pub enum WalkError {
    /// Metadata lookup (without following symlinks) failed
    #[error("Failed to stat {path:?}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory could not be opened
    #[error("Failed to open directory {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading raw entries from an open directory failed
    #[error("Failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The per-entry callback returned an error
    #[error("Callback failed for {path:?}: {source}")]
    Callback {
        path: PathBuf,
        #[source]
        source: CallbackError,
    },

    /// The cancellation token fired before the walk completed
    #[error("Walk cancelled")]
    Cancelled,

    /// Invalid walk options
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl WalkError {
    /// Path associated with this error, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            WalkError::Stat { path, .. }
            | WalkError::Open { path, .. }
            | WalkError::ReadDir { path, .. }
            | WalkError::Callback { path, .. } => Some(path),
            WalkError::Cancelled | WalkError::Config(_) => None,
        }
    }

    /// Underlying I/O error for filesystem failures
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            WalkError::Stat { source, .. }
            | WalkError::Open { source, .. }
            | WalkError::ReadDir { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if this error is routed through the error callback
    ///
    /// Only filesystem errors on entries below the root qualify; callback
    /// errors, cancellation and configuration errors always end the walk.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self,
            WalkError::Stat { .. } | WalkError::Open { .. } | WalkError::ReadDir { .. }
        )
    }

    /// Check if this error is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WalkError::Cancelled)
    }
}

/// Option validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Raw read buffer too small or too large
    #[error("Invalid buffer size {size}: must be between {min} and {max}")]
    InvalidBufferSize { size: usize, min: usize, max: usize },
}

/// Result type alias for WalkError
pub type Result<T> = std::result::Result<T, WalkError>;
