//! Walk options
//!
//! This module defines:
//! - The options accepted by a walk, set through builder methods
//! - Concurrency limit defaults and clamping
//! - Validation of the raw read buffer size

use crate::error::{ConfigError, WalkError};
use std::fmt;
use std::path::Path;

/// Minimum number of concurrent workers
///
/// Lower (or unset) limits are raised to this value.
pub const MIN_CONCURRENCY: usize = 4;

/// Default size of each worker's raw directory read buffer
pub const DEFAULT_BUFFER_SIZE: usize = 8 << 10;

/// Buffer size limits
pub const MIN_BUFFER_SIZE: usize = 1 << 10;
pub const MAX_BUFFER_SIZE: usize = 1 << 20;

/// Stack size of every walker thread
///
/// Inline enumeration recurses once per directory level; this covers the
/// deepest chain a `PATH_MAX` path can name.
pub const WORKER_STACK_SIZE: usize = 32 << 20;

/// Callback consulted on open, read and stat errors
///
/// Returning `Ok(())` suppresses the error and the walk continues past the
/// failed entry. Returning `Err` ends the walk with that error.
pub type ErrorCallback = dyn Fn(&Path, WalkError) -> Result<(), WalkError> + Send + Sync;

/// Options for a single walk
///
/// ```
/// use par_walker::WalkOptions;
///
/// let options = WalkOptions::new()
///     .with_limit(16)
///     .with_error_callback(|path, err| {
///         eprintln!("skipping {}: {}", path.display(), err);
///         Ok(())
///     });
/// assert_eq!(options.effective_limit(), 16);
/// ```
#[derive(Default)]
pub struct WalkOptions {
    error_callback: Option<Box<ErrorCallback>>,
    limit: Option<usize>,
    buffer_size: Option<usize>,
}

impl WalkOptions {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback used for open, read and stat errors
    pub fn with_error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Path, WalkError) -> Result<(), WalkError> + Send + Sync + 'static,
    {
        self.error_callback = Some(Box::new(callback));
        self
    }

    /// Set the maximum number of concurrent workers
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the raw directory read buffer size in bytes
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Concurrency limit after defaulting and clamping
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or_else(default_limit).max(MIN_CONCURRENCY)
    }

    /// Raw read buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    pub fn error_callback(&self) -> Option<&ErrorCallback> {
        self.error_callback.as_deref()
    }

    /// Validate options before a walk starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.buffer_size();
        if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) {
            return Err(ConfigError::InvalidBufferSize {
                size,
                min: MIN_BUFFER_SIZE,
                max: MAX_BUFFER_SIZE,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for WalkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("error_callback", &self.error_callback.is_some())
            .field("limit", &self.limit)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

fn default_limit() -> usize {
    num_cpus::get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_limit_clamped_to_minimum() {
        assert_eq!(WalkOptions::new().with_limit(0).effective_limit(), MIN_CONCURRENCY);
        assert_eq!(WalkOptions::new().with_limit(1).effective_limit(), MIN_CONCURRENCY);
        assert_eq!(WalkOptions::new().with_limit(4).effective_limit(), 4);
        assert_eq!(WalkOptions::new().with_limit(64).effective_limit(), 64);
    }

    #[test]
    fn test_default_limit() {
        let limit = WalkOptions::new().effective_limit();
        assert!(limit >= MIN_CONCURRENCY);
        assert!(limit >= num_cpus::get());
    }

    #[test]
    fn test_buffer_size_validation() {
        assert!(WalkOptions::new().validate().is_ok());
        assert_eq!(WalkOptions::new().buffer_size(), DEFAULT_BUFFER_SIZE);

        let too_small = WalkOptions::new().with_buffer_size(16);
        assert_eq!(
            too_small.validate(),
            Err(ConfigError::InvalidBufferSize {
                size: 16,
                min: MIN_BUFFER_SIZE,
                max: MAX_BUFFER_SIZE,
            })
        );

        assert!(WalkOptions::new().with_buffer_size(MAX_BUFFER_SIZE + 1).validate().is_err());
        assert!(WalkOptions::new().with_buffer_size(MIN_BUFFER_SIZE).validate().is_ok());
    }

    #[test]
    fn test_error_callback_roundtrip() {
        let options = WalkOptions::new().with_error_callback(|_, err| {
            if err.is_suppressible() {
                Ok(())
            } else {
                Err(err)
            }
        });

        let callback = options.error_callback().unwrap();
        let open = WalkError::Open {
            path: "/x".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(callback(Path::new("/x"), open).is_ok());
        assert!(callback(Path::new("/x"), WalkError::Cancelled).is_err());

        assert!(WalkOptions::new().error_callback().is_none());
        assert!(format!("{:?}", options).contains("error_callback: true"));
    }
}
