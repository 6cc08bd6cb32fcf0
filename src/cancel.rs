//! Cooperative cancellation
//!
//! A [`CancelToken`] is shared by every worker of a walk. Workers poll it
//! before each blocking filesystem operation (open, raw read, stat); an
//! in-flight operation is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// External cancellation signal with an optional deadline
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Create a token that only fires when [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Create a token that fires once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Create a token that fires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Wrap an existing shutdown flag
    ///
    /// Useful for signal handlers:
    ///
    /// ```no_run
    /// use par_walker::CancelToken;
    /// use std::sync::atomic::AtomicBool;
    /// use std::sync::Arc;
    ///
    /// let shutdown = Arc::new(AtomicBool::new(false));
    /// let token = CancelToken::from_flag(Arc::clone(&shutdown));
    /// // hand `shutdown` to a Ctrl-C handler, `token` to the walk
    /// # let _ = token;
    /// ```
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self {
            flag,
            deadline: None,
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested or the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Get a clone of the underlying flag
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_cancel() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.deadline().is_none());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_expired_deadline() {
        let token = CancelToken::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(token.is_cancelled());

        let token = CancelToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_future_deadline() {
        let token = CancelToken::with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_shared_flag() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let token = CancelToken::from_flag(Arc::clone(&shutdown));
        assert!(!token.is_cancelled());

        shutdown.store(true, Ordering::SeqCst);
        assert!(token.is_cancelled());
        assert!(token.flag().load(Ordering::SeqCst));
    }
}
