//! par-walker - Concurrent Directory Tree Walker
//!
//! Walks a directory tree calling a callback once for every file and
//! directory, using several worker threads to overlap the latency of
//! directory reads and per-entry `lstat` calls.
//!
//! # Features
//!
//! - **Bounded Parallelism**: At most `limit` workers run at once (default
//!   the number of CPUs, never fewer than 4). When the budget is spent,
//!   subdirectories are enumerated inline by the worker that found them,
//!   so no work is queued or dropped.
//!
//! - **Raw Directory Reads**: On Linux entries are read in batches with
//!   `getdents64` into a per-worker buffer.
//!
//! - **No Symlink Traversal**: Symlinks are reported but never followed.
//!
//! - **First Error Wins**: Any callback error, or an unsuppressed
//!   filesystem error, stops every worker; the first one is returned.
//!
//! - **Cooperative Cancellation**: Workers poll a [`CancelToken`] before
//!   every blocking call.
//!
//! # Example
//!
//! ```no_run
//! use par_walker::{walk, Visit};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let bytes = AtomicU64::new(0);
//! walk("/usr/share", |path, info| {
//!     if path.ends_with("locale") {
//!         return Ok(Visit::SkipDir);
//!     }
//!     bytes.fetch_add(info.size, Ordering::Relaxed);
//!     Ok(Visit::Continue)
//! })
//! .unwrap();
//! println!("{} bytes", bytes.load(Ordering::Relaxed));
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod fs;
pub mod walker;

pub use cancel::CancelToken;
pub use config::WalkOptions;
pub use error::{CallbackError, ConfigError, Result, WalkError};
pub use fs::{EntryType, FileInfo};
pub use walker::{walk, Visit, VisitResult, Walker};
