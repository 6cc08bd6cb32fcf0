//! Walk coordinator - owns the concurrency budget and the first error
//!
//! The coordinator is responsible for:
//! - Resolving and reporting the root entry
//! - Admission control: spawning a worker per subdirectory while the budget
//!   allows, folding the work into the calling worker otherwise
//! - Recording the first error raised by any worker
//! - Joining every worker before the walk returns

use crate::cancel::CancelToken;
use crate::config::{WalkOptions, WORKER_STACK_SIZE};
use crate::error::{CallbackError, Result, WalkError};
use crate::fs::{stat_no_follow, FileInfo};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::thread::{self, Scope};
use tracing::{debug, trace, warn};

/// What the callback wants done with a visited entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep going (descend if the entry is a directory)
    Continue,
    /// Do not descend into this directory; no-op for other entries
    SkipDir,
}

/// Return type of the per-entry callback
pub type VisitResult = std::result::Result<Visit, CallbackError>;

/// Outcome of an admission decision for a subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Enumerated by a newly spawned worker
    Spawned,
    /// Enumerated synchronously by the calling worker
    Inline,
}

/// Parallel directory walker
///
/// ```no_run
/// use par_walker::{Visit, WalkOptions, Walker};
///
/// let walker = Walker::new(WalkOptions::new().with_limit(8));
/// walker
///     .walk("/var/log", |path, info| {
///         println!("{} {}", info.size, path.display());
///         Ok(Visit::Continue)
///     })
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct Walker {
    options: WalkOptions,
}

impl Walker {
    /// Create a walker with the given options
    pub fn new(options: WalkOptions) -> Self {
        Self { options }
    }

    /// Options this walker was built with
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Walk the tree rooted at `root`, calling `callback` once per entry
    /// (including the root)
    ///
    /// The callback is invoked concurrently from several workers and must be
    /// safe for that. Symlinks are reported but never followed.
    pub fn walk<P, F>(&self, root: P, callback: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: Fn(&Path, &FileInfo) -> VisitResult + Sync,
    {
        self.walk_with_cancel(root, &CancelToken::new(), callback)
    }

    /// Like [`walk`](Self::walk), stopping with [`WalkError::Cancelled`]
    /// once `cancel` fires
    pub fn walk_with_cancel<P, F>(&self, root: P, cancel: &CancelToken, callback: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: Fn(&Path, &FileInfo) -> VisitResult + Sync,
    {
        self.options.validate()?;

        let root = root.as_ref();
        if cancel.is_cancelled() {
            return Err(WalkError::Cancelled);
        }

        let info = stat_no_follow(root).map_err(|source| WalkError::Stat {
            path: root.to_path_buf(),
            source,
        })?;

        match callback(root, &info) {
            Ok(Visit::Continue) => {}
            Ok(Visit::SkipDir) => return Ok(()),
            Err(source) => {
                return Err(WalkError::Callback {
                    path: root.to_path_buf(),
                    source,
                })
            }
        }

        if !info.is_dir() {
            return Ok(());
        }

        let state = TraversalState::new(&callback, &self.options, cancel);
        debug!(root = %root.display(), limit = state.limit, "Starting walk");

        thread::scope(|scope| {
            let shared = &state;
            // the root enumeration holds the initial slot
            let spawned = worker_builder(0).spawn_scoped(scope, move || shared.run(scope, root));
            if let Err(e) = spawned {
                warn!(root = %root.display(), error = %e, "Failed to spawn root worker, enumerating on caller");
                shared.run(scope, root);
            }
        });

        debug!(
            root = %root.display(),
            spawned = state.spawned.load(Ordering::Relaxed),
            inlined = state.inlined.load(Ordering::Relaxed),
            "Walk finished"
        );

        state.into_result()
    }
}

/// Walk `root` with default options
///
/// ```no_run
/// use par_walker::{walk, Visit};
///
/// walk("/etc", |path, _info| {
///     if path.ends_with(".git") {
///         return Ok(Visit::SkipDir);
///     }
///     Ok(Visit::Continue)
/// })
/// .unwrap();
/// ```
pub fn walk<P, F>(root: P, callback: F) -> Result<()>
where
    P: AsRef<Path>,
    F: Fn(&Path, &FileInfo) -> VisitResult + Sync,
{
    Walker::default().walk(root, callback)
}

/// Per-walk shared state
///
/// The counter and the error cell are the only state shared between
/// workers. Everything else a worker touches (directory handle, read
/// buffer, name scratch) is its own.
pub(super) struct TraversalState<'a, F> {
    /// Live workers, including the one that started the walk
    pub(super) counter: AtomicUsize,
    pub(super) limit: usize,
    pub(super) first_error: OnceLock<WalkError>,
    pub(super) callback: &'a F,
    pub(super) options: &'a WalkOptions,
    pub(super) cancel: &'a CancelToken,
    pub(super) buffer_size: usize,
    pub(super) next_id: AtomicUsize,
    pub(super) spawned: AtomicU64,
    pub(super) inlined: AtomicU64,
}

impl<'a, F> TraversalState<'a, F>
where
    F: Fn(&Path, &FileInfo) -> VisitResult + Sync,
{
    pub(super) fn new(callback: &'a F, options: &'a WalkOptions, cancel: &'a CancelToken) -> Self {
        Self {
            counter: AtomicUsize::new(1),
            limit: options.effective_limit(),
            first_error: OnceLock::new(),
            callback,
            options,
            cancel,
            buffer_size: options.buffer_size(),
            next_id: AtomicUsize::new(1),
            spawned: AtomicU64::new(0),
            inlined: AtomicU64::new(0),
        }
    }

    /// Try to take one slot of the concurrency budget
    fn admit(&self) -> Option<AdmissionGuard<'_>> {
        let current = self.counter.load(Ordering::Acquire);
        if current >= self.limit {
            return None;
        }

        self.counter
            .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AdmissionGuard {
                counter: &self.counter,
            })
    }

    /// Hand a subdirectory to a new worker, or enumerate it here
    pub(super) fn descend<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        dir: PathBuf,
    ) -> Result<Admission> {
        if let Some(guard) = self.admit() {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let task_dir = dir.clone();

            let spawned = worker_builder(id).spawn_scoped(scope, move || {
                let _guard = guard;
                self.run(scope, &task_dir);
            });

            match spawned {
                Ok(_) => {
                    self.spawned.fetch_add(1, Ordering::Relaxed);
                    trace!(worker = id, dir = %dir.display(), "Spawned worker");
                    return Ok(Admission::Spawned);
                }
                // the dropped closure released the slot
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Failed to spawn worker, enumerating inline");
                }
            }
        }

        self.inlined.fetch_add(1, Ordering::Relaxed);
        trace!(dir = %dir.display(), "Budget exhausted, enumerating inline");
        self.enumerate(scope, &dir)?;
        Ok(Admission::Inline)
    }

    /// Worker body: enumerate `dir` and record whatever error escapes
    fn run<'scope, 'env>(&'env self, scope: &'scope Scope<'scope, 'env>, dir: &Path) {
        if let Err(e) = self.enumerate(scope, dir) {
            self.record_error(e);
        }
    }

    /// Check before a blocking operation
    ///
    /// `Ok(false)` means another worker already recorded an error and this
    /// one should wind down quietly.
    pub(super) fn checkpoint(&self) -> Result<bool> {
        if self.first_error.get().is_some() {
            return Ok(false);
        }
        if self.cancel.is_cancelled() {
            return Err(WalkError::Cancelled);
        }
        Ok(true)
    }

    /// Route a filesystem error through the error callback
    pub(super) fn handle_error(&self, path: &Path, err: WalkError) -> Result<()> {
        let Some(callback) = self.options.error_callback() else {
            return Err(err);
        };

        callback(path, err)?;
        debug!(path = %path.display(), "Error suppressed by error callback");
        Ok(())
    }

    /// Store `err` unless an earlier error is already recorded
    pub(super) fn record_error(&self, err: WalkError) {
        if let Err(later) = self.first_error.set(err) {
            trace!(error = %later, "Discarding error, walk already failed");
        }
    }

    fn into_result(self) -> Result<()> {
        match self.first_error.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn worker_builder(id: usize) -> thread::Builder {
    thread::Builder::new()
        .name(format!("walker-{}", id))
        .stack_size(WORKER_STACK_SIZE)
}

/// Slot in the concurrency budget, released on drop (including unwinding)
struct AdmissionGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
