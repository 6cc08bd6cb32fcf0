//! Directory enumeration
//!
//! Each call reads one directory to the end:
//! - open the directory and read raw record batches into a worker-owned
//!   buffer, decoding names until each batch is drained
//! - stat every name without following symlinks
//! - report the entry to the callback
//! - hand real directories (never symlinks) back to admission control

use super::coordinator::{TraversalState, Visit, VisitResult};
use crate::error::{Result, WalkError};
use crate::fs::{stat_no_follow, DirentBuf, FileInfo, RawDir};
use std::ffi::OsStr;
use std::io;
use std::ops::ControlFlow;
use std::path::Path;
use std::thread::Scope;
use tracing::trace;

/// Names decoded from a batch per decode call
const MAX_NAMES_PER_DECODE: usize = 100;

impl<'a, F> TraversalState<'a, F>
where
    F: Fn(&Path, &FileInfo) -> VisitResult + Sync,
{
    /// Enumerate `dir` to completion or until the walk stops
    pub(super) fn enumerate<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        dir: &Path,
    ) -> Result<()> {
        if !self.checkpoint()? {
            return Ok(());
        }

        let mut raw = match RawDir::open(dir) {
            Ok(raw) => raw,
            Err(source) => {
                return self.handle_error(
                    dir,
                    WalkError::Open {
                        path: dir.to_path_buf(),
                        source,
                    },
                )
            }
        };

        trace!(dir = %dir.display(), "Enumerating directory");

        let mut buf = DirentBuf::new(self.buffer_size);
        let mut names = Vec::with_capacity(MAX_NAMES_PER_DECODE);

        loop {
            if !self.checkpoint()? {
                return Ok(());
            }

            match raw.read_batch(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(source) => return self.read_failed(dir, source),
            }

            while !buf.is_drained() {
                names.clear();
                if let Err(source) = buf.decode(MAX_NAMES_PER_DECODE, &mut names) {
                    return self.read_failed(dir, source);
                }

                for name in names.drain(..) {
                    if self.visit_child(scope, dir, &name)?.is_break() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Resolve, report and possibly descend into one child of `dir`
    fn visit_child<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        dir: &Path,
        name: &OsStr,
    ) -> Result<ControlFlow<()>> {
        let path = dir.join(name);

        if !self.checkpoint()? {
            return Ok(ControlFlow::Break(()));
        }

        let info = match stat_no_follow(&path) {
            Ok(info) => info,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %path.display(), "Entry vanished before stat");
                return Ok(ControlFlow::Continue(()));
            }
            Err(source) => {
                self.handle_error(
                    &path,
                    WalkError::Stat {
                        path: path.clone(),
                        source,
                    },
                )?;
                return Ok(ControlFlow::Continue(()));
            }
        };

        match (self.callback)(&path, &info) {
            Ok(Visit::Continue) => {}
            Ok(Visit::SkipDir) => return Ok(ControlFlow::Continue(())),
            Err(source) => {
                // record before unwinding so other workers stop at their next check
                self.record_error(WalkError::Callback { path, source });
                return Ok(ControlFlow::Break(()));
            }
        }

        // don't follow symbolic links
        if info.is_symlink() {
            return Ok(ControlFlow::Continue(()));
        }

        if info.is_dir() {
            let admission = self.descend(scope, path)?;
            trace!(?admission, "Subdirectory admitted");
        }

        Ok(ControlFlow::Continue(()))
    }

    fn read_failed(&self, dir: &Path, source: io::Error) -> Result<()> {
        self.handle_error(
            dir,
            WalkError::ReadDir {
                path: dir.to_path_buf(),
                source,
            },
        )
    }
}
