//! Filesystem access for the walker
//!
//! This module provides the operations the traversal engine builds on,
//! kept apart from the traversal algorithm itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                       RawDir                        │
//! │  - One per directory being enumerated               │
//! │  - RAII cleanup (descriptor closed on drop)         │
//! │  - Fills a DirentBuf with raw records per read      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                      DirentBuf                      │
//! │  - linux_dirent64 record layout                     │
//! │  - Incremental decode, tracks consumed bytes        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                   stat_no_follow                    │
//! │  - lstat per name, NotFound signals a vanished entry│
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use par_walker::fs::{DirentBuf, RawDir};
//! use std::path::Path;
//!
//! let mut dir = RawDir::open(Path::new("/tmp")).unwrap();
//! let mut buf = DirentBuf::new(8 << 10);
//! let mut names = Vec::new();
//!
//! while dir.read_batch(&mut buf).unwrap() > 0 {
//!     while !buf.is_drained() {
//!         buf.decode(100, &mut names).unwrap();
//!     }
//! }
//! println!("{} entries", names.len());
//! ```

pub mod dirent;
mod sys;
pub mod types;

pub use dirent::DirentBuf;
pub use sys::{stat_no_follow, RawDir};
pub use types::{EntryType, FileInfo, Permissions};
