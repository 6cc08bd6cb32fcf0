//! Parallel directory walker
//!
//! This module implements a bounded-parallelism tree walk. Each directory
//! is enumerated by exactly one worker; subdirectories either get a new
//! worker (while the concurrency budget allows) or are enumerated inline by
//! the worker that found them.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │      Coordinator        │
//!                     │  - stat + report root   │
//!                     │  - budget (atomic CAS)  │
//!                     │  - first-error cell     │
//!                     └───────────┬─────────────┘
//!                                 │ enumerate(root)
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  getdents │             │  getdents │             │  getdents │
//! │  lstat    │             │  lstat    │             │  lstat    │
//! │  callback │             │  callback │             │  callback │
//! └─────┬─────┘             └───────────┘             └───────────┘
//!       │ subdirectory
//!       ├── budget left  → spawn worker
//!       └── budget spent → enumerate inline
//! ```

pub mod coordinator;
mod enumerator;

pub use coordinator::{walk, Visit, VisitResult, Walker};
