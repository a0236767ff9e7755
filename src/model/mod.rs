//! Core data types for packages, digests, and scan results.
//!
//! This module contains the fundamental types used throughout supplyscan:
//!
//! - [`PackageRecord`] - An installed distribution found by a scanner
//! - [`Digest`] - A lowercase hex SHA-256 content fingerprint
//! - [`Unavailable`] - Why a digest could not be obtained
//! - [`TamperVerdict`] - Tri-state outcome of comparing two digests
//! - [`Vulnerability`] - A published advisory
//! - [`ScanRecord`] / [`ScanReport`] - Per-package and whole-run results
//!
//! # Example
//!
//! ```
//! use supplyscan::model::{Digest, TamperVerdict};
//!
//! let local = Digest::of_bytes(b"hello");
//! let published = Digest::of_bytes(b"hello");
//!
//! assert_eq!(
//!     TamperVerdict::compare(Some(&local), Some(&published)),
//!     TamperVerdict::Clean
//! );
//! ```

mod digest;
mod package;
mod report;

pub use digest::*;
pub use package::*;
pub use report::*;
