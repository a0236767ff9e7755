//! Installed package enumeration.
//!
//! This module provides the [`Scanner`] trait and the [`PythonScanner`]
//! implementation, which discovers distributions installed on an interpreter's
//! import path.
//!
//! # Example
//!
//! ```no_run
//! use supplyscan::scanner::{PythonScanner, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scanner = PythonScanner::new("python3");
//!     if scanner.is_supported() {
//!         for pkg in scanner.scan().await? {
//!             println!("{} {}", pkg.name, pkg.version);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod python;

pub use python::{parse_metadata, safe_name, scan_directory, PythonScanner};

use crate::model::{PackageRecord, Platform};
use anyhow::Result;
use async_trait::async_trait;

/// Trait for enumerating installed packages.
///
/// The order of the returned records is the order packages are audited and
/// reported in.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Returns the human-readable name of this scanner.
    fn name(&self) -> &'static str;

    /// Returns the platforms this scanner supports.
    fn supported_platforms(&self) -> &[Platform];

    /// Returns true if this scanner is supported on the current platform.
    fn is_supported(&self) -> bool {
        let current = Platform::current();
        self.supported_platforms().contains(&current)
    }

    /// Scans for installed packages and returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the installed set cannot be determined at all
    /// (e.g., the interpreter cannot be executed).
    async fn scan(&self) -> Result<Vec<PackageRecord>>;
}
