//! Platform-specific defaults.

use crate::model::Platform;
use std::path::PathBuf;

/// Interpreter used to discover the import path when none is configured.
pub fn default_interpreter() -> &'static str {
    match Platform::current() {
        Platform::Windows => "python",
        Platform::Linux | Platform::MacOS => "python3",
    }
}

/// Returns the configuration directory for supplyscan.
///
/// Platform-specific locations:
/// - Linux: `~/.config/supplyscan/`
/// - macOS: `~/Library/Application Support/supplyscan/`
/// - Windows: `%APPDATA%\supplyscan\`
///
/// Falls back to the working directory if none can be determined.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("supplyscan")
}
