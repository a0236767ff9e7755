//! Configuration file handling.
//!
//! This module provides loading and saving of supplyscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/supplyscan/config.toml`
//! - macOS: `~/Library/Application Support/supplyscan/config.toml`
//! - Windows: `%APPDATA%\supplyscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! index_url = "https://pypi.org"
//! vuln_db_url = "https://api.osv.dev"
//! report_path = "report.json"
//! timeout_secs = 30
//! python = "python3.12"
//! site_packages = ["/opt/venv/lib/python3.12/site-packages"]
//! default_format = "text"
//!
//! [ignore]
//! packages = ["pip", "setuptools*"]
//! vulnerabilities = ["PYSEC-2023-228"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::checker::DEFAULT_OSV_URL;
use crate::platform;
use crate::registry::DEFAULT_INDEX_URL;

/// Application configuration.
///
/// Every field has a default, so a partial (or absent) file is valid.
///
/// # Example
///
/// ```no_run
/// use supplyscan::Config;
///
/// let config = Config::load().unwrap();
/// println!("Report path: {}", config.report_path.display());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the package index JSON API.
    ///
    /// Default: `https://pypi.org`
    pub index_url: String,

    /// Base URL of the OSV API.
    ///
    /// Default: `https://api.osv.dev`
    pub vuln_db_url: String,

    /// Where the JSON report is written. Any existing file is replaced.
    ///
    /// Default: `report.json` in the working directory
    pub report_path: PathBuf,

    /// Timeout applied to each HTTP request, in seconds.
    ///
    /// Default: 30
    pub timeout_secs: u64,

    /// Interpreter asked for its import path.
    ///
    /// Default: `python3` (`python` on Windows)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,

    /// Directories to scan instead of the interpreter's `sys.path`.
    pub site_packages: Vec<PathBuf>,

    /// Default console format when no `--format` flag is provided.
    ///
    /// Valid values: "text", "json"
    pub default_format: String,

    /// Ignore list configuration for suppressing known issues.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Configuration for ignoring specific packages or advisories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Package names to leave out of the scan.
    ///
    /// Supports `*` wildcards (e.g., "setuptools*").
    pub packages: Vec<String>,

    /// Advisory IDs that are never reported (e.g., "PYSEC-2023-228").
    pub vulnerabilities: Vec<String>,
}

impl IgnoreConfig {
    /// Package names compare case-insensitively, as on PyPI.
    pub fn should_ignore_package(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.packages.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            if pattern.contains('*') {
                glob_match(&pattern, &name)
            } else {
                pattern == name
            }
        })
    }

    pub fn should_ignore_vulnerability(&self, vuln_id: &str) -> bool {
        self.vulnerabilities.iter().any(|id| id == vuln_id)
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            vuln_db_url: DEFAULT_OSV_URL.to_string(),
            report_path: PathBuf::from("report.json"),
            timeout_secs: 30,
            python: None,
            site_packages: Vec::new(),
            default_format: "text".to_string(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file, creating its directory.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn interpreter(&self) -> String {
        self.python
            .clone()
            .unwrap_or_else(|| platform::default_interpreter().to_string())
    }

    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("pip", "pip"));
        assert!(!glob_match("pip", "pipx"));
    }

    #[test]
    fn test_glob_match_prefix() {
        assert!(glob_match("setuptools*", "setuptools"));
        assert!(glob_match("setuptools*", "setuptools-scm"));
        assert!(!glob_match("setuptools*", "wheel"));
    }

    #[test]
    fn test_glob_match_suffix() {
        assert!(glob_match("*-stubs", "types-requests-stubs"));
        assert!(!glob_match("*-stubs", "requests"));
    }

    #[test]
    fn test_glob_match_contains() {
        assert!(glob_match("*django*", "django"));
        assert!(glob_match("*django*", "djangorestframework"));
        assert!(glob_match("*django*", "pytest-django-plugin"));
        assert!(!glob_match("*django*", "flask"));
    }

    #[test]
    fn test_ignore_config_packages() {
        let config = IgnoreConfig {
            packages: vec!["pip".to_string(), "types-*".to_string()],
            vulnerabilities: vec![],
        };

        assert!(config.should_ignore_package("pip"));
        assert!(config.should_ignore_package("PIP"));
        assert!(config.should_ignore_package("types-requests"));
        assert!(config.should_ignore_package("Types-Requests"));
        assert!(!config.should_ignore_package("requests"));
    }

    #[test]
    fn test_ignore_config_vulnerabilities() {
        let config = IgnoreConfig {
            packages: vec![],
            vulnerabilities: vec!["PYSEC-2023-228".to_string()],
        };

        assert!(config.should_ignore_vulnerability("PYSEC-2023-228"));
        assert!(!config.should_ignore_vulnerability("GHSA-xxxx"));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.index_url, "https://pypi.org");
        assert_eq!(config.vuln_db_url, "https://api.osv.dev");
        assert_eq!(config.report_path, PathBuf::from("report.json"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_format, "text");
        assert!(config.site_packages.is_empty());
        assert!(config.ignore.packages.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            timeout_secs = 5
            python = "python3.11"

            [ignore]
            vulnerabilities = ["GHSA-1"]
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.interpreter(), "python3.11");
        assert_eq!(config.index_url, "https://pypi.org");
        assert!(config.ignore.should_ignore_vulnerability("GHSA-1"));
    }

    #[test]
    fn test_generated_default_config_parses() {
        let text = Config::generate_default_config();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.report_path, PathBuf::from("report.json"));
    }
}
