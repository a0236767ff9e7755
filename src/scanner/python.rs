use crate::model::{PackageRecord, Platform};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const SYS_PATH_SNIPPET: &str = "import json, sys; print(json.dumps(sys.path))";

/// Finds distributions through `*.dist-info`, `*.egg-info` and egg metadata.
pub struct PythonScanner {
    interpreter: String,
    search_paths: Vec<PathBuf>,
}

impl PythonScanner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            search_paths: Vec::new(),
        }
    }

    /// Scan these directories instead of asking the interpreter for `sys.path`.
    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    fn resolve_search_paths(&self) -> Result<Vec<PathBuf>> {
        let paths = if self.search_paths.is_empty() {
            interpreter_sys_path(&self.interpreter)?
        } else {
            self.search_paths.clone()
        };

        let mut unique: Vec<PathBuf> = Vec::new();
        for path in paths {
            if path.as_os_str().is_empty() || !path.is_dir() {
                continue;
            }
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        Ok(unique)
    }
}

fn interpreter_sys_path(interpreter: &str) -> Result<Vec<PathBuf>> {
    let output = Command::new(interpreter)
        .args(["-c", SYS_PATH_SNIPPET])
        .output()
        .with_context(|| format!("Failed to execute {}. Is Python installed?", interpreter))?;

    if !output.status.success() {
        anyhow::bail!(
            "{} exited with {}: {}",
            interpreter,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let entries: Vec<String> =
        serde_json::from_str(stdout.trim()).context("Failed to parse sys.path output")?;

    Ok(entries.into_iter().map(PathBuf::from).collect())
}

#[async_trait]
impl super::Scanner for PythonScanner {
    fn name(&self) -> &'static str {
        "Python Packages"
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS, Platform::Windows]
    }

    async fn scan(&self) -> Result<Vec<PackageRecord>> {
        let mut packages: Vec<PackageRecord> = Vec::new();
        for dir in self.resolve_search_paths()? {
            tracing::debug!(dir = %dir.display(), "scanning import path entry");
            for package in scan_directory(&dir) {
                // An egg can be reached both from its parent and as its own entry.
                if !packages.contains(&package) {
                    packages.push(package);
                }
            }
        }
        Ok(packages)
    }
}

/// Lists the distributions whose metadata lives directly in `dir`.
///
/// Entries are visited in file-name order. Besides `*.dist-info` and
/// `*.egg-info`, unpacked `*.egg` directories (including `dir` itself) and
/// `*.egg-link` pointers are followed; their location is the egg or the
/// linked project directory rather than `dir`. Unreadable or incomplete
/// metadata is skipped.
pub fn scan_directory(dir: &Path) -> Vec<PackageRecord> {
    let mut packages = Vec::new();

    if is_egg_dir(dir) {
        read_record(&dir.join("EGG-INFO").join("PKG-INFO"), dir, &mut packages);
    }

    for path in sorted_entries(dir) {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if file_name.ends_with(".dist-info") && path.is_dir() {
            read_record(&path.join("METADATA"), dir, &mut packages);
        } else if file_name.ends_with(".egg-info") {
            read_record(&egg_info_metadata(&path), dir, &mut packages);
        } else if file_name.ends_with(".egg") && is_egg_dir(&path) {
            read_record(&path.join("EGG-INFO").join("PKG-INFO"), &path, &mut packages);
        } else if file_name.ends_with(".egg-link") && path.is_file() {
            let Some(target) = egg_link_target(dir, &path) else {
                continue;
            };
            for info in sorted_entries(&target) {
                if info.extension().is_some_and(|ext| ext == "egg-info") {
                    read_record(&egg_info_metadata(&info), &target, &mut packages);
                }
            }
        }
    }

    packages
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(read) => read.flatten().map(|e| e.path()).collect(),
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "cannot list directory");
            return Vec::new();
        }
    };
    entries.sort();
    entries
}

fn is_egg_dir(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "egg") && path.join("EGG-INFO").is_dir()
}

fn egg_info_metadata(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("PKG-INFO")
    } else {
        path.to_path_buf()
    }
}

/// The project directory named on the first non-blank line of an `.egg-link`.
fn egg_link_target(dir: &Path, link: &Path) -> Option<PathBuf> {
    let content = match fs::read_to_string(link) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %link.display(), error = %e, "skipping unreadable egg-link");
            return None;
        }
    };

    let target = content.lines().map(str::trim).find(|l| !l.is_empty())?;
    let target = dir.join(target);
    if target.is_dir() {
        Some(target)
    } else {
        tracing::debug!(path = %link.display(), target = %target.display(), "egg-link target missing");
        None
    }
}

fn read_record(metadata_file: &Path, location: &Path, packages: &mut Vec<PackageRecord>) {
    let content = match fs::read_to_string(metadata_file) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %metadata_file.display(), error = %e, "skipping unreadable metadata");
            return;
        }
    };

    match parse_metadata(&content) {
        Some((name, version)) => {
            packages.push(PackageRecord::new(safe_name(&name), version, location));
        }
        None => {
            tracing::debug!(path = %metadata_file.display(), "metadata lacks Name or Version");
        }
    }
}

/// Extracts the `Name` and `Version` headers from core metadata.
///
/// Only the header block (up to the first blank line) is considered.
pub fn parse_metadata(content: &str) -> Option<(String, String)> {
    let mut name = None;
    let mut version = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "Name" if name.is_none() => name = Some(value.to_string()),
                "Version" if version.is_none() => version = Some(value.to_string()),
                _ => {}
            }
        }
    }

    match (name, version) {
        (Some(n), Some(v)) if !n.is_empty() && !v.is_empty() => Some((n, v)),
        _ => None,
    }
}

/// Project name as setuptools reports it: every run of characters other than
/// ASCII alphanumerics and `.` collapses to a single `-`.
pub fn safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }

    out
}
