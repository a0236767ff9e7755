use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        return Platform::MacOS;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        return Platform::Linux;
    }
}

/// An installed distribution as reported by a scanner.
///
/// `location` is the import-path entry the distribution was found under
/// (typically a `site-packages` directory), not the package directory itself.
/// Non-UTF-8 locations are written lossily so they never block a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    #[serde(serialize_with = "serialize_lossy")]
    pub location: PathBuf,
}

fn serialize_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            location: location.into(),
        }
    }
}

impl std::fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_serializes_as_string() {
        let record = PackageRecord::new("demo", "1.0.0", "/site-packages");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["location"], serde_json::json!("/site-packages"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_location_serializes_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let location = PathBuf::from(OsStr::from_bytes(b"/tmp/site-\xff"));
        let record = PackageRecord::new("demo", "1.0.0", location);

        let json = serde_json::to_string(&record).unwrap();
        let back: PackageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.location, PathBuf::from("/tmp/site-\u{FFFD}"));
    }
}
