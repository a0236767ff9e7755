use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::path::PathBuf;
use thiserror::Error;

/// Lowercase hexadecimal SHA-256 digest.
///
/// A digest identifies content, not correctness: two unequal digests say the
/// bytes differ, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wraps a hex string, normalizing it to lowercase.
    pub fn from_hex(hex: impl AsRef<str>) -> Self {
        Self(hex.as_ref().trim().to_ascii_lowercase())
    }

    pub fn from_hasher(hasher: Sha256) -> Self {
        Self(hex::encode(hasher.finalize()))
    }

    pub fn of_bytes(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a digest could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("package directory not found: {}", path.display())]
    NotInstalled { path: PathBuf },

    #[error("failed to traverse package directory: {0}")]
    Walk(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("registry returned HTTP {0}")]
    Status(u16),

    #[error("malformed registry response: {0}")]
    Malformed(String),

    #[error("no release {version} published")]
    MissingRelease { version: String },

    #[error("release has no sha256 digest")]
    NoDigest,
}

pub type HashResult = Result<Digest, Unavailable>;

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Digest as _;

    #[test]
    fn test_from_hex_lowercases() {
        let digest = Digest::from_hex("ABCDEF0123");
        assert_eq!(digest.as_str(), "abcdef0123");
    }

    #[test]
    fn test_of_bytes_known_value() {
        assert_eq!(
            Digest::of_bytes(b"hello").as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_from_hasher_matches_of_bytes() {
        let mut hasher = Sha256::new();
        hasher.update(b"hel");
        hasher.update(b"lo");
        assert_eq!(Digest::from_hasher(hasher), Digest::of_bytes(b"hello"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Digest::from_hex("ab12")).unwrap();
        assert_eq!(json, "\"ab12\"");
    }

    #[test]
    fn test_unavailable_display() {
        assert_eq!(Unavailable::Status(404).to_string(), "registry returned HTTP 404");
        assert_eq!(
            Unavailable::MissingRelease {
                version: "1.0.0".to_string()
            }
            .to_string(),
            "no release 1.0.0 published"
        );
    }
}
