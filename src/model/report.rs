use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Digest, PackageRecord};

/// Placeholder used when an advisory carries no summary upstream.
pub const NO_DESCRIPTION: &str = "No description";

/// Outcome of comparing a local digest against the published one.
///
/// Serialized as `true` / `false` / `null` under the `tampered` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum TamperVerdict {
    Tampered,
    Clean,
    #[default]
    Unknown,
}

impl TamperVerdict {
    /// Both digests present and unequal is `Tampered`, both present and equal
    /// is `Clean`, anything else is `Unknown`.
    pub fn compare(local: Option<&Digest>, published: Option<&Digest>) -> Self {
        match (local, published) {
            (Some(local), Some(published)) if local == published => TamperVerdict::Clean,
            (Some(_), Some(_)) => TamperVerdict::Tampered,
            _ => TamperVerdict::Unknown,
        }
    }
}

impl From<Option<bool>> for TamperVerdict {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => TamperVerdict::Tampered,
            Some(false) => TamperVerdict::Clean,
            None => TamperVerdict::Unknown,
        }
    }
}

impl From<TamperVerdict> for Option<bool> {
    fn from(verdict: TamperVerdict) -> Self {
        match verdict {
            TamperVerdict::Tampered => Some(true),
            TamperVerdict::Clean => Some(false),
            TamperVerdict::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub summary: String,
}

/// Everything learned about one installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(flatten)]
    pub package: PackageRecord,
    pub local_hash: Option<Digest>,
    pub pypi_hash: Option<Digest>,
    #[serde(default)]
    pub tampered: TamperVerdict,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Reasons a lookup degraded to an unknown or empty result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScanRecord {
    pub fn is_vulnerable(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }
}

/// Complete results of one run, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub packages: Vec<ScanRecord>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            packages: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ScanRecord) {
        self.packages.push(record);
    }

    pub fn count_verdict(&self, verdict: TamperVerdict) -> usize {
        self.packages.iter().filter(|r| r.tampered == verdict).count()
    }

    pub fn vulnerable_count(&self) -> usize {
        self.packages.iter().filter(|r| r.is_vulnerable()).count()
    }

    pub fn vulnerability_count(&self) -> usize {
        self.packages.iter().map(|r| r.vulnerabilities.len()).sum()
    }
}

impl Default for ScanReport {
    fn default() -> Self {
        Self::new()
    }
}
