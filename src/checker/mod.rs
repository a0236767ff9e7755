mod osv;

pub use osv::{OsvChecker, DEFAULT_OSV_URL, ECOSYSTEM};

use crate::model::{PackageRecord, Vulnerability};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VulnerabilityChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Looks up advisories for one package. Failures are returned, not
    /// swallowed; the caller decides how to degrade.
    async fn check(&self, package: &PackageRecord) -> Result<Vec<Vulnerability>>;
}
