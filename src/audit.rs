//! Per-package auditing and report assembly.
//!
//! [`Auditor::audit_package`] builds one [`ScanRecord`] from scratch, and
//! [`Auditor::run`] appends those records to a fresh [`ScanReport`] in
//! enumeration order. The report carries the caller's start time. Packages are processed strictly one after another.
//!
//! No failure for an individual package escapes: missing digests become an
//! unknown verdict and a failed advisory lookup becomes an empty list, both
//! with a warning attached to the record.

use crate::checker::{OsvChecker, VulnerabilityChecker};
use crate::config::{Config, IgnoreConfig};
use crate::hasher;
use crate::model::{PackageRecord, ScanRecord, ScanReport, TamperVerdict};
use crate::registry::PypiRegistry;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;

pub struct Auditor {
    registry: PypiRegistry,
    checker: Box<dyn VulnerabilityChecker>,
    ignore: IgnoreConfig,
}

/// Builds the HTTP client shared by the registry and the advisory lookups.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

impl Auditor {
    pub fn new(registry: PypiRegistry, checker: Box<dyn VulnerabilityChecker>, ignore: IgnoreConfig) -> Self {
        Self {
            registry,
            checker,
            ignore,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(
            PypiRegistry::new(client.clone(), config.index_url.clone()),
            Box::new(OsvChecker::new(client, config.vuln_db_url.clone())),
            config.ignore.clone(),
        ))
    }

    /// Hashes, fetches, compares and looks up advisories for one package.
    pub async fn audit_package(&self, package: &PackageRecord) -> ScanRecord {
        let mut warnings = Vec::new();

        let local_hash = match hasher::hash_package(package) {
            Ok(digest) => Some(digest),
            Err(reason) => {
                tracing::debug!(package = %package, %reason, "local hash unavailable");
                warnings.push(format!("local hash unavailable: {}", reason));
                None
            }
        };

        let pypi_hash = match self.registry.fetch_digest(&package.name, &package.version).await {
            Ok(digest) => Some(digest),
            Err(reason) => {
                tracing::debug!(package = %package, %reason, "registry hash unavailable");
                warnings.push(format!("registry hash unavailable: {}", reason));
                None
            }
        };

        let tampered = TamperVerdict::compare(local_hash.as_ref(), pypi_hash.as_ref());

        let vulnerabilities = match self.checker.check(package).await {
            Ok(vulns) => vulns
                .into_iter()
                .filter(|v| !self.ignore.should_ignore_vulnerability(&v.id))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    package = %package,
                    checker = self.checker.name(),
                    error = %format!("{:#}", e),
                    "vulnerability lookup failed; recording none"
                );
                warnings.push(format!("vulnerability lookup failed: {:#}", e));
                Vec::new()
            }
        };

        ScanRecord {
            package: package.clone(),
            local_hash,
            pypi_hash,
            tampered,
            vulnerabilities,
            warnings,
        }
    }

    /// Audits `packages` in order and returns the finished report, stamped
    /// with `generated_at`.
    ///
    /// `on_record` sees each record as soon as it is appended.
    pub async fn run<F>(
        &self,
        generated_at: DateTime<Utc>,
        packages: &[PackageRecord],
        mut on_record: F,
    ) -> ScanReport
    where
        F: FnMut(&ScanRecord),
    {
        let mut report = ScanReport::at(generated_at);

        for package in packages {
            if self.ignore.should_ignore_package(&package.name) {
                tracing::debug!(package = %package, "ignored by config");
                continue;
            }

            let record = self.audit_package(package).await;
            on_record(&record);
            report.push(record);
        }

        report
    }
}
