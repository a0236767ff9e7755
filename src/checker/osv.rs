use crate::model::{PackageRecord, Vulnerability, NO_DESCRIPTION};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OSV_URL: &str = "https://api.osv.dev";

/// OSV ecosystem tag for packages published on PyPI.
pub const ECOSYSTEM: &str = "PyPI";

pub struct OsvChecker {
    client: reqwest::Client,
    base_url: String,
}

impl OsvChecker {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/v1/query", self.base_url)
    }
}

impl Default for OsvChecker {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_OSV_URL)
    }
}

#[derive(Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
}

#[derive(Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    version: &'a str,
    ecosystem: &'a str,
}

#[derive(Deserialize)]
struct OsvResponse {
    vulns: Option<Vec<OsvVuln>>,
}

#[derive(Deserialize)]
struct OsvVuln {
    id: String,
    summary: Option<String>,
}

#[async_trait]
impl super::VulnerabilityChecker for OsvChecker {
    fn name(&self) -> &'static str {
        "OSV.dev"
    }

    async fn check(&self, package: &PackageRecord) -> Result<Vec<Vulnerability>> {
        let query = OsvQuery {
            package: OsvPackage {
                name: &package.name,
                version: &package.version,
                ecosystem: ECOSYSTEM,
            },
        };

        let response = self
            .client
            .post(self.query_url())
            .json(&query)
            .send()
            .await
            .context("OSV request failed")?
            .error_for_status()
            .context("OSV returned an error status")?;

        let body: OsvResponse = response
            .json()
            .await
            .context("Failed to parse OSV response")?;

        let vulnerabilities = body
            .vulns
            .unwrap_or_default()
            .into_iter()
            .map(|v| Vulnerability {
                id: v.id,
                summary: v.summary.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            })
            .collect();

        Ok(vulnerabilities)
    }
}
