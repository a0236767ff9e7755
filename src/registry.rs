//! Published digests from the PyPI JSON API.

use crate::model::{Digest, HashResult, Unavailable};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

pub struct PypiRegistry {
    client: reqwest::Client,
    base_url: String,
}

/// Release entries stay untyped so a malformed file under one version cannot
/// spoil the lookup of another.
#[derive(Deserialize)]
struct ProjectInfo {
    #[serde(default)]
    releases: HashMap<String, Value>,
}

impl PypiRegistry {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, name)
    }

    /// Returns the first sha256 digest published for `name==version`.
    ///
    /// One request, no retry. Every failure is reported as [`Unavailable`].
    pub async fn fetch_digest(&self, name: &str, version: &str) -> HashResult {
        let response = self
            .client
            .get(self.project_url(name))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Unavailable::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Unavailable::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Unavailable::Request(e.to_string()))?;

        first_sha256(&body, version)
    }
}

fn first_sha256(body: &str, version: &str) -> HashResult {
    let info: ProjectInfo =
        serde_json::from_str(body).map_err(|e| Unavailable::Malformed(e.to_string()))?;

    let files = info
        .releases
        .get(version)
        .ok_or_else(|| Unavailable::MissingRelease {
            version: version.to_string(),
        })?;

    let files = files.as_array().ok_or_else(|| {
        Unavailable::Malformed(format!("release {} is not a list of files", version))
    })?;

    files
        .iter()
        .find_map(file_sha256)
        .map(Digest::from_hex)
        .ok_or(Unavailable::NoDigest)
}

fn file_sha256(file: &Value) -> Option<&str> {
    file.get("digests")?
        .get("sha256")?
        .as_str()
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn registry(server: &MockServer) -> PypiRegistry {
        PypiRegistry::new(reqwest::Client::new(), server.base_url())
    }

    #[test]
    fn test_first_sha256_picks_first_file_with_digest() {
        let body = json!({
            "releases": {
                "1.0.0": [
                    {"filename": "demo-1.0.0.tar.gz", "digests": {"md5": "x"}},
                    {"filename": "demo-1.0.0-py3-none-any.whl", "digests": {"sha256": "AAAA"}},
                    {"filename": "demo-1.0.0-cp312.whl", "digests": {"sha256": "bbbb"}}
                ]
            }
        })
        .to_string();

        assert_eq!(first_sha256(&body, "1.0.0").unwrap(), Digest::from_hex("aaaa"));
    }

    #[test]
    fn test_first_sha256_missing_version() {
        let body = json!({"releases": {"0.9.0": []}}).to_string();
        assert_eq!(
            first_sha256(&body, "1.0.0").unwrap_err(),
            Unavailable::MissingRelease {
                version: "1.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_first_sha256_no_releases_key() {
        let body = json!({"message": "Not Found"}).to_string();
        assert!(matches!(
            first_sha256(&body, "1.0.0"),
            Err(Unavailable::MissingRelease { .. })
        ));
    }

    #[test]
    fn test_first_sha256_no_digest() {
        let body = json!({"releases": {"1.0.0": [{"digests": {}}, {}]}}).to_string();
        assert_eq!(first_sha256(&body, "1.0.0").unwrap_err(), Unavailable::NoDigest);
    }

    #[test]
    fn test_first_sha256_tolerates_malformed_sibling_entries() {
        let body = json!({
            "releases": {
                "1.0.0": [
                    {"digests": null},
                    "not-an-object",
                    {"digests": {"sha256": 42}},
                    {"digests": {"sha256": "aa"}}
                ],
                "0.0.1": [{"digests": null}],
                "0.0.2": null
            }
        })
        .to_string();

        assert_eq!(first_sha256(&body, "1.0.0").unwrap(), Digest::from_hex("aa"));
    }

    #[test]
    fn test_first_sha256_release_not_a_list() {
        let body = json!({"releases": {"1.0.0": {"digests": {}}}}).to_string();
        assert!(matches!(
            first_sha256(&body, "1.0.0"),
            Err(Unavailable::Malformed(_))
        ));
    }

    #[test]
    fn test_first_sha256_invalid_json() {
        assert!(matches!(
            first_sha256("<html>oops</html>", "1.0.0"),
            Err(Unavailable::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_digest_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/pypi/demo/json");
                then.status(200).json_body(json!({
                    "releases": {"1.0.0": [{"digests": {"sha256": "abc123"}}]}
                }));
            })
            .await;

        let digest = registry(&server).fetch_digest("demo", "1.0.0").await.unwrap();

        mock.assert_async().await;
        assert_eq!(digest, Digest::from_hex("abc123"));
    }

    #[tokio::test]
    async fn test_fetch_digest_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/pypi/demo/json");
                then.status(404).json_body(json!({"message": "Not Found"}));
            })
            .await;

        let err = registry(&server).fetch_digest("demo", "1.0.0").await.unwrap_err();
        assert_eq!(err, Unavailable::Status(404));
    }

    #[tokio::test]
    async fn test_fetch_digest_unreachable() {
        let registry = PypiRegistry::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let err = registry.fetch_digest("demo", "1.0.0").await.unwrap_err();
        assert!(matches!(err, Unavailable::Request(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let registry = PypiRegistry::new(reqwest::Client::new(), "https://pypi.org/");
        assert_eq!(registry.project_url("demo"), "https://pypi.org/pypi/demo/json");
    }
}
