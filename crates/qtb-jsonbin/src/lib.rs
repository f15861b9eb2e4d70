//! JSONBin adapter for the user registry.
//!
//! The whole registry is one JSON document in one bin. Reads fetch the
//! latest version without metadata; writes replace the document. JSONBin has
//! no conditional write, so concurrent writers resolve as last-writer-wins.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use qtb_core::{config::Config, errors::Error, ports::RegistryStore, registry::Registry, Result};

const MASTER_KEY_HEADER: &str = "X-Master-Key";
const BIN_META_HEADER: &str = "X-Bin-Meta";

#[derive(Clone, Debug)]
pub struct JsonBinStore {
    http: reqwest::Client,
    base_url: String,
    bin_id: String,
    api_key: String,
}

impl JsonBinStore {
    pub fn new(
        base_url: impl Into<String>,
        bin_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("jsonbin http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bin_id: bin_id.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.jsonbin_base_url.clone(),
            cfg.jsonbin_bin_id.clone(),
            cfg.jsonbin_api_key.clone(),
            cfg.http_timeout,
        )
    }

    fn bin_url(&self) -> String {
        format!("{}/b/{}", self.base_url, self.bin_id)
    }

    fn unavailable(what: &str, e: impl std::fmt::Display) -> Error {
        Error::RegistryUnavailable(format!("jsonbin {what}: {e}"))
    }
}

#[async_trait]
impl RegistryStore for JsonBinStore {
    async fn get(&self) -> Result<Registry> {
        let resp = self
            .http
            .get(format!("{}/latest", self.bin_url()))
            .header(MASTER_KEY_HEADER, &self.api_key)
            .header(BIN_META_HEADER, "false")
            .send()
            .await
            .map_err(|e| Self::unavailable("read", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::unavailable(
                "read",
                format!("{status} {}", body.chars().take(200).collect::<String>()),
            ));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Self::unavailable("read", e))?;
        // A freshly created bin may hold nothing at all.
        if body.trim().is_empty() || body.trim() == "null" {
            debug!("registry document is empty");
            return Ok(Registry::new());
        }

        serde_json::from_str::<Registry>(&body)
            .map_err(|e| Self::unavailable("document is malformed", e))
    }

    async fn put(&self, registry: &Registry) -> Result<()> {
        let resp = self
            .http
            .put(self.bin_url())
            .header(MASTER_KEY_HEADER, &self.api_key)
            .json(registry)
            .send()
            .await
            .map_err(|e| Self::unavailable("write", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::unavailable(
                "write",
                format!("{status} {}", body.chars().take(200).collect::<String>()),
            ));
        }
        debug!(users = registry.len(), "registry document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtb_core::domain::{Language, UserId};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn store(server: &MockServer) -> JsonBinStore {
        JsonBinStore::new(
            format!("{}/", server.uri()),
            "bin1",
            "secret",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reads_latest_document_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin1/latest"))
            .and(header("X-Master-Key", "secret"))
            .and(header("X-Bin-Meta", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": {
                    "7": {"id": 7, "preferred_language": "en"},
                    "8": {"id": 8, "preferred_language": "tr"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reg = store(&server).get().await.unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.language_of(UserId(7)), Language::En);
        assert_eq!(reg.language_of(UserId(8)), Language::Tr);
    }

    #[tokio::test]
    async fn empty_bin_reads_as_empty_registry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/bin1/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        assert!(store(&server).get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_registry_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = store(&server).get().await.unwrap_err();
        assert!(matches!(err, Error::RegistryUnavailable(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn malformed_document_is_registry_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"users\": [1, 2]}"))
            .mount(&server)
            .await;

        assert!(store(&server).get().await.unwrap_err().is_registry());
    }

    #[tokio::test]
    async fn unreachable_host_is_registry_unavailable() {
        let store = JsonBinStore::new("http://127.0.0.1:9", "bin1", "k", Duration::from_millis(500))
            .unwrap();
        assert!(store.get().await.unwrap_err().is_registry());
    }

    #[tokio::test]
    async fn writes_whole_document() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/b/bin1"))
            .and(header("X-Master-Key", "secret"))
            .and(body_json(json!({
                "users": {"5": {"id": 5, "preferred_language": "ar"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"record": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let mut reg = Registry::new();
        reg.upsert(UserId(5), Language::Ar);
        store(&server).put(&reg).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_write_is_registry_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = store(&server).put(&Registry::new()).await.unwrap_err();
        assert!(err.is_registry());
    }

    #[tokio::test]
    async fn unknown_top_level_fields_survive_a_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": {},
                "schema": 2
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(body_json(json!({
                "users": {"1": {"id": 1, "preferred_language": "am"}},
                "schema": 2
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server);
        let mut reg = store.get().await.unwrap();
        reg.upsert(UserId(1), Language::Am);
        store.put(&reg).await.unwrap();
    }
}
