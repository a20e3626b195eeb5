//! Remote cache tier over a REST key/value service.
//!
//! Speaks the Upstash-style REST dialect (`/get/{key}`, `/set/{key}?PX=`,
//! `/del/{key}`, `/scan/{cursor}/match/{pattern}/count/{n}`), so any
//! Redis-compatible service fronted by that API can back the shared tier.
//!
//! The remote service is an optimization, never a dependency: every failure
//! is logged and reported to the caller as a miss or a dropped write.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::CacheKey;
use crate::error::{CacheError, ConfigError};
use crate::port::CacheStore;

/// Upper bound on SCAN round-trips performed by `clear`.
const MAX_SCAN_ROUNDS: usize = 100;

/// Keys requested per SCAN round-trip.
const SCAN_COUNT: u32 = 500;

/// Stored representation. The absolute expiry travels with the value so
/// that every process derives the same remaining TTL.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: Value,
    expires_at_ms: i64,
}

#[derive(Debug, Deserialize)]
struct RestResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Connection settings for [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct RemoteStoreSettings {
    pub url: String,
    pub token: Option<String>,
    pub key_prefix: String,
    pub timeout: Duration,
}

/// Shared cache tier reachable over HTTP.
#[derive(Debug)]
pub struct RemoteStore {
    client: Client,
    base: Url,
    token: Option<String>,
    key_prefix: String,
}

impl RemoteStore {
    /// Create a remote store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is empty or unparsable, or if
    /// the HTTP client cannot be built.
    pub fn new(settings: RemoteStoreSettings) -> Result<Self, ConfigError> {
        if settings.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "cache.remote.url" });
        }
        let base = Url::parse(settings.url.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "cache.remote.url",
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "cache.remote.url",
                reason: "URL cannot be used as a base".into(),
            });
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            base,
            token: settings.token.filter(|t| !t.is_empty()),
            key_prefix: settings.key_prefix,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CacheError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| CacheError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn remote_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.key_prefix, key.as_str())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<Option<T>, CacheError> {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response: Response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CacheError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RestResponse<T> = serde_json::from_str(&text)?;
        if let Some(error) = parsed.error {
            return Err(CacheError::Status {
                status: status.as_u16(),
                body: error,
            });
        }
        Ok(parsed.result)
    }

    /// Fetch an entry, surfacing transport and decoding failures.
    pub async fn try_get(&self, key: &CacheKey) -> Result<Option<(Value, Duration)>, CacheError> {
        let url = self.endpoint(&["get", &self.remote_key(key)])?;
        let Some(raw) = self.call::<String>(Method::GET, url, None).await? else {
            return Ok(None);
        };

        let envelope: Envelope = serde_json::from_str(&raw)?;
        let remaining_ms = envelope.expires_at_ms - Utc::now().timestamp_millis();
        if remaining_ms <= 0 {
            return Ok(None);
        }
        Ok(Some((
            envelope.value,
            Duration::from_millis(remaining_ms.unsigned_abs()),
        )))
    }

    /// Store an entry, surfacing transport failures.
    pub async fn try_set(&self, key: &CacheKey, value: Value, ttl: Duration) -> Result<(), CacheError> {
        // Sub-millisecond TTLs would be rejected upstream as PX=0.
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let envelope = Envelope {
            value,
            expires_at_ms: Utc::now()
                .timestamp_millis()
                .saturating_add(i64::try_from(ttl_ms).unwrap_or(i64::MAX)),
        };
        let body = serde_json::to_string(&envelope)?;

        let mut url = self.endpoint(&["set", &self.remote_key(key)])?;
        url.query_pairs_mut().append_pair("PX", &ttl_ms.to_string());
        self.call::<String>(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    /// Delete an entry, surfacing transport failures.
    pub async fn try_delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let url = self.endpoint(&["del", &self.remote_key(key)])?;
        self.call::<i64>(Method::POST, url, None).await?;
        Ok(())
    }

    /// Delete every key under this store's prefix. Returns the number deleted.
    pub async fn try_clear(&self) -> Result<usize, CacheError> {
        let pattern = format!("{}*", self.key_prefix);
        let mut cursor = "0".to_string();
        let mut deleted = 0;

        for _ in 0..MAX_SCAN_ROUNDS {
            let url = self.endpoint(&[
                "scan",
                &cursor,
                "match",
                &pattern,
                "count",
                &SCAN_COUNT.to_string(),
            ])?;
            let Some((next, keys)) = self
                .call::<(String, Vec<String>)>(Method::GET, url, None)
                .await?
            else {
                break;
            };

            for key in &keys {
                let url = self.endpoint(&["del", key])?;
                self.call::<i64>(Method::POST, url, None).await?;
                deleted += 1;
            }

            if next == "0" {
                return Ok(deleted);
            }
            cursor = next;
        }

        warn!(deleted, "Remote cache clear stopped at scan limit");
        Ok(deleted)
    }
}

#[async_trait]
impl CacheStore for RemoteStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn get_with_ttl(&self, key: &CacheKey) -> Option<(Value, Duration)> {
        match self.try_get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Remote cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: Value, ttl: Duration) {
        if let Err(e) = self.try_set(key, value, ttl).await {
            warn!(key = %key, error = %e, "Remote cache write failed, dropping");
        }
    }

    async fn delete(&self, key: &CacheKey) {
        if let Err(e) = self.try_delete(key).await {
            warn!(key = %key, error = %e, "Remote cache delete failed");
        }
    }

    async fn clear(&self) {
        match self.try_clear().await {
            Ok(deleted) => debug!(deleted, "Cleared remote cache"),
            Err(e) => warn!(error = %e, "Remote cache clear failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(url: &str) -> RemoteStoreSettings {
        RemoteStoreSettings {
            url: url.into(),
            token: Some("secret".into()),
            key_prefix: "qg:".into(),
            timeout: Duration::from_millis(500),
        }
    }

    #[test]
    fn new_rejects_missing_url() {
        let err = RemoteStore::new(settings("  ")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { field: "cache.remote.url" }
        ));
    }

    #[test]
    fn new_rejects_unparsable_url() {
        let err = RemoteStore::new(settings("not a url")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn endpoint_encodes_key_segments() {
        let store = RemoteStore::new(settings("https://kv.example.com/")).unwrap();
        let key = CacheKey::new("chain:BRK/B:2025-01-17");
        let url = store
            .endpoint(&["get", &store.remote_key(&key)])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://kv.example.com/get/qg:chain:BRK%2FB:2025-01-17"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let store = RemoteStore::new(settings("https://kv.example.com/v1")).unwrap();
        let url = store.endpoint(&["del", "qg:quote:SPY"]).unwrap();
        assert_eq!(url.as_str(), "https://kv.example.com/v1/del/qg:quote:SPY");
    }

    #[test]
    fn envelope_round_trips_through_rest_string() {
        let envelope = Envelope {
            value: json!({"symbol": "SPY", "price": 550.12}),
            expires_at_ms: 1_700_000_000_000,
        };
        let stored = serde_json::to_string(&envelope).unwrap();
        let response = json!({ "result": stored }).to_string();

        let parsed: RestResponse<String> = serde_json::from_str(&response).unwrap();
        let back: Envelope = serde_json::from_str(&parsed.result.unwrap()).unwrap();
        assert_eq!(back.value["price"], json!(550.12));
        assert_eq!(back.expires_at_ms, 1_700_000_000_000);
    }

    #[test]
    fn scan_result_shape_decodes() {
        let body = r#"{"result":["42",["qg:quote:SPY","qg:quote:QQQ"]]}"#;
        let parsed: RestResponse<(String, Vec<String>)> = serde_json::from_str(body).unwrap();
        let (cursor, keys) = parsed.result.unwrap();
        assert_eq!(cursor, "42");
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_miss() {
        // Port 9 (discard) on loopback refuses connections.
        let store = RemoteStore::new(settings("http://127.0.0.1:9")).unwrap();
        let key = CacheKey::new("quote:SPY");

        assert!(store.try_get(&key).await.is_err());
        assert!(store.get(&key).await.is_none());

        // Must not panic or surface an error.
        store.set(&key, json!(1), Duration::from_secs(30)).await;
        store.delete(&key).await;
        store.clear().await;
    }
}
