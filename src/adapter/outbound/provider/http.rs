//! HTTP plumbing shared by vendor adapters.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::error::{ConfigError, ProviderError};

/// Longest upstream error body kept in a [`ProviderError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// JSON-over-HTTP client bound to one provider name.
///
/// Every request is bounded by the client timeout. Non-success statuses,
/// timeouts, transport failures and bodies that do not match the expected
/// shape all become [`ProviderError`]s attributed to the provider.
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: Client,
    provider: &'static str,
    timeout: Duration,
}

impl JsonClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is zero or the TLS backend cannot be
    /// initialised.
    pub fn new(
        provider: &'static str,
        timeout: Duration,
        user_agent: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be > 0".into(),
            });
        }
        let mut builder = Client::builder().timeout(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            provider,
            timeout,
        })
    }

    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// GET `url` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        trace!(provider = self.provider, url = %redact(&url), "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: self.provider,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: self.provider,
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        decode(self.provider, &body)
    }

    fn transport_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                provider: self.provider,
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            ProviderError::Transport {
                provider: self.provider,
                message: describe(err),
            }
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    // The URL may carry a credential in its query string.
    let mut message = err.to_string();
    if let Some(url) = err.url() {
        message = message.replace(url.as_str(), &redact(url));
    }
    message
}

/// Decode a response body, reporting shape mismatches as malformed.
pub fn decode<T: DeserializeOwned>(provider: &'static str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::malformed(provider, e))
}

/// One page of a paginated listing.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Url>,
}

/// Follow `next` links starting at `first`, fetching at most `max_pages`
/// pages. Hitting the cap returns what was collected so far.
pub async fn paginate<T, F, Fut>(
    provider: &'static str,
    first: Url,
    max_pages: usize,
    mut fetch: F,
) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<Page<T>, ProviderError>>,
{
    let mut items = Vec::new();
    let mut next = Some(first);
    let mut pages = 0;

    while let Some(url) = next.take() {
        if pages == max_pages {
            warn!(provider, max_pages, "Pagination cap reached, truncating listing");
            break;
        }
        let page = fetch(url).await?;
        pages += 1;
        items.extend(page.items);
        next = page.next;
    }

    Ok(items)
}

/// Render a URL with credential-bearing query parameters masked.
#[must_use]
pub fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let masked = matches!(k.as_ref(), "apiKey" | "apikey" | "token" | "api_key");
            let value = if masked { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    if pairs.is_empty() {
        return shown.to_string();
    }
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
