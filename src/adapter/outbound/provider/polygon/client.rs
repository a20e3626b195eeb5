//! Polygon REST client (paid primary vendor).

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;
use tracing::debug;

use super::dto::{
    build_chain, collect_expirations, ChainSnapshotResponse, ContractsResponse, SnapshotResponse,
};
use super::settings::{PolygonSettings, API_KEY_ENV};
use super::PROVIDER;
use crate::adapter::outbound::provider::http::{paginate, JsonClient, Page};
use crate::domain::{OptionsChain, Quote, Symbol};
use crate::error::{ConfigError, ProviderError};
use crate::port::MarketDataProvider;

/// Polygon market data adapter.
///
/// - Quotes from the single-ticker stock snapshot.
/// - Expirations from the options contract reference listing (paginated).
/// - Chains from the options chain snapshot (paginated), including greeks.
#[derive(Debug)]
pub struct Polygon {
    http: JsonClient,
    base: Url,
    api_key: String,
    max_pages: usize,
    page_limit: u32,
}

impl Polygon {
    /// Create the adapter, validating settings up front.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no API key is configured and
    /// [`ConfigError::InvalidValue`] for an unusable base URL, timeout or page cap.
    pub fn new(settings: &PolygonSettings) -> Result<Self, ConfigError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingField { field: API_KEY_ENV })?
            .to_string();

        let base = Url::parse(&settings.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "providers.primary.base_url",
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "providers.primary.base_url",
                reason: "URL cannot be used as a base".into(),
            });
        }
        if settings.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "providers.primary.max_pages",
                reason: "must be > 0".into(),
            });
        }

        Ok(Self {
            http: JsonClient::new(PROVIDER, settings.timeout(), None)?,
            base,
            api_key,
            max_pages: settings.max_pages,
            page_limit: settings.page_limit.max(1),
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.extend_pairs(query);
            pairs.append_pair("apiKey", &self.api_key);
        }
        url
    }

    /// Resolve a `next_url` cursor link, re-attaching the credential.
    ///
    /// Links pointing at another host are refused so the key never leaves
    /// the configured vendor.
    fn follow(&self, next_url: Option<String>) -> Result<Option<Url>, ProviderError> {
        let Some(raw) = next_url.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let mut url = Url::parse(&raw).map_err(|e| ProviderError::malformed(PROVIDER, e))?;
        if url.host_str() != self.base.host_str() {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!("pagination link points at foreign host {:?}", url.host_str()),
            ));
        }
        url.query_pairs_mut().append_pair("apiKey", &self.api_key);
        Ok(Some(url))
    }
}

#[async_trait]
impl MarketDataProvider for Polygon {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        let url = self.url(
            &[
                "v2",
                "snapshot",
                "locale",
                "us",
                "markets",
                "stocks",
                "tickers",
                symbol.as_str(),
            ],
            &[],
        );
        let response: SnapshotResponse = self.http.get_json(url).await?;
        response.into_quote(symbol)
    }

    async fn get_expirations(&self, symbol: &Symbol) -> Result<Vec<NaiveDate>, ProviderError> {
        let limit = self.page_limit.to_string();
        let first = self.url(
            &["v3", "reference", "options", "contracts"],
            &[
                ("underlying_ticker", symbol.as_str()),
                ("expired", "false"),
                ("limit", limit.as_str()),
            ],
        );

        let contracts = paginate(PROVIDER, first, self.max_pages, |url| async move {
            let response: ContractsResponse = self.http.get_json(url).await?;
            response.envelope.check()?;
            Ok::<_, ProviderError>(Page {
                items: response.results,
                next: self.follow(response.next_url)?,
            })
        })
        .await?;

        let dates = collect_expirations(symbol, contracts)?;
        debug!(provider = PROVIDER, symbol = %symbol, count = dates.len(), "Fetched expirations");
        Ok(dates)
    }

    async fn get_chain(
        &self,
        symbol: &Symbol,
        expiration: NaiveDate,
    ) -> Result<OptionsChain, ProviderError> {
        let limit = self.page_limit.to_string();
        let date = expiration.format("%Y-%m-%d").to_string();
        let first = self.url(
            &["v3", "snapshot", "options", symbol.as_str()],
            &[("expiration_date", date.as_str()), ("limit", limit.as_str())],
        );

        let rows = paginate(PROVIDER, first, self.max_pages, |url| async move {
            let response: ChainSnapshotResponse = self.http.get_json(url).await?;
            response.envelope.check()?;
            Ok::<_, ProviderError>(Page {
                items: response.results,
                next: self.follow(response.next_url)?,
            })
        })
        .await?;

        let chain = build_chain(symbol, expiration, rows)?;
        debug!(provider = PROVIDER, symbol = %symbol, %expiration, contracts = chain.len(), "Fetched chain");
        Ok(chain)
    }
}
