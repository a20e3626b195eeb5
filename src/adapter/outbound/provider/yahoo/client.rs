//! Yahoo Finance REST client (free fallback vendor).

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;
use tracing::debug;

use super::dto::{expiration_timestamp, ChartResponse, OptionsResponse};
use super::settings::YahooSettings;
use super::PROVIDER;
use crate::adapter::outbound::provider::http::JsonClient;
use crate::domain::{OptionsChain, Quote, Symbol};
use crate::error::{ConfigError, ProviderError};
use crate::port::MarketDataProvider;

/// Yahoo Finance market data adapter.
///
/// Data is delayed and carries no greeks; it exists to keep callers served
/// while the primary vendor is unavailable.
#[derive(Debug)]
pub struct Yahoo {
    http: JsonClient,
    base: Url,
}

impl Yahoo {
    /// Create the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unusable base URL or timeout.
    pub fn new(settings: &YahooSettings) -> Result<Self, ConfigError> {
        let base = Url::parse(&settings.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "providers.fallback.base_url",
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "providers.fallback.base_url",
                reason: "URL cannot be used as a base".into(),
            });
        }
        let agent = Some(settings.user_agent.as_str()).filter(|a| !a.is_empty());
        Ok(Self {
            http: JsonClient::new(PROVIDER, settings.timeout(), agent)?,
            base,
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn options_url(&self, symbol: &Symbol, date: Option<NaiveDate>) -> Url {
        let ts = date.map(|d| expiration_timestamp(d).to_string());
        let query: Vec<(&str, &str)> = ts.iter().map(|t| ("date", t.as_str())).collect();
        self.url(&["v7", "finance", "options", symbol.as_str()], &query)
    }
}

#[async_trait]
impl MarketDataProvider for Yahoo {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        let url = self.url(
            &["v8", "finance", "chart", symbol.as_str()],
            &[("range", "1d"), ("interval", "1d")],
        );
        let response: ChartResponse = self.http.get_json(url).await?;
        response.into_quote(symbol)
    }

    async fn get_expirations(&self, symbol: &Symbol) -> Result<Vec<NaiveDate>, ProviderError> {
        let response: OptionsResponse = self.http.get_json(self.options_url(symbol, None)).await?;
        let dates = response.into_expirations(symbol)?;
        debug!(provider = PROVIDER, symbol = %symbol, count = dates.len(), "Fetched expirations");
        Ok(dates)
    }

    async fn get_chain(
        &self,
        symbol: &Symbol,
        expiration: NaiveDate,
    ) -> Result<OptionsChain, ProviderError> {
        let url = self.options_url(symbol, Some(expiration));
        let response: OptionsResponse = self.http.get_json(url).await?;
        response.into_chain(symbol, expiration)
    }
}
