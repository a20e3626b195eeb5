//! Market data provider port.
//!
//! A provider adapts one vendor's API to the normalized domain types. It
//! never consults the cache or the coalescing registry; those belong to the
//! gateway, which is what lets any provider stand in as a fallback.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{OptionsChain, Quote, Symbol};
use crate::error::ProviderError;

/// Adapter for a single upstream market data vendor.
///
/// # Errors
///
/// Each operation returns a fully populated value or a [`ProviderError`].
/// Partial or garbled upstream responses are errors, never empty results.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Stable provider name used for logging and error attribution only.
    fn name(&self) -> &'static str;

    /// Latest quote for `symbol`.
    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError>;

    /// Listed expiration dates for `symbol`, ascending and deduplicated.
    async fn get_expirations(&self, symbol: &Symbol) -> Result<Vec<NaiveDate>, ProviderError>;

    /// Chain snapshot for `symbol` at `expiration`.
    async fn get_chain(
        &self,
        symbol: &Symbol,
        expiration: NaiveDate,
    ) -> Result<OptionsChain, ProviderError>;
}
