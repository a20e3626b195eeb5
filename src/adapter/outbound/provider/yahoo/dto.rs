//! Yahoo Finance wire formats and their translation to domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::PROVIDER;
use crate::domain::{OptionLeg, OptionsChain, Quote, Symbol};
use crate::error::ProviderError;

#[derive(Debug, Deserialize)]
pub struct YahooError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl YahooError {
    fn into_provider_error(self) -> ProviderError {
        ProviderError::malformed(
            PROVIDER,
            format!(
                "{}: {}",
                self.code.as_deref().unwrap_or("error"),
                self.description.as_deref().unwrap_or("no description")
            ),
        )
    }
}

/// Take the single result out of a Yahoo `{result: [..], error}` envelope.
fn single<T>(
    result: Option<Vec<T>>,
    error: Option<YahooError>,
    what: impl FnOnce() -> String,
) -> Result<T, ProviderError> {
    if let Some(error) = error {
        return Err(error.into_provider_error());
    }
    result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::no_data(PROVIDER, what()))
}

fn from_unix(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

// --- Quote: /v8/finance/chart/{symbol} ---

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub regular_market_price: Option<f64>,
    pub regular_market_time: Option<i64>,
}

impl ChartResponse {
    pub fn into_quote(self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        let result = single(self.chart.result, self.chart.error, || format!("quote {symbol}"))?;
        Ok(Quote::new(
            symbol.clone(),
            result.meta.regular_market_price,
            result.meta.regular_market_time.and_then(from_unix),
        ))
    }
}

// --- Expirations and chains: /v7/finance/options/{symbol}[?date=] ---

#[derive(Debug, Deserialize)]
pub struct OptionsResponse {
    #[serde(rename = "optionChain")]
    pub option_chain: OptionChainEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct OptionChainEnvelope {
    pub result: Option<Vec<OptionsResult>>,
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResult {
    #[serde(default)]
    pub expiration_dates: Vec<i64>,
    pub quote: Option<UnderlyingQuote>,
    #[serde(default)]
    pub options: Vec<ExpirySlice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingQuote {
    pub regular_market_price: Option<f64>,
    pub regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirySlice {
    pub expiration_date: i64,
    #[serde(default)]
    pub calls: Vec<Contract>,
    #[serde(default)]
    pub puts: Vec<Contract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub strike: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<f64>,
    pub open_interest: Option<f64>,
    pub implied_volatility: Option<f64>,
}

fn count(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

impl Contract {
    fn into_leg(self) -> Result<OptionLeg, ProviderError> {
        if !self.strike.is_finite() {
            return Err(ProviderError::malformed(PROVIDER, "non-finite strike"));
        }
        // Greeks are not published by this vendor and stay absent.
        Ok(OptionLeg {
            strike: self.strike,
            bid: self.bid,
            ask: self.ask,
            volume: count(self.volume),
            open_interest: count(self.open_interest),
            implied_volatility: self.implied_volatility,
            ..OptionLeg::default()
        })
    }
}

/// Midnight UTC of `date`, the form Yahoo expects in `?date=`.
#[must_use]
pub fn expiration_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(0, |dt| dt.and_utc().timestamp())
}

impl OptionsResponse {
    fn into_result(self, what: impl FnOnce() -> String) -> Result<OptionsResult, ProviderError> {
        single(self.option_chain.result, self.option_chain.error, what)
    }

    pub fn into_expirations(self, symbol: &Symbol) -> Result<Vec<NaiveDate>, ProviderError> {
        let result = self.into_result(|| format!("expirations {symbol}"))?;
        let mut dates = BTreeSet::new();
        for ts in result.expiration_dates {
            let dt = from_unix(ts).ok_or_else(|| {
                ProviderError::malformed(PROVIDER, format!("expiration timestamp {ts} out of range"))
            })?;
            dates.insert(dt.date_naive());
        }
        if dates.is_empty() {
            return Err(ProviderError::no_data(PROVIDER, format!("expirations {symbol}")));
        }
        Ok(dates.into_iter().collect())
    }

    pub fn into_chain(
        self,
        symbol: &Symbol,
        expiration: NaiveDate,
    ) -> Result<OptionsChain, ProviderError> {
        let what = || format!("chain {symbol} {expiration}");
        let result = self.into_result(what)?;

        // Yahoo answers an unlisted date with the nearest listed expiry.
        let slice = result
            .options
            .into_iter()
            .find(|slice| from_unix(slice.expiration_date).map(|dt| dt.date_naive()) == Some(expiration))
            .ok_or_else(|| ProviderError::no_data(PROVIDER, what()))?;

        if slice.calls.is_empty() && slice.puts.is_empty() {
            return Err(ProviderError::no_data(PROVIDER, what()));
        }

        let calls = slice
            .calls
            .into_iter()
            .map(Contract::into_leg)
            .collect::<Result<Vec<_>, _>>()?;
        let puts = slice
            .puts
            .into_iter()
            .map(Contract::into_leg)
            .collect::<Result<Vec<_>, _>>()?;

        let quote = result.quote.as_ref();
        Ok(OptionsChain::new(
            symbol.clone(),
            quote.and_then(|q| q.regular_market_price),
            expiration,
            calls,
            puts,
            quote.and_then(|q| q.regular_market_time).and_then(from_unix),
        ))
    }
}
