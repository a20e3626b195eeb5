//! Polygon wire formats and their translation to domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::PROVIDER;
use crate::domain::{OptionLeg, OptionsChain, Quote, Symbol};
use crate::error::ProviderError;

/// Fields every Polygon envelope carries.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    /// Polygon reports some failures with HTTP 200 and `status: "ERROR"`.
    pub fn check(&self) -> Result<(), ProviderError> {
        match self.status.as_deref() {
            Some(status @ ("ERROR" | "NOT_AUTHORIZED" | "NOT_FOUND")) => {
                let reason = self
                    .error
                    .as_deref()
                    .or(self.message.as_deref())
                    .unwrap_or("unspecified upstream error");
                Err(ProviderError::malformed(PROVIDER, format!("status {status}: {reason}")))
            }
            _ => Ok(()),
        }
    }
}

// --- Quote: /v2/snapshot/locale/us/markets/stocks/tickers/{ticker} ---

#[derive(Debug, Deserialize)]
pub struct SnapshotResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub ticker: Option<TickerSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerSnapshot {
    pub last_trade: Option<Trade>,
    pub day: Option<Bar>,
    pub prev_day: Option<Bar>,
    /// Nanoseconds since the epoch.
    pub updated: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Trade {
    pub p: Option<f64>,
    /// Nanoseconds since the epoch.
    pub t: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Bar {
    pub c: Option<f64>,
}

impl SnapshotResponse {
    pub fn into_quote(self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        self.envelope.check()?;
        let ticker = self
            .ticker
            .ok_or_else(|| ProviderError::no_data(PROVIDER, format!("quote {symbol}")))?;

        let trade_price = ticker.last_trade.as_ref().and_then(|t| t.p).filter(|p| *p > 0.0);
        let close = |bar: &Option<Bar>| bar.as_ref().and_then(|b| b.c).filter(|p| *p > 0.0);
        let price = trade_price
            .or_else(|| close(&ticker.day))
            .or_else(|| close(&ticker.prev_day));

        let as_of = ticker
            .last_trade
            .as_ref()
            .and_then(|t| t.t)
            .or(ticker.updated)
            .map(DateTime::from_timestamp_nanos);

        Ok(Quote::new(symbol.clone(), price, as_of))
    }
}

// --- Expirations: /v3/reference/options/contracts ---

#[derive(Debug, Deserialize)]
pub struct ContractsResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub results: Vec<ContractReference>,
    pub next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContractReference {
    pub expiration_date: NaiveDate,
}

/// Ascending, deduplicated expiration dates.
pub fn collect_expirations(
    symbol: &Symbol,
    contracts: impl IntoIterator<Item = ContractReference>,
) -> Result<Vec<NaiveDate>, ProviderError> {
    let dates: BTreeSet<NaiveDate> = contracts.into_iter().map(|c| c.expiration_date).collect();
    if dates.is_empty() {
        return Err(ProviderError::no_data(PROVIDER, format!("expirations {symbol}")));
    }
    Ok(dates.into_iter().collect())
}

// --- Chain: /v3/snapshot/options/{underlying} ---

#[derive(Debug, Deserialize)]
pub struct ChainSnapshotResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub results: Vec<ContractSnapshot>,
    pub next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContractSnapshot {
    pub details: ContractDetails,
    pub last_quote: Option<LastQuote>,
    pub day: Option<DayStats>,
    pub open_interest: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub greeks: Option<Greeks>,
    pub underlying_asset: Option<UnderlyingAsset>,
}

#[derive(Debug, Deserialize)]
pub struct ContractDetails {
    pub contract_type: String,
    pub strike_price: f64,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct LastQuote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Nanoseconds since the epoch.
    pub last_updated: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DayStats {
    pub volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Greeks {
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UnderlyingAsset {
    pub price: Option<f64>,
}

fn count(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

impl ContractSnapshot {
    fn to_leg(&self) -> OptionLeg {
        let quote = self.last_quote.as_ref();
        let greeks = self.greeks.as_ref();
        OptionLeg {
            strike: self.details.strike_price,
            bid: quote.and_then(|q| q.bid),
            ask: quote.and_then(|q| q.ask),
            volume: count(self.day.as_ref().and_then(|d| d.volume)),
            open_interest: count(self.open_interest),
            implied_volatility: self.implied_volatility,
            delta: greeks.and_then(|g| g.delta),
            gamma: greeks.and_then(|g| g.gamma),
            theta: greeks.and_then(|g| g.theta),
            vega: greeks.and_then(|g| g.vega),
            // Not published by this vendor.
            rho: None,
        }
    }
}

/// Assemble a chain from snapshot rows, keeping only rows for `expiration`.
pub fn build_chain(
    symbol: &Symbol,
    expiration: NaiveDate,
    rows: Vec<ContractSnapshot>,
) -> Result<OptionsChain, ProviderError> {
    let mut calls = Vec::new();
    let mut puts = Vec::new();
    let mut underlying_price = None;
    let mut as_of: Option<DateTime<Utc>> = None;

    for row in rows.iter().filter(|r| r.details.expiration_date == expiration) {
        if !row.details.strike_price.is_finite() {
            return Err(ProviderError::malformed(PROVIDER, "non-finite strike price"));
        }
        match row.details.contract_type.as_str() {
            "call" => calls.push(row.to_leg()),
            "put" => puts.push(row.to_leg()),
            other => {
                return Err(ProviderError::malformed(
                    PROVIDER,
                    format!("unknown contract_type {other:?}"),
                ))
            }
        }
        if underlying_price.is_none() {
            underlying_price = row.underlying_asset.as_ref().and_then(|u| u.price);
        }
        let updated = row
            .last_quote
            .as_ref()
            .and_then(|q| q.last_updated)
            .map(DateTime::from_timestamp_nanos);
        as_of = as_of.max(updated);
    }

    if calls.is_empty() && puts.is_empty() {
        return Err(ProviderError::no_data(
            PROVIDER,
            format!("chain {symbol} {expiration}"),
        ));
    }

    Ok(OptionsChain::new(
        symbol.clone(),
        underlying_price,
        expiration,
        calls,
        puts,
        as_of,
    ))
}
