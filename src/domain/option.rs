//! Option chain snapshot types.
//!
//! - [`OptionLeg`] - One contract (a single strike on one side)
//! - [`OptionsChain`] - All calls and puts of one underlying for one expiration

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

/// A single contract within a chain.
///
/// Greeks are `None` when the vendor does not report them. Zero is a valid
/// greek and must never stand in for "unknown".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionLeg {
    pub strike: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    /// Implied volatility as a decimal fraction (0.25 = 25%).
    pub implied_volatility: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
    pub rho: Option<f64>,
}

impl OptionLeg {
    /// Create a leg with only the strike set.
    #[must_use]
    pub fn at_strike(strike: f64) -> Self {
        Self {
            strike,
            ..Self::default()
        }
    }

    /// Midpoint of bid and ask when both are present.
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }
}

/// Calls and puts of one underlying for one expiration date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsChain {
    pub symbol: Symbol,
    /// `None` when the vendor did not report a usable underlying price.
    pub underlying_price: Option<f64>,
    pub expiration: NaiveDate,
    /// Sorted ascending by strike.
    pub calls: Vec<OptionLeg>,
    /// Sorted ascending by strike.
    pub puts: Vec<OptionLeg>,
    pub as_of: Option<DateTime<Utc>>,
}

impl OptionsChain {
    /// Build a chain, sorting both sides by strike and discarding a
    /// non-finite underlying price.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        underlying_price: Option<f64>,
        expiration: NaiveDate,
        mut calls: Vec<OptionLeg>,
        mut puts: Vec<OptionLeg>,
        as_of: Option<DateTime<Utc>>,
    ) -> Self {
        calls.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        puts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        Self {
            symbol,
            underlying_price: underlying_price.filter(|p| p.is_finite()),
            expiration,
            calls,
            puts,
            as_of,
        }
    }

    /// Total number of contracts on both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    /// Returns true if the chain has no contracts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Legs for one side.
    #[must_use]
    pub fn side(&self, side: OptionSide) -> &[OptionLeg] {
        match side {
            OptionSide::Call => &self.calls,
            OptionSide::Put => &self.puts,
        }
    }
}
