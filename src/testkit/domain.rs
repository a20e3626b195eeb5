//! Builders for domain values used across tests.

use chrono::NaiveDate;

use crate::domain::{OptionLeg, OptionsChain, Quote, Symbol};

/// Parse a symbol, panicking on blank input.
pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("test symbol must not be blank")
}

/// Parse a `YYYY-MM-DD` date, panicking on bad input.
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}

pub fn quote(raw: &str, price: f64) -> Quote {
    Quote::new(symbol(raw), Some(price), None)
}

/// Leg at `strike` with a bid/ask around `mid`.
pub fn leg(strike: f64, mid: f64) -> OptionLeg {
    OptionLeg {
        bid: Some(mid - 0.05),
        ask: Some(mid + 0.05),
        ..OptionLeg::at_strike(strike)
    }
}

/// Small chain with one call and one put around `underlying`.
pub fn chain(raw: &str, expiration: &str, underlying: f64) -> OptionsChain {
    OptionsChain::new(
        symbol(raw),
        Some(underlying),
        date(expiration),
        vec![leg(underlying + 5.0, 1.0)],
        vec![leg(underlying - 5.0, 1.2)],
        None,
    )
}
