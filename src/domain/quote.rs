//! Spot quote for an underlying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Last known price of an underlying, as reported by one provider.
///
/// Quotes are immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub as_of: Option<DateTime<Utc>>,
}

impl Quote {
    #[must_use]
    pub fn new(symbol: Symbol, price: Option<f64>, as_of: Option<DateTime<Utc>>) -> Self {
        Self {
            symbol,
            // NaN is "unknown", which is what None already says.
            price: price.filter(|p| p.is_finite()),
            as_of,
        }
    }
}
