//! Cache keys.
//!
//! Gateway keys are readable (`quote:SPY`, `chain:SPY:2025-01-17`).
//! Memoization keys hash the canonical JSON form of their inputs so that
//! logically identical requests collide regardless of field order.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::Symbol;

/// The three data shapes served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Quote,
    Expirations,
    Chain,
}

impl DataKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Expirations => "expirations",
            Self::Chain => "chain",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key under which a value is cached and coalesced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap an already-formed key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn quote(symbol: &Symbol) -> Self {
        Self(format!("{}:{symbol}", DataKind::Quote))
    }

    #[must_use]
    pub fn expirations(symbol: &Symbol) -> Self {
        Self(format!("{}:{symbol}", DataKind::Expirations))
    }

    #[must_use]
    pub fn chain(symbol: &Symbol, expiration: NaiveDate) -> Self {
        Self(format!(
            "{}:{symbol}:{}",
            DataKind::Chain,
            expiration.format("%Y-%m-%d")
        ))
    }

    /// Deterministic key for an arbitrary computation: `namespace:` followed
    /// by the hex SHA-256 of the inputs' canonical JSON. Object keys are
    /// sorted, whitespace is dropped and integral floats are written as
    /// integers.
    pub fn hashed<T: Serialize + ?Sized>(
        namespace: &str,
        inputs: &T,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(inputs)?;
        let mut canonical = String::new();
        write_canonical(&value, &mut canonical);
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(Self(format!("{namespace}:{}", hex::encode(digest))))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        Value::Number(n) => out.push_str(&canonical_number(n)),
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Integral floats print as integers so `1.0` and `1` hash alike.
fn canonical_number(n: &serde_json::Number) -> String {
    // Beyond 2^53 not every integer is representable, so leave those alone.
    const EXACT: f64 = 9_007_199_254_740_992.0;
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= EXACT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gateway_keys_are_readable() {
        let spy = Symbol::parse("spy").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        assert_eq!(CacheKey::quote(&spy).as_str(), "quote:SPY");
        assert_eq!(CacheKey::expirations(&spy).as_str(), "expirations:SPY");
        assert_eq!(CacheKey::chain(&spy, date).as_str(), "chain:SPY:2025-01-17");
    }

    #[test]
    fn hashed_key_ignores_field_order() {
        let a = json!({"series": "CPIAUCSL", "start": "2020-01-01", "opts": {"b": 2, "a": 1}});
        let b = json!({"opts": {"a": 1, "b": 2}, "start": "2020-01-01", "series": "CPIAUCSL"});

        let ka = CacheKey::hashed("macro", &a).unwrap();
        let kb = CacheKey::hashed("macro", &b).unwrap();
        assert_eq!(ka, kb);
        assert!(ka.as_str().starts_with("macro:"));
        assert_eq!(ka.as_str().len(), "macro:".len() + 64);
    }

    #[test]
    fn hashed_key_depends_on_values_and_namespace() {
        let a = json!({"series": "CPIAUCSL"});
        let b = json!({"series": "UNRATE"});
        assert_ne!(
            CacheKey::hashed("macro", &a).unwrap(),
            CacheKey::hashed("macro", &b).unwrap()
        );
        assert_ne!(
            CacheKey::hashed("macro", &a).unwrap(),
            CacheKey::hashed("model", &a).unwrap()
        );
    }

    #[test]
    fn integral_floats_hash_like_integers() {
        let int = CacheKey::hashed("series", &json!({"lag": 1, "scale": -3})).unwrap();
        let float = CacheKey::hashed("series", &json!({"lag": 1.0, "scale": -3.0})).unwrap();
        let frac = CacheKey::hashed("series", &json!({"lag": 1.5, "scale": -3})).unwrap();

        assert_eq!(int, float);
        assert_ne!(int, frac);
    }

    #[test]
    fn array_order_is_significant() {
        let a = json!({"symbols": ["SPY", "QQQ"]});
        let b = json!({"symbols": ["QQQ", "SPY"]});
        assert_ne!(
            CacheKey::hashed("series", &a).unwrap(),
            CacheKey::hashed("series", &b).unwrap()
        );
    }
}
