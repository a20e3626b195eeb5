//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`provider`]: `ScriptedProvider`, an in-memory [`MarketDataProvider`]
//!   with canned data, optional latency, switchable failure and call counts.
//! - [`cache`]: `FailingStore`, a [`CacheStore`] standing in for an
//!   unreachable shared tier, and `SlowStore`, one whose reads lag.
//! - [`domain`]: builders for quotes, legs and chains.
//!
//! [`MarketDataProvider`]: crate::port::MarketDataProvider
//! [`CacheStore`]: crate::port::CacheStore

pub mod cache;
pub mod domain;
pub mod provider;
