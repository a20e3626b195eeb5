//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the gateway's infrastructure dependencies:
//! upstream market data vendors and key/value cache tiers.

pub mod cache;
pub mod provider;
