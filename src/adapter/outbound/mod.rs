//! Outbound adapters (driven side).

pub mod cache;
pub mod provider;
