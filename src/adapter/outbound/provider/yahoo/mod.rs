//! Yahoo Finance adapter (free fallback vendor).

mod client;
mod dto;
mod settings;

pub use client::Yahoo;
pub use settings::{YahooSettings, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

/// Provider name used in logs and errors.
pub const PROVIDER: &str = "yahoo";
