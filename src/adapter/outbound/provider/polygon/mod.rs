//! Polygon adapter (paid primary vendor).

mod client;
mod dto;
mod settings;

pub use client::Polygon;
pub use settings::{PolygonSettings, API_KEY_ENV, DEFAULT_BASE_URL};

/// Provider name used in logs and errors.
pub const PROVIDER: &str = "polygon";
