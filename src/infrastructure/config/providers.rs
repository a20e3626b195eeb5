//! `[providers]` section.

use serde::Deserialize;

use crate::adapter::outbound::provider::{PolygonSettings, YahooSettings};

/// Primary (paid) and fallback (free) vendor settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub primary: PolygonSettings,
    pub fallback: YahooSettings,
}
