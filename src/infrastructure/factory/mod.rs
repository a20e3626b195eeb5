//! Factory functions that build configured components from [`Config`].
//!
//! # Submodules
//!
//! - [`cache`] - Cache store construction (driver selection, sweeper)
//! - [`provider`] - Primary and fallback vendor adapters
//! - [`gateway`] - Fully wired [`MarketDataGateway`]
//!
//! [`Config`]: crate::infrastructure::config::Config
//! [`MarketDataGateway`]: crate::application::MarketDataGateway

pub mod cache;
pub mod gateway;
pub mod provider;

pub use cache::build_cache;
pub use gateway::build_gateway;
pub use provider::{build_fallback, build_primary};
