//! Quotegate - market data gateway with caching, request coalescing and
//! vendor fallback.
//!
//! Callers ask the [`MarketDataGateway`](application::MarketDataGateway) for
//! quotes, option expirations and option chains. The gateway answers from
//! cache when it can, merges concurrent identical requests into one upstream
//! call, and falls back from the paid primary vendor to a free secondary
//! vendor when the primary fails.
//!
//! # Modules
//!
//! - [`domain`] - Normalized market data types and cache keys
//! - [`port`] - `MarketDataProvider` and `CacheStore` traits
//! - [`adapter`] - Vendor adapters, cache tiers and the CLI
//! - [`application`] - Gateway, coalescing registry, memoizer, TTL policy
//! - [`infrastructure`] - Configuration, logging and component factories
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use quotegate::infrastructure::config::Config;
//! use quotegate::infrastructure::factory::build_gateway;
//!
//! # async fn run() -> quotegate::error::Result<()> {
//! let config = Config::load_or_default("config.toml")?;
//! let gateway = build_gateway(&config)?;
//! let quote = gateway.get_quote("SPY").await?;
//! println!("{:?}", quote.price);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
