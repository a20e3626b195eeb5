//! Configuration loading and validation.
//!
//! [`Config`] aggregates every section of `config.toml`. Secrets come only
//! from the environment.

pub mod cache;
pub mod logging;
pub mod providers;
pub mod settings;
pub mod ttl;

pub use cache::{CacheConfig, CacheDriver, RemoteCacheConfig};
pub use logging::LoggingConfig;
pub use providers::ProvidersConfig;
pub use settings::{Config, GatewayConfig};
pub use ttl::TtlConfig;
