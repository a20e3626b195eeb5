//! Application services.
//!
//! - [`gateway`]: cache, coalesce, then primary and fallback providers.
//! - [`coalesce`]: keyed registry of shared in-flight operations.
//! - [`memo`]: memoization of arbitrary keyed computations.
//! - [`policy`]: cache lifetimes per data kind and source.

pub mod coalesce;
pub mod gateway;
pub mod memo;
pub mod policy;

pub use coalesce::Coalescer;
pub use gateway::{GatewayStats, InFlight, MarketDataGateway};
pub use memo::Memoizer;
pub use policy::{KindTtl, Source, TtlPolicy};
