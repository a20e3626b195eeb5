//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`]: the command-line interface driving the gateway.
//! - [`outbound`]: vendor providers and cache tiers.

pub mod inbound;
pub mod outbound;
