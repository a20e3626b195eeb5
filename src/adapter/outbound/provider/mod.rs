//! Market data vendor adapters implementing
//! [`MarketDataProvider`](crate::port::MarketDataProvider).

pub mod http;
pub mod polygon;
pub mod yahoo;

pub use polygon::{Polygon, PolygonSettings};
pub use yahoo::{Yahoo, YahooSettings};
