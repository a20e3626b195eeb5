//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                 ┌───────────────────────────┐
//!                 │        Application        │
//!                 │ gateway · coalesce · memo │
//!                 └─────────────┬─────────────┘
//!                 ┌─────────────┴─────────────┐
//!                 ▼                           ▼
//!        ┌──────────────────┐       ┌──────────────────┐
//!        │MarketDataProvider│       │    CacheStore    │
//!        │ polygon · yahoo  │       │ memory · remote  │
//!        └──────────────────┘       └──────────────────┘
//! ```

pub mod outbound;

pub use outbound::cache::{get_typed, set_typed, CacheStore};
pub use outbound::provider::MarketDataProvider;
