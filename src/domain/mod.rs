//! Vendor-agnostic market data types.
//!
//! Every provider translates its wire format into these types; nothing
//! vendor-specific crosses this boundary.

mod key;
mod option;
mod quote;
mod symbol;

pub use key::{CacheKey, DataKind};
pub use option::{OptionLeg, OptionSide, OptionsChain};
pub use quote::Quote;
pub use symbol::Symbol;
