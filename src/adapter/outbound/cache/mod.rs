//! Cache tier implementations of [`CacheStore`](crate::port::CacheStore).

mod memory;
mod remote;
mod tiered;

pub use memory::MemoryStore;
pub use remote::{RemoteStore, RemoteStoreSettings};
pub use tiered::TieredStore;
