//! Cache Module
//!
//! A single-owner token cache: one worker task owns the entry table and
//! applies validity, idle-time and load-adaptive eviction.

mod entry;
pub mod policy;
mod stats;
mod store;
mod worker;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TokenCache;
