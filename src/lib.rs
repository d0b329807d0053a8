//! Token Cache - A concurrent, time-bounded cache for bearer tokens
//!
//! Keeps decoded and verified tokens so repeated requests skip signature
//! checks and JSON decoding. A single worker task owns the table and evicts
//! entries that became invalid, sat idle, or overflowed capacity.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod token;

pub use api::AppState;
pub use cache::TokenCache;
pub use config::{CacheConfig, Config};
pub use error::{CacheError, TokenError};
