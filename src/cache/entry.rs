//! Cache Entry Module
//!
//! Pairs a stored token with the time it was last accessed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::token::Token;

// == Cache Entry ==
/// A single cached token and its access bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored token
    pub token: Arc<Token>,
    /// Last time the entry was stored or returned by a lookup
    pub last_accessed: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry accessed at `now`.
    pub fn new(token: Arc<Token>, now: Instant) -> Self {
        Self {
            token,
            last_accessed: now,
        }
    }

    /// Records an access at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.last_accessed = now;
    }

    // == Is Idle ==
    /// True when the entry has not been accessed for longer than `ttl`.
    ///
    /// An entry idle for exactly `ttl` is kept.
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_accessed) > ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Claims;
    use jsonwebtoken::Header;

    fn entry_at(now: Instant) -> CacheEntry {
        let token = Token::new("raw", Header::default(), Claims::default(), false);
        CacheEntry::new(Arc::new(token), now)
    }

    #[test]
    fn test_fresh_entry_is_not_idle() {
        let now = Instant::now();
        let entry = entry_at(now);

        assert!(!entry.is_idle(now, Duration::from_secs(1)));
    }

    #[test]
    fn test_idle_boundary() {
        let start = Instant::now();
        let entry = entry_at(start);
        let ttl = Duration::from_secs(1);

        assert!(!entry.is_idle(start + ttl, ttl));
        assert!(entry.is_idle(start + ttl + Duration::from_millis(1), ttl));
    }

    #[test]
    fn test_touch_resets_idle_time() {
        let start = Instant::now();
        let mut entry = entry_at(start);
        let ttl = Duration::from_secs(1);

        entry.touch(start + Duration::from_millis(900));
        assert!(!entry.is_idle(start + Duration::from_millis(1500), ttl));
    }

    #[test]
    fn test_zero_ttl_evicts_anything_older_than_now() {
        let start = Instant::now();
        let entry = entry_at(start);

        assert!(!entry.is_idle(start, Duration::ZERO));
        assert!(entry.is_idle(start + Duration::from_millis(1), Duration::ZERO));
    }
}
