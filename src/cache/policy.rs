//! Eviction Policy
//!
//! Validity, idle-time and load-adaptive eviction. Everything here is a pure
//! function of its inputs so it can be driven without a running worker.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Effective TTL ==
/// Idle window to use for one cleanup pass given the current load.
///
/// At or below capacity the configured `ttl` is returned unchanged. Past
/// capacity it shrinks proportionally: `ttl * max_entries / size`.
pub fn effective_ttl(ttl: Duration, max_entries: usize, size: usize) -> Duration {
    if size <= max_entries {
        return ttl;
    }

    let scaled = ttl.as_nanos() * max_entries as u128 / size as u128;
    // scaled < ttl here, so it always fits back into a Duration
    Duration::from_nanos(u64::try_from(scaled).unwrap_or(u64::MAX))
}

// == Sweep ==
/// Rebuilds the table keeping only entries that are both valid and not idle.
///
/// The source table is consumed rather than mutated while iterating.
/// Returns the replacement table and how many entries were dropped.
pub fn sweep(
    entries: HashMap<String, CacheEntry>,
    now: Instant,
    ttl: Duration,
    leeway: Duration,
) -> (HashMap<String, CacheEntry>, usize) {
    let before = entries.len();

    let kept: HashMap<String, CacheEntry> = entries
        .into_iter()
        .filter(|(_, entry)| !entry.is_idle(now, ttl) && entry.token.is_valid(leeway))
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Claims, Token};
    use chrono::Utc;
    use jsonwebtoken::Header;
    use std::sync::Arc;

    fn entry(raw: &str, exp: Option<i64>, accessed: Instant) -> (String, CacheEntry) {
        let claims = Claims {
            exp,
            ..Claims::default()
        };
        let token = Token::new(raw, Header::default(), claims, false);
        (raw.to_string(), CacheEntry::new(Arc::new(token), accessed))
    }

    #[test]
    fn test_effective_ttl_under_capacity() {
        let ttl = Duration::from_secs(10);
        assert_eq!(effective_ttl(ttl, 5, 0), ttl);
        assert_eq!(effective_ttl(ttl, 5, 5), ttl);
    }

    #[test]
    fn test_effective_ttl_shrinks_proportionally() {
        let ttl = Duration::from_secs(10);
        assert_eq!(effective_ttl(ttl, 5, 10), Duration::from_secs(5));
        assert_eq!(effective_ttl(ttl, 5, 20), Duration::from_millis(2500));
        assert_eq!(effective_ttl(ttl, 1, 3), Duration::from_nanos(3_333_333_333));
    }

    #[test]
    fn test_effective_ttl_zero_capacity() {
        assert_eq!(effective_ttl(Duration::from_secs(10), 0, 1), Duration::ZERO);
    }

    #[test]
    fn test_sweep_drops_idle_entries() {
        let now = Instant::now();
        let ttl = Duration::from_secs(1);
        let table: HashMap<_, _> = [
            entry("fresh", None, now),
            entry("stale", None, now - Duration::from_secs(2)),
        ]
        .into_iter()
        .collect();

        let (kept, removed) = sweep(table, now, ttl, Duration::ZERO);

        assert_eq!(removed, 1);
        assert!(kept.contains_key("fresh"));
        assert!(!kept.contains_key("stale"));
    }

    #[test]
    fn test_sweep_drops_invalid_entries() {
        let now = Instant::now();
        let past = Utc::now().timestamp() - 60;
        let table: HashMap<_, _> = [
            entry("valid", None, now),
            entry("expired", Some(past), now),
        ]
        .into_iter()
        .collect();

        let (kept, removed) = sweep(table, now, Duration::from_secs(60), Duration::ZERO);

        assert_eq!(removed, 1);
        assert!(kept.contains_key("valid"));
    }

    #[test]
    fn test_sweep_leeway_keeps_recently_expired() {
        let now = Instant::now();
        let recent = Utc::now().timestamp() - 5;
        let table: HashMap<_, _> = [entry("recent", Some(recent), now)].into_iter().collect();

        let (kept, removed) = sweep(table, now, Duration::from_secs(60), Duration::from_secs(30));

        assert_eq!(removed, 0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_sweep_empty_table() {
        let (kept, removed) = sweep(HashMap::new(), Instant::now(), Duration::ZERO, Duration::ZERO);
        assert!(kept.is_empty());
        assert_eq!(removed, 0);
    }
}
