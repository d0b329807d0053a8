//! Cache Worker
//!
//! The single task that owns the entry table. Every operation reaches it as
//! an [`Action`] over a one-slot channel and is executed strictly in the
//! order received, interleaved with periodic cleanup passes, until the
//! cancellation token fires.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{policy, CacheEntry, CacheStats};
use crate::config::CacheConfig;
use crate::token::Token;

/// Smallest period the sweeper accepts; a zero interval would spin.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// == Action ==
/// A request for the worker, carrying the channel its outcome is sent on.
#[derive(Debug)]
pub(crate) enum Action {
    Get {
        raw: String,
        reply: oneshot::Sender<Option<Arc<Token>>>,
    },
    Put {
        token: Arc<Token>,
        reply: oneshot::Sender<usize>,
    },
    Cleanup {
        reply: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
}

// == Worker ==
#[derive(Debug)]
pub(crate) struct Worker {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
    ttl: Duration,
    leeway: Duration,
    max_entries: usize,
    sweep_interval: Duration,
    actions: mpsc::Receiver<Action>,
    cancel: CancellationToken,
}

impl Worker {
    pub(crate) fn new(
        config: &CacheConfig,
        actions: mpsc::Receiver<Action>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl: config.ttl,
            leeway: config.leeway,
            max_entries: config.max_entries,
            sweep_interval: config.sweep_interval.max(MIN_SWEEP_INTERVAL),
            actions,
            cancel,
        }
    }

    // == Run ==
    /// Processes actions, sweeps and cancellation until shut down.
    ///
    /// Cancellation is checked before anything else, then a due sweep, then
    /// the next action. A sweep becomes due at most once per interval, so
    /// it can never starve callers.
    pub(crate) async fn run(mut self) {
        info!(
            "Token cache worker started: ttl={:?}, leeway={:?}, sweep_interval={:?}, max_entries={}",
            self.ttl, self.leeway, self.sweep_interval, self.max_entries
        );

        let mut sweeper = interval_at(Instant::now() + self.sweep_interval, self.sweep_interval);
        sweeper.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Token cache cancellation observed");
                    break;
                }
                _ = sweeper.tick() => {
                    self.cleanup(self.ttl);
                }
                action = self.actions.recv() => match action {
                    Some(action) => self.handle(action),
                    None => {
                        debug!("All token cache handles dropped");
                        break;
                    }
                },
            }
        }

        self.shutdown();
    }

    // == Handle ==
    /// Executes one action. A caller that already gave up is ignored.
    pub(crate) fn handle(&mut self, action: Action) {
        match action {
            Action::Get { raw, reply } => {
                let _ = reply.send(self.get(&raw));
            }
            Action::Put { token, reply } => {
                let _ = reply.send(self.put(token));
            }
            Action::Cleanup { reply } => {
                self.cleanup(self.ttl);
                let _ = reply.send(());
            }
            Action::Stats { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn get(&mut self, raw: &str) -> Option<Arc<Token>> {
        let leeway = self.leeway;

        let Some(entry) = self.entries.get_mut(raw) else {
            self.stats.record_miss();
            return None;
        };

        if !entry.token.is_valid(leeway) {
            self.entries.remove(raw);
            self.stats.record_miss();
            self.stats.record_evictions(1);
            debug!("Evicted invalid token on lookup");
            return None;
        }

        entry.touch(Instant::now());
        let token = Arc::clone(&entry.token);
        self.stats.record_hit();
        Some(token)
    }

    fn put(&mut self, token: Arc<Token>) -> usize {
        if !token.is_valid(self.leeway) {
            debug!("Refusing to cache token outside its validity window");
            if self.entries.remove(token.raw()).is_some() {
                self.stats.record_evictions(1);
            }
            return self.entries.len();
        }

        let key = token.raw().to_string();
        self.entries.insert(key, CacheEntry::new(token, Instant::now()));

        let size = self.entries.len();
        if size > self.max_entries {
            let ttl = policy::effective_ttl(self.ttl, self.max_entries, size);
            debug!(
                "Token cache over capacity ({} > {}), sweeping with ttl={:?}",
                size, self.max_entries, ttl
            );
            self.cleanup(ttl);
        }

        self.entries.len()
    }

    // == Cleanup ==
    /// Runs one cleanup pass with the given idle window.
    fn cleanup(&mut self, ttl: Duration) -> usize {
        let table = mem::take(&mut self.entries);
        let (kept, removed) = policy::sweep(table, Instant::now(), ttl, self.leeway);
        self.entries = kept;

        self.stats.record_sweep();
        self.stats.record_evictions(removed);

        if removed > 0 {
            info!(
                "Token cache cleanup: removed {} entries, {} remaining",
                removed,
                self.entries.len()
            );
        } else {
            debug!("Token cache cleanup: nothing to remove");
        }
        removed
    }

    fn snapshot(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    fn shutdown(&mut self) {
        let dropped = self.entries.len();
        self.entries = HashMap::new();
        info!("Token cache worker stopped, discarded {} entries", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Claims;
    use chrono::Utc;
    use jsonwebtoken::Header;

    fn worker(config: CacheConfig) -> Worker {
        let (_tx, rx) = mpsc::channel(1);
        Worker::new(&config, rx, CancellationToken::new())
    }

    fn token(raw: &str, exp: Option<i64>) -> Arc<Token> {
        let claims = Claims {
            exp,
            ..Claims::default()
        };
        Arc::new(Token::new(raw, Header::default(), claims, false))
    }

    #[test]
    fn test_zero_sweep_interval_is_clamped() {
        let config = CacheConfig {
            sweep_interval: Duration::ZERO,
            ..CacheConfig::default()
        };
        assert_eq!(worker(config).sweep_interval, MIN_SWEEP_INTERVAL);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let mut worker = worker(CacheConfig::default());

        assert_eq!(worker.put(token("a", None)), 1);
        assert_eq!(worker.get("a").unwrap().raw(), "a");
        assert!(worker.get("b").is_none());

        let stats = worker.snapshot();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_put_invalid_token_is_not_stored() {
        let mut worker = worker(CacheConfig::default());
        let expired = token("old", Some(Utc::now().timestamp() - 60));

        assert_eq!(worker.put(expired), 0);
        assert!(worker.get("old").is_none());
    }

    #[tokio::test]
    async fn test_put_over_capacity_runs_cleanup() {
        let config = CacheConfig {
            max_entries: 1,
            ..CacheConfig::default()
        };
        let mut worker = worker(config);

        worker.put(token("a", None));
        worker.put(token("b", None));

        // Fresh entries survive the shrunk window, but the pass still ran
        assert_eq!(worker.snapshot().sweeps, 1);
        assert_eq!(worker.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_clears_table() {
        let mut worker = worker(CacheConfig::default());
        worker.put(token("a", None));

        worker.shutdown();
        assert!(worker.entries.is_empty());
    }

    #[tokio::test]
    async fn test_handle_ignores_abandoned_caller() {
        let mut worker = worker(CacheConfig::default());
        let (reply, response) = oneshot::channel();
        drop(response);

        worker.handle(Action::Put {
            token: token("a", None),
            reply,
        });
        assert_eq!(worker.entries.len(), 1);
    }
}
