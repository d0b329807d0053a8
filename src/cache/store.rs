//! Token Cache Handle
//!
//! The public face of the cache. Each call is turned into an [`Action`],
//! handed to the worker and awaited under the dispatch timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::worker::{Action, Worker};
use crate::cache::CacheStats;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::token::{self, Token, VerificationKey};

// == Token Cache ==
/// Cheaply cloneable handle to a running token cache.
///
/// Once the cancellation token fires, every call becomes a no-op that
/// returns an empty result without error.
#[derive(Debug, Clone)]
pub struct TokenCache {
    actions: mpsc::Sender<Action>,
    leeway: Duration,
    dispatch_timeout: Duration,
}

impl TokenCache {
    // == Start ==
    /// Spawns the worker and returns a handle to it.
    ///
    /// The returned `JoinHandle` completes once the worker has observed
    /// `cancel` (or every handle has been dropped) and cleared its table.
    pub fn start(config: CacheConfig, cancel: CancellationToken) -> (Self, JoinHandle<()>) {
        let (actions, receiver) = mpsc::channel(1);
        let worker = Worker::new(&config, receiver, cancel);
        let handle = tokio::spawn(worker.run());

        let cache = Self {
            actions,
            leeway: config.leeway,
            dispatch_timeout: config.dispatch_timeout,
        };
        (cache, handle)
    }

    // == Dispatch ==
    /// Submits an action and waits for its outcome.
    ///
    /// `Ok(None)` means the worker is gone: the action was refused or dropped
    /// unprocessed. Only running out of time is an error.
    async fn dispatch<T>(
        &self,
        operation: &'static str,
        action: impl FnOnce(oneshot::Sender<T>) -> Action,
    ) -> Result<Option<T>> {
        let (reply, response) = oneshot::channel();
        let action = action(reply);

        let exchange = async {
            if self.actions.send(action).await.is_err() {
                return None;
            }
            response.await.ok()
        };

        match tokio::time::timeout(self.dispatch_timeout, exchange).await {
            Ok(outcome) => Ok(outcome),
            Err(_) => {
                warn!(
                    "Token cache {} not acknowledged within {:?}",
                    operation, self.dispatch_timeout
                );
                Err(CacheError::DispatchTimeout {
                    operation,
                    timeout: self.dispatch_timeout,
                })
            }
        }
    }

    // == Get ==
    /// Looks up a token by its raw form.
    ///
    /// An entry that is no longer valid is removed and reported as absent.
    /// A valid hit refreshes the entry's idle window; idle entries are only
    /// dropped by cleanup passes.
    pub async fn get(&self, raw: &str) -> Result<Option<Arc<Token>>> {
        let raw = raw.to_string();
        let outcome = self
            .dispatch("get", |reply| Action::Get { raw, reply })
            .await?;
        Ok(outcome.flatten())
    }

    // == Put ==
    /// Stores a token if it is currently valid and returns the table size.
    ///
    /// An invalid token is silently skipped. Going over `max_entries`
    /// triggers a cleanup pass with a proportionally shrunk ttl before the
    /// size is reported.
    pub async fn put(&self, token: impl Into<Arc<Token>>) -> Result<usize> {
        let token = token.into();
        let outcome = self
            .dispatch("put", |reply| Action::Put { token, reply })
            .await?;
        Ok(outcome.unwrap_or(0))
    }

    // == Cleanup ==
    /// Forces a cleanup pass with the configured ttl.
    pub async fn cleanup(&self) -> Result<()> {
        self.dispatch("cleanup", |reply| Action::Cleanup { reply })
            .await?;
        Ok(())
    }

    // == Stats ==
    /// Snapshot of the worker's counters; zeroed after shutdown.
    pub async fn stats(&self) -> Result<CacheStats> {
        let outcome = self
            .dispatch("stats", |reply| Action::Stats { reply })
            .await?;
        Ok(outcome.unwrap_or_default())
    }

    /// Current number of cached tokens.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.stats().await?.total_entries)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    // == Request Decode ==
    /// Resolves the request's bearer token, decoding it on a cache miss.
    ///
    /// The signature is not checked.
    pub async fn request_decode(&self, headers: &HeaderMap) -> Result<Arc<Token>> {
        let raw = token::extract_bearer_token(headers)?;

        if let Some(cached) = self.get(raw).await? {
            return Ok(cached);
        }

        let decoded = Arc::new(token::decode(raw)?);
        self.put(Arc::clone(&decoded)).await?;
        Ok(decoded)
    }

    // == Request Verify ==
    /// Resolves the request's bearer token, verifying it on a cache miss.
    ///
    /// A cached token that was only decoded is verified again and replaces
    /// the cached copy. A cache instance is expected to serve a single key.
    pub async fn request_verify(
        &self,
        headers: &HeaderMap,
        key: &VerificationKey,
    ) -> Result<Arc<Token>> {
        let raw = token::extract_bearer_token(headers)?;

        if let Some(cached) = self.get(raw).await? {
            if cached.is_verified() {
                return Ok(cached);
            }
            debug!("Cached token was never verified, verifying now");
        }

        let verified = Arc::new(token::verify(raw, key, self.leeway)?);
        self.put(Arc::clone(&verified)).await?;
        Ok(verified)
    }
}
