//! # In-Memory Session Store
//!
//! [`SessionStore`] backed by a `DashMap`, with a fixed time-to-live per
//! comparison. Expired entries read as absent and are dropped by
//! [`SessionStore::purge_expired`] or the background purge task.

use crate::domain::entities::session::SessionHandle;
use crate::domain::value_objects::enums::ProviderCode;
use crate::domain::value_objects::ids::ComparisonId;
use crate::infrastructure::persistence::traits::{SessionStore, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default lifetime of stored sessions.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct StoredSessions {
    sessions: Vec<SessionHandle>,
    expires_at: Instant,
}

impl StoredSessions {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-memory [`SessionStore`].
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    entries: Arc<DashMap<ComparisonId, StoredSessions>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    /// Creates a store whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Returns the entry lifetime.
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn purge(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, stored| !stored.is_expired(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "purged expired sessions");
        }
        purged
    }

    /// Spawns a task purging expired entries every `every`.
    ///
    /// The task runs until the returned handle is aborted.
    #[must_use]
    pub fn start_purge_task(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.purge();
            }
        })
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn record(&self, id: ComparisonId, sessions: Vec<SessionHandle>) -> StoreResult<()> {
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(
            id,
            StoredSessions {
                sessions,
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(
        &self,
        id: &ComparisonId,
        provider: ProviderCode,
    ) -> StoreResult<Option<SessionHandle>> {
        let Some(stored) = self.entries.get(id) else {
            return Ok(None);
        };
        if stored.is_expired(Instant::now()) {
            return Ok(None);
        }
        Ok(stored
            .sessions
            .iter()
            .find(|s| s.provider == provider)
            .cloned())
    }

    async fn remove(&self, id: &ComparisonId) -> StoreResult<bool> {
        Ok(self.entries.remove(id).is_some())
    }

    async fn purge_expired(&self) -> StoreResult<usize> {
        Ok(self.purge())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.entries.len())
    }
}
