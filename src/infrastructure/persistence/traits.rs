//! # Store Traits
//!
//! Port definitions for keeping session continuity data between a comparison
//! and the updates that follow it.
//!
//! # Examples
//!
//! ```ignore
//! use motor_quote_aggregator::infrastructure::persistence::traits::SessionStore;
//!
//! async fn resume(store: &impl SessionStore, id: ComparisonId) {
//!     let handle = store.get(&id, ProviderCode::Mcma).await.unwrap();
//!     println!("resumable: {}", handle.is_some());
//! }
//! ```

use crate::domain::entities::session::SessionHandle;
use crate::domain::value_objects::enums::ProviderCode;
use crate::domain::value_objects::ids::ComparisonId;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Internal error.
    #[error("store internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Transient store of session handles keyed by comparison.
///
/// Entries expire after a time-to-live; an expired entry behaves as absent.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Records the handles issued during a comparison, replacing any earlier
    /// entry for the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn record(&self, id: ComparisonId, sessions: Vec<SessionHandle>) -> StoreResult<()>;

    /// Returns the live handle `provider` issued during comparison `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn get(&self, id: &ComparisonId, provider: ProviderCode)
    -> StoreResult<Option<SessionHandle>>;

    /// Removes every handle of a comparison. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn remove(&self, id: &ComparisonId) -> StoreResult<bool>;

    /// Drops expired entries. Returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn purge_expired(&self) -> StoreResult<usize>;

    /// Number of comparisons currently held, expired ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn count(&self) -> StoreResult<usize>;
}
