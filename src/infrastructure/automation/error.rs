//! # Queue Errors
//!
//! Errors returned to callers of the automation queue.

use crate::infrastructure::automation::traits::ResourceError;
use crate::infrastructure::providers::error::ProviderError;
use thiserror::Error;

/// Error type for automation queue operations.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The resource could not be created.
    #[error("failed to create automation resource: {0}")]
    Creation(#[from] ResourceError),

    /// The resource crashed during the job.
    #[error("automation resource error: {0}")]
    Resource(String),

    /// The workflow failed without harming the resource.
    #[error("{0}")]
    Workflow(String),

    /// The caller's wait budget elapsed before the job completed.
    #[error("automation job not completed within {timeout_ms}ms")]
    Timeout {
        /// Wait budget in milliseconds.
        timeout_ms: u64,
    },

    /// The worker stopped before answering.
    #[error("automation worker stopped before completing the job")]
    WorkerStopped,

    /// No async runtime is available to host the worker.
    #[error("automation queue unavailable: {0}")]
    Unavailable(String),
}

impl QueueError {
    /// Returns true if the caller stopped waiting.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<QueueError> for ProviderError {
    fn from(error: QueueError) -> Self {
        match error {
            QueueError::Creation(error) => ProviderError::resource(error.to_string()),
            QueueError::Resource(message) => ProviderError::resource(message),
            QueueError::Workflow(message) => ProviderError::rejected(message),
            QueueError::Timeout { timeout_ms } => ProviderError::queue_timeout(timeout_ms),
            QueueError::WorkerStopped => {
                ProviderError::resource("automation worker stopped before completing the job")
            }
            QueueError::Unavailable(message) => ProviderError::internal(message),
        }
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
