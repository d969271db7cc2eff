//! # Automation Resource Ports
//!
//! The scarce, session-bound resource the queue serializes access to, and the
//! factory that creates it on demand.
//!
//! A resource handles one logical transaction at a time. The queue guarantees
//! that [`AutomationResource::run`] is never entered concurrently.
//!
//! # Examples
//!
//! ```ignore
//! use motor_quote_aggregator::infrastructure::automation::traits::{
//!     AutomationResource, ResourceError, ResourceFactory, WorkflowError,
//! };
//!
//! struct Browser { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl AutomationResource for Browser {
//!     async fn run(&mut self, workflow: &str, params: &serde_json::Value)
//!         -> Result<serde_json::Value, WorkflowError> { /* ... */ }
//!     async fn close(&mut self) { /* ... */ }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Failure of a workflow run.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// A step failed but the resource is still usable.
    #[error("workflow step '{step}' failed: {message}")]
    Step {
        /// Step that failed.
        step: String,
        /// Failure description.
        message: String,
    },

    /// The resource is no longer usable and must be discarded.
    #[error("automation resource crashed: {message}")]
    Crashed {
        /// Failure description.
        message: String,
    },
}

impl WorkflowError {
    /// Creates a recoverable step failure.
    #[must_use]
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Creates an unrecoverable failure.
    #[must_use]
    pub fn crashed(message: impl Into<String>) -> Self {
        Self::Crashed {
            message: message.into(),
        }
    }

    /// Returns true if the resource must be discarded.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Crashed { .. })
    }
}

/// Failure to create an automation resource.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The driver could not be reached.
    #[error("automation driver unreachable: {message}")]
    Unreachable {
        /// Failure description.
        message: String,
    },

    /// The driver answered but did not open a resource.
    #[error("automation driver refused the resource: {message}")]
    Refused {
        /// Failure description.
        message: String,
    },
}

impl ResourceError {
    /// Creates an unreachable-driver failure.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Creates a refusal.
    #[must_use]
    pub fn refused(message: impl Into<String>) -> Self {
        Self::Refused {
            message: message.into(),
        }
    }
}

/// A live automation resource.
#[async_trait]
pub trait AutomationResource: Send + fmt::Debug {
    /// Runs the named workflow with `params` and returns its output.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Step` if the workflow failed and the resource may be reused
    /// - `WorkflowError::Crashed` if the resource must be discarded
    async fn run(&mut self, workflow: &str, params: &Value) -> Result<Value, WorkflowError>;

    /// Releases the resource. Failures are logged, never returned.
    async fn close(&mut self);
}

/// Creates automation resources.
#[async_trait]
pub trait ResourceFactory: Send + Sync + fmt::Debug {
    /// Creates a fresh resource.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if the resource cannot be created.
    async fn create(&self) -> Result<Box<dyn AutomationResource>, ResourceError>;
}
