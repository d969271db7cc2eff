//! # Automation
//!
//! Serialized access to the single automation resource used by providers
//! that can only be driven through a scripted session.
//!
//! - [`AutomationQueue`]: FIFO worker owning the resource
//! - [`AutomationResource`] / [`ResourceFactory`]: ports the queue drives
//! - [`RemoteDriverFactory`]: HTTP sidecar implementation

pub mod error;
pub mod queue;
pub mod remote_driver;
pub mod traits;

pub use error::{QueueError, QueueResult};
pub use queue::{AutomationQueue, JobHandle, QueueConfig, QueueState, QueueStats};
pub use remote_driver::{RemoteDriverFactory, RemoteSession, SessionOptions};
pub use traits::{AutomationResource, ResourceError, ResourceFactory, WorkflowError};
