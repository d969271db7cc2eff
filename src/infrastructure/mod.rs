//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - [`providers`]: HTTP and automation adapters per insurer
//! - [`automation`]: serialized queue around the automation resource
//! - [`persistence`]: session continuity store

pub mod automation;
pub mod persistence;
pub mod providers;
