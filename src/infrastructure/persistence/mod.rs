//! # Persistence Layer
//!
//! Transient storage for data that must outlive a single comparison.
//!
//! ## Store Traits (Ports)
//!
//! - [`SessionStore`]: session handles keyed by comparison id
//!
//! ## Implementations
//!
//! - `in_memory`: `DashMap` store with TTL

pub mod in_memory;
pub mod traits;

pub use in_memory::InMemorySessionStore;
pub use traits::{SessionStore, StoreError, StoreResult};
