//! # In-Memory Stores
//!
//! ## Available Stores
//!
//! - [`InMemorySessionStore`]: session handles with a time-to-live
//!
//! ## Thread Safety
//!
//! Entries live in a shared `DashMap`; clones of a store see the same data.

pub mod session_store;

pub use session_store::{DEFAULT_SESSION_TTL, InMemorySessionStore};
