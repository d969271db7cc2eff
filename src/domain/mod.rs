//! # Domain Layer
//!
//! Provider-neutral model of a motor insurance comparison.
//!
//! - [`entities`]: Requests, plans, sessions and results
//! - [`value_objects`]: Identifiers, enums and money arithmetic
//! - [`catalog`]: Static pack definitions used for quote updates
//! - [`errors`]: Business rule violations

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod value_objects;
