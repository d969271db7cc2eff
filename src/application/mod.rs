//! # Application Layer
//!
//! Use cases over the domain and infrastructure layers.
//!
//! - [`mapping`]: canonical request to provider payloads
//! - [`normalizers`]: raw provider responses to canonical plans
//! - [`registry`]: adapters by provider
//! - [`services`]: comparison and quote update

pub mod error;
pub mod mapping;
pub mod normalizers;
pub mod registry;
pub mod services;

pub use error::{ApplicationError, ApplicationResult, PipelineError};
pub use registry::{ProviderRegistry, ProviderRegistryBuilder};
pub use services::{AggregationConfig, QuoteAggregationEngine, QuoteUpdateService};
