//! # Application Services
//!
//! - [`QuoteAggregationEngine`]: concurrent comparison across providers
//! - [`QuoteUpdateService`]: repricing through provider sessions

pub mod quote_aggregation;
pub mod quote_update;

pub use quote_aggregation::{AggregationConfig, DEFAULT_PROVIDER_TIMEOUT_MS, QuoteAggregationEngine};
pub use quote_update::QuoteUpdateService;
