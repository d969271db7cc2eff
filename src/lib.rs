//! # Motor Quote Aggregator
//!
//! Compares motor insurance quotes across several upstream insurers.
//!
//! One canonical request is mapped to each provider's payload, the providers
//! are queried concurrently, and every answer is normalized into canonical
//! plans with annual and semi-annual pricing. Providers without a usable API
//! are driven through a single automation resource whose jobs are serialized
//! by the [`AutomationQueue`](infrastructure::automation::AutomationQueue).
//! Providers that support it issue a session handle that lets a later call
//! reprice one plan with different options.
//!
//! # Architecture
//!
//! - [`domain`]: requests, plans, sessions, catalogs and money arithmetic
//! - [`application`]: field mapping, normalization, comparison and updates
//! - [`infrastructure`]: provider adapters, automation queue, session store
//! - [`config`], [`telemetry`], [`bootstrap`]: configuration, logging and
//!   runtime assembly
//!
//! # Example
//!
//! ```no_run
//! use motor_quote_aggregator::bootstrap::EngineRuntime;
//! use motor_quote_aggregator::domain::entities::CanonicalQuoteRequest;
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = EngineRuntime::load()?;
//! let request = CanonicalQuoteRequest::new(Decimal::from(200_000), Decimal::from(150_000));
//! let result = runtime.compare(&request, None).await?;
//! println!("{} plans", result.summary.total_plans);
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

pub use application::{ApplicationError, ApplicationResult};
pub use bootstrap::EngineRuntime;
pub use config::AppConfig;
