//! # Provider Adapters
//!
//! One adapter per insurer, all behind [`ProviderAdapter`].
//!
//! # Available Adapters
//!
//! - [`AxaAdapter`]: stateless JSON quotation API, supports updates
//! - [`SanlamAdapter`]: pricing API with paced per-formula detail calls
//! - [`McmaAdapter`]: subscription plus bearer token, supports updates
//! - [`RmaAdapter`]: automation workflow behind the shared queue

pub mod axa;
pub mod error;
pub mod http_client;
pub mod mcma;
pub mod rma;
pub mod sanlam;
pub mod traits;

pub use axa::AxaAdapter;
pub use error::{ProviderError, ProviderResult};
pub use http_client::HttpClient;
pub use mcma::McmaAdapter;
pub use rma::RmaAdapter;
pub use sanlam::SanlamAdapter;
pub use traits::{MappedPayload, ProviderAdapter, RawProviderResponse, SessionAdapter};
