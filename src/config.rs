//! # Configuration
//!
//! [`AppConfig`] is read once at start and never changes afterwards.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults (every field has one)
//! 2. `config/default.toml`, if present
//! 3. `config/local.toml`, if present
//! 4. `QUOTE__`-prefixed environment variables, `__` separating sections,
//!    e.g. `QUOTE__PROVIDERS__SANLAM__ENABLED=false`
//!
//! A `.env` file is loaded into the environment first.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::config::AppConfig;
//!
//! let config = AppConfig::from_toml_str("[aggregation]\nprovider_timeout_ms = 90000").unwrap();
//! assert_eq!(config.aggregation.provider_timeout_ms, 90_000);
//! assert!(config.providers.axa.enabled);
//! ```

use crate::application::normalizers::{MCMA_TAX_RATE, PricingFactors, SEMI_ANNUAL_RATIO};
use crate::application::services::quote_aggregation::{
    AggregationConfig, DEFAULT_PROVIDER_TIMEOUT_MS,
};
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::automation::{QueueConfig, SessionOptions};
use config::{Config, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "QUOTE";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("invalid configuration: {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Comparison settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Per-provider wait budget in milliseconds.
    pub provider_timeout_ms: u64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
        }
    }
}

/// Factors applied where upstreams omit amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Six month premium as a share of the annual one.
    pub semi_annual_ratio: Decimal,
    /// Tax rate on MCMA base prices.
    pub mcma_tax_rate: Decimal,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            semi_annual_ratio: SEMI_ANNUAL_RATIO,
            mcma_tax_rate: MCMA_TAX_RATE,
        }
    }
}

/// Automation sidecar and queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Sidecar base URL.
    pub base_url: String,
    /// HTTP timeout for sidecar calls in milliseconds.
    pub request_timeout_ms: u64,
    /// How long a caller waits for its job in milliseconds.
    pub job_timeout_ms: u64,
    /// How long shutdown waits for the worker in milliseconds.
    pub shutdown_wait_ms: u64,
    /// Run the browser without a window.
    pub headless: bool,
    /// Randomize input timing.
    pub humanize: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3100".to_string(),
            request_timeout_ms: 130_000,
            job_timeout_ms: 120_000,
            shutdown_wait_ms: 5_000,
            headless: true,
            humanize: true,
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Time-to-live of recorded handles in seconds.
    pub ttl_secs: u64,
    /// Interval of the purge task in seconds.
    pub purge_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            purge_interval_secs: 60,
        }
    }
}

/// Settings of an HTTP provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Take part in comparisons.
    pub enabled: bool,
    /// Endpoint root; the adapter's production URL when unset.
    pub base_url: Option<String>,
    /// HTTP timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            timeout_ms: 30_000,
        }
    }
}

/// Sanlam settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SanlamSettings {
    /// Take part in comparisons.
    pub enabled: bool,
    /// Endpoint root; the adapter's production URL when unset.
    pub base_url: Option<String>,
    /// HTTP timeout in milliseconds.
    pub timeout_ms: u64,
    /// Minimum spacing of formula detail calls in milliseconds; 0 disables it.
    pub formula_pace_ms: u64,
    /// Broker agent key sent with every request.
    pub agent_key: String,
}

impl Default for SanlamSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            timeout_ms: 60_000,
            formula_pace_ms: 1_000,
            agent_key: crate::application::mapping::DEFAULT_SANLAM_AGENT_KEY.to_string(),
        }
    }
}

/// RMA settings. RMA runs on the automation sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RmaSettings {
    /// Take part in comparisons.
    pub enabled: bool,
}

impl Default for RmaSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Per-provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvidersSettings {
    /// AXA.
    pub axa: ProviderSettings,
    /// Sanlam.
    pub sanlam: SanlamSettings,
    /// MAMDA-MCMA.
    pub mcma: ProviderSettings,
    /// RMA.
    pub rma: RmaSettings,
}

impl ProvidersSettings {
    /// Returns the enabled flag of `provider`.
    #[must_use]
    pub fn is_enabled(&self, provider: ProviderCode) -> bool {
        match provider {
            ProviderCode::Axa => self.axa.enabled,
            ProviderCode::Sanlam => self.sanlam.enabled,
            ProviderCode::Mcma => self.mcma.enabled,
            ProviderCode::Rma => self.rma.enabled,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log output.
    pub logging: LoggingSettings,
    /// Comparisons.
    pub aggregation: AggregationSettings,
    /// Pricing factors.
    pub pricing: PricingSettings,
    /// Automation sidecar and queue.
    pub automation: AutomationSettings,
    /// Session store.
    pub sessions: SessionSettings,
    /// Providers.
    pub providers: ProvidersSettings,
}

impl AppConfig {
    /// Loads `.env`, then the files under `config/` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("config"))
    }

    /// Loads `default.toml` and `local.toml` from `dir`, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value is out of range.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join("local.toml")).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document over the defaults. Mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is out of range.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("aggregation.provider_timeout_ms", self.aggregation.provider_timeout_ms),
            ("automation.request_timeout_ms", self.automation.request_timeout_ms),
            ("automation.job_timeout_ms", self.automation.job_timeout_ms),
            ("sessions.ttl_secs", self.sessions.ttl_secs),
            ("sessions.purge_interval_secs", self.sessions.purge_interval_secs),
            ("providers.axa.timeout_ms", self.providers.axa.timeout_ms),
            ("providers.sanlam.timeout_ms", self.providers.sanlam.timeout_ms),
            ("providers.mcma.timeout_ms", self.providers.mcma.timeout_ms),
        ];
        if let Some(&(field, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::invalid(field, "must be greater than zero"));
        }

        let ratio = self.pricing.semi_annual_ratio;
        if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
            return Err(ConfigError::invalid(
                "pricing.semi_annual_ratio",
                format!("{} is outside (0, 1]", ratio),
            ));
        }
        let rate = self.pricing.mcma_tax_rate;
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(ConfigError::invalid(
                "pricing.mcma_tax_rate",
                format!("{} is outside [0, 1)", rate),
            ));
        }
        if self.automation.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("automation.base_url", "must not be empty"));
        }
        Ok(())
    }

    /// Sets the per-provider wait budget.
    #[must_use]
    pub fn with_provider_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.aggregation.provider_timeout_ms = timeout_ms;
        self
    }

    /// Sets the automation sidecar URL.
    #[must_use]
    pub fn with_automation_url(mut self, url: impl Into<String>) -> Self {
        self.automation.base_url = url.into();
        self
    }

    /// Sets the base URL of an HTTP provider. Ignored for RMA.
    #[must_use]
    pub fn with_provider_url(mut self, provider: ProviderCode, url: impl Into<String>) -> Self {
        let url = Some(url.into());
        match provider {
            ProviderCode::Axa => self.providers.axa.base_url = url,
            ProviderCode::Sanlam => self.providers.sanlam.base_url = url,
            ProviderCode::Mcma => self.providers.mcma.base_url = url,
            ProviderCode::Rma => {}
        }
        self
    }

    /// Enables or disables a provider.
    #[must_use]
    pub fn with_provider_enabled(mut self, provider: ProviderCode, enabled: bool) -> Self {
        match provider {
            ProviderCode::Axa => self.providers.axa.enabled = enabled,
            ProviderCode::Sanlam => self.providers.sanlam.enabled = enabled,
            ProviderCode::Mcma => self.providers.mcma.enabled = enabled,
            ProviderCode::Rma => self.providers.rma.enabled = enabled,
        }
        self
    }

    /// Sets the Sanlam formula pacing.
    #[must_use]
    pub fn with_sanlam_pace_ms(mut self, pace_ms: u64) -> Self {
        self.providers.sanlam.formula_pace_ms = pace_ms;
        self
    }

    /// Pricing factors for the normalizers.
    #[must_use]
    pub fn pricing_factors(&self) -> PricingFactors {
        PricingFactors::default()
            .with_semi_annual_ratio(self.pricing.semi_annual_ratio)
            .with_mcma_tax_rate(self.pricing.mcma_tax_rate)
    }

    /// Engine configuration.
    #[must_use]
    pub fn aggregation_config(&self) -> AggregationConfig {
        AggregationConfig::with_provider_timeout(self.aggregation.provider_timeout_ms)
    }

    /// Automation queue configuration.
    #[must_use]
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::default()
            .with_job_timeout(Duration::from_millis(self.automation.job_timeout_ms))
            .with_shutdown_wait(Duration::from_millis(self.automation.shutdown_wait_ms))
    }

    /// Sidecar session options.
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.automation.headless,
            humanize: self.automation.humanize,
        }
    }

    /// Session handle time-to-live.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.sessions.ttl_secs)
    }
}
