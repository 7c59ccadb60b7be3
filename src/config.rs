//! Configuration loading and validation.
//!
//! Settings are read from a TOML file with every section optional; the
//! defaults reproduce the production values the engine has been run with.
//! A `.env` file is loaded first so operators can override the log level
//! (and downstream adapters their credentials) without touching the file.
//!
//! # Example
//!
//! ```no_run
//! use crossarb::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

/// Engine loop cadence and scope.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Seconds between scan ticks.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    /// Maximum markets fetched per venue catalog refresh.
    #[serde(default = "default_catalog_limit")]
    pub catalog_limit: usize,

    /// Execute the top-ranked opportunity of each tick automatically.
    #[serde(default)]
    pub auto_execute: bool,

    /// Trades retained per condition in the recent-trade tape.
    #[serde(default = "default_trade_tape_capacity")]
    pub trade_tape_capacity: usize,
}

fn default_scan_interval_secs() -> u64 {
    60
}

fn default_catalog_limit() -> usize {
    50
}

fn default_trade_tape_capacity() -> usize {
    200
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            catalog_limit: default_catalog_limit(),
            auto_execute: false,
            trade_tape_capacity: default_trade_tape_capacity(),
        }
    }
}

/// Sizing and profitability thresholds for the scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Target size quoted against each leg's depth.
    #[serde(default = "default_quote_size")]
    pub default_quote_size: Decimal,

    /// Hard cap on any single trade's size.
    #[serde(default = "default_max_trade_size")]
    pub max_trade_size: Decimal,

    /// Legs that cannot fill at least this size are rejected.
    #[serde(default = "default_min_trade_size")]
    pub min_trade_size: Decimal,

    /// Maximum tolerated slippage from best price, in basis points.
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: u32,

    /// Minimum riskless profit percentage to accept a route.
    #[serde(default = "default_min_profit_percent")]
    pub min_profit_percent: Decimal,
}

fn default_quote_size() -> Decimal {
    dec!(10)
}

fn default_max_trade_size() -> Decimal {
    dec!(50)
}

fn default_min_trade_size() -> Decimal {
    dec!(5)
}

fn default_max_slippage_bps() -> u32 {
    150
}

fn default_min_profit_percent() -> Decimal {
    dec!(1.0)
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            default_quote_size: default_quote_size(),
            max_trade_size: default_max_trade_size(),
            min_trade_size: default_min_trade_size(),
            max_slippage_bps: default_max_slippage_bps(),
            min_profit_percent: default_min_profit_percent(),
        }
    }
}

impl TradingConfig {
    /// The per-leg simulation target: quote size bounded by the cap.
    #[must_use]
    pub fn target_size(&self) -> Decimal {
        self.default_quote_size.min(self.max_trade_size)
    }
}

/// Cross-venue market matching parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    /// Minimum Jaccard title similarity to pair two markets.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: Decimal,

    /// Maximum end-date gap (days) when both venues expose one. Zero
    /// disables the gate.
    #[serde(default = "default_max_expiry_gap_days")]
    pub max_expiry_gap_days: i64,

    /// Manual pairings by venue-native market ID (venue A -> venue B).
    /// Overrides bypass similarity scoring entirely.
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_similarity_threshold() -> Decimal {
    dec!(0.6)
}

fn default_max_expiry_gap_days() -> i64 {
    1
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_expiry_gap_days: default_max_expiry_gap_days(),
            overrides: HashMap::new(),
        }
    }
}

/// Execution deadline and retry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Shared deadline for both legs, in milliseconds.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Attempts per leg for retryable venue errors (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay between attempts, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Backoff cap, in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_deadline_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

fn default_retry_max_delay_ms() -> u64 {
    2_000
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

/// Streaming reconnect backoff.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// First reconnect delay, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Multiplier applied to the delay after each failure.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Delay cap, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub trading: TradingConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file, after sourcing `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read, fails to
    /// parse, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let raw = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&raw)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on parse or validation failure.
    pub fn parse_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as `ConfigError::InvalidValue`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trading.default_quote_size <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "trading.default_quote_size",
                reason: "must be positive".into(),
            });
        }
        if self.trading.min_trade_size > self.trading.max_trade_size {
            return Err(ConfigError::InvalidValue {
                field: "trading.min_trade_size",
                reason: format!(
                    "exceeds max_trade_size ({} > {})",
                    self.trading.min_trade_size, self.trading.max_trade_size
                ),
            });
        }
        if self.matcher.similarity_threshold < Decimal::ZERO
            || self.matcher.similarity_threshold > Decimal::ONE
        {
            return Err(ConfigError::InvalidValue {
                field: "matcher.similarity_threshold",
                reason: "must lie in [0, 1]".into(),
            });
        }
        if self.execution.deadline_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "execution.deadline_ms",
                reason: "must be positive".into(),
            });
        }
        if self.execution.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "execution.max_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if self.stream.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.backoff_multiplier",
                reason: "must be at least 1.0".into(),
            });
        }
        Ok(())
    }
}
