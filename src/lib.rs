//! Crossarb - cross-venue arbitrage engine for two-sided prediction markets.
//!
//! The engine continuously tracks order-book state on two independent
//! venues, pairs semantically equivalent markets across their catalogs,
//! detects mispricings where complementary outcome tokens together cost
//! less than the $1 payout, and coordinates best-effort dual-leg
//! execution with explicit handling of one-sided fills.
//!
//! # Architecture
//!
//! Data flows venue adapters → state store → scanner → coordinator:
//!
//! - [`venue`] - Ports implemented by per-venue adapter crates (catalog,
//!   books, orders, streaming), plus reconnect-with-backoff wrapping
//! - [`state`] - Shared book store with per-key synchronization and a
//!   bounded recent-trade tape
//! - [`matcher`] - Jaccard title matching with manual overrides
//! - [`pricing`] - Depth-walk fill simulation and slippage math
//! - [`scanner`] - Route evaluation, filtering, and ranking
//! - [`executor`] - Dual-leg coordination: re-validation, shared
//!   deadline, bounded retry, remediation
//! - [`engine`] - Task wiring and the two public entry points
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment overrides
//! - [`domain`] - Venue-agnostic value types
//! - [`error`] - Error taxonomy, including the retryable/fatal venue
//!   error split
//! - [`sink`] - Append-only audit record sinks
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use crossarb::config::Config;
//! use crossarb::engine::Engine;
//! use crossarb::sink::JsonlSink;
//! # async fn run(venue_a: Arc<dyn crossarb::venue::VenueAdapter>,
//! #              venue_b: Arc<dyn crossarb::venue::VenueAdapter>)
//! #              -> crossarb::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let sink = Arc::new(JsonlSink::new("data")?);
//! let engine = Engine::new(config, venue_a, venue_b, sink);
//!
//! let opportunities = engine.scan_once(50, rust_decimal_macros::dec!(0.6)).await?;
//! if let Some(best) = opportunities.first() {
//!     let record = engine.execute_opportunity(best).await;
//!     println!("{:?}", record.outcome());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod pricing;
pub mod scanner;
pub mod sink;
pub mod state;
pub mod venue;

#[cfg(feature = "testkit")]
pub mod testkit;
