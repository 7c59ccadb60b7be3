//! Engine wiring and long-lived task drivers.
//!
//! Concurrency model: one ingestion task per venue feed writes into the
//! shared [`MarketStateStore`], a periodic tick drives scans, and each
//! accepted execution runs as its own task. The store is the only shared
//! mutable structure; everything else is read-mostly after construction.
//!
//! Shutdown is cooperative through a `watch` channel: ingestion finishes
//! the message in hand and exits, and the scan loop stops between ticks,
//! never mid-tick.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{Config, MatcherConfig};
use crate::domain::{ArbOpportunity, ExecutionRecord, Venue};
use crate::error::Result;
use crate::executor::ExecutionCoordinator;
use crate::matcher::MarketMatcher;
use crate::scanner::{OpportunityScanner, ScanStats};
use crate::sink::RecordSink;
use crate::state::MarketStateStore;
use crate::venue::{MarketDataStream, MarketEvent, VenueAdapter};

/// The arbitrage engine: catalog matching, scanning, and execution over
/// two venue adapters.
///
/// This is the surface the CLI/TUI layer consumes; everything else in
/// the crate hangs off the two entry points [`Engine::scan_once`] and
/// [`Engine::execute_opportunity`].
pub struct Engine {
    config: Config,
    venue_a: Arc<dyn VenueAdapter>,
    venue_b: Arc<dyn VenueAdapter>,
    store: Arc<MarketStateStore>,
    scanner: OpportunityScanner,
    coordinator: ExecutionCoordinator,
    sink: Arc<dyn RecordSink>,
}

impl Engine {
    /// Wire an engine from configuration, two venue adapters, and a sink.
    pub fn new(
        config: Config,
        venue_a: Arc<dyn VenueAdapter>,
        venue_b: Arc<dyn VenueAdapter>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        let store = Arc::new(MarketStateStore::new(config.engine.trade_tape_capacity));
        let scanner = OpportunityScanner::new(
            Arc::clone(&store),
            Arc::clone(&venue_a),
            Arc::clone(&venue_b),
            config.trading.clone(),
        );
        let coordinator = ExecutionCoordinator::new(
            Arc::clone(&venue_a),
            Arc::clone(&venue_b),
            config.trading.clone(),
            config.execution.clone(),
        );
        Self {
            config,
            venue_a,
            venue_b,
            store,
            scanner,
            coordinator,
            sink,
        }
    }

    /// The shared state store, for wiring ingestion tasks.
    #[must_use]
    pub fn store(&self) -> Arc<MarketStateStore> {
        Arc::clone(&self.store)
    }

    /// One full scan: refresh both catalogs, match them, and price every
    /// pair against current book state.
    ///
    /// `limit` bounds each catalog fetch and `threshold` overrides the
    /// configured similarity floor. Accepted opportunities are recorded
    /// to the sink and returned ranked best-first.
    ///
    /// # Errors
    ///
    /// Fails only when a venue catalog cannot be fetched at all;
    /// per-pair data problems are contained and counted in the logs.
    pub async fn scan_once(
        &self,
        limit: usize,
        threshold: Decimal,
    ) -> Result<Vec<ArbOpportunity>> {
        let (catalog_a, catalog_b) = tokio::try_join!(
            self.venue_a.list_active_markets(limit),
            self.venue_b.list_active_markets(limit),
        )?;
        debug!(
            venue_a = catalog_a.len(),
            venue_b = catalog_b.len(),
            "fetched catalogs"
        );

        let matcher_config = MatcherConfig {
            similarity_threshold: threshold,
            ..self.config.matcher.clone()
        };
        let pairs = MarketMatcher::new(matcher_config).match_markets(&catalog_a, &catalog_b);

        let (opportunities, stats) = self.scanner.scan_pairs(&pairs).await;
        self.log_scan(pairs.len(), &opportunities, stats);
        self.sink.record_opportunities(&opportunities);
        Ok(opportunities)
    }

    /// Execute one opportunity through the coordinator and record the
    /// attempt. Infallible by design: every failure mode is a terminal
    /// state inside the returned record.
    pub async fn execute_opportunity(&self, opportunity: &ArbOpportunity) -> ExecutionRecord {
        let record = self.coordinator.execute(opportunity).await;
        self.sink.record_execution(&record);
        record
    }

    /// Periodic scan loop. Respects `auto_execute`, spawning one
    /// execution task per acted-on opportunity; stops between ticks when
    /// `shutdown` flips to `true`, never mid-tick.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut tick = interval(Duration::from_secs(self.config.engine.scan_interval_secs));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.config.engine.scan_interval_secs,
            auto_execute = self.config.engine.auto_execute,
            "scan loop started"
        );

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    Self::run_tick(&self).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scan loop stopping");
                        return;
                    }
                }
            }
        }
    }

    async fn run_tick(engine: &Arc<Self>) {
        let limit = engine.config.engine.catalog_limit;
        let threshold = engine.config.matcher.similarity_threshold;
        match engine.scan_once(limit, threshold).await {
            Ok(opportunities) => {
                if engine.config.engine.auto_execute {
                    if let Some(best) = opportunities.first() {
                        let engine = Arc::clone(engine);
                        let best = best.clone();
                        tokio::spawn(async move {
                            let record = engine.execute_opportunity(&best).await;
                            info!(
                                record_id = %record.id(),
                                outcome = ?record.outcome(),
                                "auto-executed top opportunity"
                            );
                        });
                    }
                }
            }
            Err(e) => {
                // A dead venue fails the tick, not the loop.
                warn!(error = %e, "scan tick failed");
            }
        }
    }

    fn log_scan(&self, pairs: usize, opportunities: &[ArbOpportunity], stats: ScanStats) {
        info!(
            pairs,
            accepted = opportunities.len(),
            rejected = stats.routes_rejected,
            missing_data = stats.routes_missing_data,
            fetch_errors = stats.fetch_errors,
            discarded_snapshots = self.store.discarded_snapshots(),
            "scan complete"
        );
        for opportunity in opportunities {
            info!(
                route = %opportunity.route(),
                cost = %opportunity.cost(),
                profit_percent = %opportunity.profit_percent(),
                fill_size = %opportunity.fill_size(),
                breakdown = opportunity.price_breakdown(),
                "opportunity"
            );
        }
    }
}

/// Drive one venue's market data stream into the store until shutdown.
///
/// Graceful stop: the message being processed is finished before the
/// task exits. Reconnection belongs to the stream itself — wrap it in
/// [`ReconnectingStream`](crate::venue::ReconnectingStream) before
/// passing it here.
pub async fn run_ingest<S: MarketDataStream>(
    venue: Venue,
    store: Arc<MarketStateStore>,
    mut stream: S,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(%venue, feed = stream.venue_name(), "ingestion started");
    loop {
        tokio::select! {
            event = stream.next_event() => {
                match event {
                    Some(event) => apply_event(venue, &store, event),
                    None => {
                        warn!(%venue, "feed closed, ingestion stopping");
                        return;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!(%venue, "ingestion stopping");
                    return;
                }
            }
        }
    }
}

fn apply_event(venue: Venue, store: &MarketStateStore, event: MarketEvent) {
    match event {
        MarketEvent::BookSnapshot { token, bids, asks } => {
            store.apply_snapshot(venue, token, bids, asks);
        }
        MarketEvent::Trade(trade) => {
            store.apply_trade(trade);
        }
        MarketEvent::Connected => {
            debug!(%venue, "feed connected");
        }
        MarketEvent::Disconnected { reason } => {
            // Only reachable without the reconnecting wrapper.
            warn!(%venue, %reason, "feed disconnected");
        }
    }
}
