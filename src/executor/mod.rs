//! Dual-leg execution coordination.
//!
//! The two legs of an arbitrage are economically coupled but
//! operationally independent — there is no shared escrow, so one leg can
//! fill while the other fails. The coordinator makes that reality
//! explicit: re-validate against fresh depth, dispatch both legs in
//! parallel under one deadline, then walk the attempt into exactly one
//! of four terminal outcomes with any remediation recorded alongside.
//!
//! Protocol per attempt:
//!
//! 1. Fresh depth check; abort stale opportunities before any order.
//! 2. Submit both legs concurrently, each with bounded retry of
//!    retryable venue errors and a venue-side idempotency key.
//! 3. Await both up to the deadline; cancel resting unfilled legs; flag
//!    any one-sided fill as unhedged exposure.
//! 4. Emit one immutable [`ExecutionRecord`], success or not.

mod retry;

pub use retry::{with_retry, RetryPolicy};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{error::Elapsed, timeout};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ExecutionConfig, TradingConfig};
use crate::domain::{
    ArbOpportunity, ExecutionRecord, LegReport, LegStatus, OrderSide, Remediation, Venue,
};
use crate::error::VenueError;
use crate::scanner::evaluate_route;
use crate::venue::{OrderRequest, OrderResult, VenueAdapter};

/// Coordinates one opportunity into two venue orders and an audit record.
pub struct ExecutionCoordinator {
    venue_a: Arc<dyn VenueAdapter>,
    venue_b: Arc<dyn VenueAdapter>,
    trading: TradingConfig,
    config: ExecutionConfig,
    policy: RetryPolicy,
}

impl ExecutionCoordinator {
    /// Create a coordinator over the two venue adapters.
    pub fn new(
        venue_a: Arc<dyn VenueAdapter>,
        venue_b: Arc<dyn VenueAdapter>,
        trading: TradingConfig,
        config: ExecutionConfig,
    ) -> Self {
        let policy = RetryPolicy::from_config(&config);
        Self {
            venue_a,
            venue_b,
            trading,
            config,
            policy,
        }
    }

    /// Execute an opportunity. Always returns a record, never panics or
    /// propagates venue errors: every failure mode is a terminal state.
    pub async fn execute(&self, opportunity: &ArbOpportunity) -> ExecutionRecord {
        let started = Utc::now();
        let attempt_key = Uuid::new_v4();

        let fresh = match self.revalidate(opportunity).await {
            Ok(fresh) => fresh,
            Err(reason) => {
                info!(
                    route = %opportunity.route(),
                    market = %opportunity.pair().a().market_id(),
                    %reason,
                    "aborting stale opportunity before placing orders"
                );
                return ExecutionRecord::new(
                    opportunity.clone(),
                    self.untouched_leg(opportunity, Venue::A),
                    self.untouched_leg(opportunity, Venue::B),
                    Remediation::AbortedStale { reason },
                    started,
                );
            }
        };

        // Size to the thinner of the scan-time and fresh estimates; depth
        // only ever shrinks between the two reads that matter here.
        let size = fresh.fill_size().min(opportunity.fill_size());
        let request_a = self.leg_request(&fresh, Venue::A, size, &attempt_key);
        let request_b = self.leg_request(&fresh, Venue::B, size, &attempt_key);

        let deadline = Duration::from_millis(self.config.deadline_ms);
        let (outcome_a, outcome_b) = tokio::join!(
            timeout(deadline, self.submit(&self.venue_a, &request_a)),
            timeout(deadline, self.submit(&self.venue_b, &request_b)),
        );

        let leg_a = leg_report(Venue::A, &request_a, outcome_a);
        let leg_b = leg_report(Venue::B, &request_b, outcome_b);
        let (leg_a, leg_b, remediation) = self.remediate(leg_a, leg_b).await;

        let record = ExecutionRecord::new(
            opportunity.clone(),
            leg_a,
            leg_b,
            remediation,
            started,
        );
        info!(
            record_id = %record.id(),
            outcome = ?record.outcome(),
            route = %opportunity.route(),
            "execution attempt finished"
        );
        record
    }

    /// Re-price the route at fresh depth straight from the venues.
    ///
    /// The state store is bypassed on purpose: this check exists to catch
    /// movement between scan and act, so it must not read the same data
    /// the scan did.
    async fn revalidate(&self, opportunity: &ArbOpportunity) -> Result<ArbOpportunity, String> {
        let book_a = self
            .venue_a
            .get_order_book(opportunity.leg_token(Venue::A))
            .await
            .map_err(|e| format!("venue-a depth check failed: {e}"))?;
        let book_b = self
            .venue_b
            .get_order_book(opportunity.leg_token(Venue::B))
            .await
            .map_err(|e| format!("venue-b depth check failed: {e}"))?;

        evaluate_route(
            &self.trading,
            opportunity.pair(),
            opportunity.route(),
            &book_a,
            &book_b,
        )
        .ok_or_else(|| "cost or slippage drifted past thresholds".to_string())
    }

    fn leg_request(
        &self,
        fresh: &ArbOpportunity,
        venue: Venue,
        size: crate::domain::Size,
        attempt_key: &Uuid,
    ) -> OrderRequest {
        OrderRequest {
            token: fresh.leg_token(venue).clone(),
            side: OrderSide::Buy,
            size,
            limit_price: fresh.leg_price(venue),
            client_key: Some(format!("{attempt_key}-{venue}")),
        }
    }

    fn untouched_leg(&self, opportunity: &ArbOpportunity, venue: Venue) -> LegReport {
        LegReport::pending(
            venue,
            opportunity.leg_token(venue).clone(),
            OrderSide::Buy,
            opportunity.fill_size(),
            opportunity.leg_price(venue),
        )
    }

    async fn submit(
        &self,
        adapter: &Arc<dyn VenueAdapter>,
        request: &OrderRequest,
    ) -> Result<OrderResult, VenueError> {
        with_retry(&self.policy, adapter.name(), || adapter.place_order(request)).await
    }

    const fn adapter(&self, venue: Venue) -> &Arc<dyn VenueAdapter> {
        match venue {
            Venue::A => &self.venue_a,
            Venue::B => &self.venue_b,
        }
    }

    /// Cancel resting unfilled legs and name any remaining exposure.
    ///
    /// A filled leg cannot be unwound post-fill, so a one-sided fill
    /// always yields a hedge flag, even when the opposite resting order
    /// was cancelled cleanly; the cancel shows up in that leg's status.
    async fn remediate(
        &self,
        leg_a: LegReport,
        leg_b: LegReport,
    ) -> (LegReport, LegReport, Remediation) {
        let mut canceled: Option<(Venue, crate::domain::OrderId)> = None;
        let mut legs = [leg_a, leg_b];

        for leg in &mut legs {
            if leg.status() != LegStatus::Unfilled {
                continue;
            }
            let Some(order_id) = leg.order_id().cloned() else {
                continue;
            };
            match self.adapter(leg.venue()).cancel_order(&order_id).await {
                Ok(true) => {
                    canceled.get_or_insert((leg.venue(), order_id));
                    *leg = leg.clone().canceled();
                }
                Ok(false) => {
                    warn!(
                        venue = %leg.venue(),
                        order_id = %order_id,
                        "cancel raced a fill; order state needs manual review"
                    );
                }
                Err(e) => {
                    warn!(
                        venue = %leg.venue(),
                        order_id = %order_id,
                        error = %e,
                        "failed to cancel resting leg"
                    );
                }
            }
        }

        let [leg_a, leg_b] = legs;
        let remediation = match (leg_a.is_filled(), leg_b.is_filled()) {
            (true, true) => Remediation::None,
            (true, false) => self.hedge_flag(&leg_a),
            (false, true) => self.hedge_flag(&leg_b),
            (false, false) => canceled
                .map(|(venue, order_id)| Remediation::CanceledUnfilled { venue, order_id })
                .unwrap_or(Remediation::None),
        };
        (leg_a, leg_b, remediation)
    }

    fn hedge_flag(&self, filled_leg: &LegReport) -> Remediation {
        warn!(
            venue = %filled_leg.venue(),
            token = %filled_leg.token(),
            size = %filled_leg.filled_size(),
            "one-sided fill: unhedged directional exposure"
        );
        Remediation::FlagForHedge {
            venue: filled_leg.venue(),
            token: filled_leg.token().clone(),
            size: filled_leg.filled_size(),
        }
    }
}

fn leg_report(
    venue: Venue,
    request: &OrderRequest,
    outcome: Result<Result<OrderResult, VenueError>, Elapsed>,
) -> LegReport {
    let pending = LegReport::pending(
        venue,
        request.token.clone(),
        request.side,
        request.size,
        request.limit_price,
    );
    match outcome {
        Ok(Ok(result)) => {
            if result.has_fill() {
                let avg = result.avg_price.unwrap_or(request.limit_price);
                pending.filled(result.order_id, result.filled, avg)
            } else {
                pending.unfilled(result.order_id)
            }
        }
        Ok(Err(e)) => pending.failed(e.to_string()),
        Err(_) => pending.timed_out(),
    }
}
