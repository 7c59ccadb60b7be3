//! Execution records for dual-leg attempts.
//!
//! There is no shared transaction boundary between the two venues, so the
//! outcome of an attempt is an explicit four-state terminal enum rather
//! than a success flag: partial fills are a distinct business state that
//! callers must handle, never an exception path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::{OrderId, TokenId, Venue};
use super::money::{Price, Size};
use super::opportunity::ArbOpportunity;
use super::trade::OrderSide;

/// Where a single leg ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegStatus {
    /// Created but never submitted (e.g. stale abort).
    Pending,
    /// Venue acknowledged the order and reported a fill.
    Filled,
    /// Venue acknowledged the order but nothing filled.
    Unfilled,
    /// Resting order was cancelled before any fill.
    Canceled,
    /// Submission failed with a venue error.
    Failed,
    /// No acknowledgement inside the execution deadline.
    TimedOut,
}

/// Audit trail for one leg of an execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegReport {
    venue: Venue,
    token: TokenId,
    side: OrderSide,
    requested_size: Size,
    limit_price: Price,
    status: LegStatus,
    order_id: Option<OrderId>,
    filled_size: Size,
    avg_price: Option<Price>,
    error: Option<String>,
}

impl LegReport {
    /// A leg that has not been submitted yet.
    pub fn pending(
        venue: Venue,
        token: TokenId,
        side: OrderSide,
        requested_size: Size,
        limit_price: Price,
    ) -> Self {
        Self {
            venue,
            token,
            side,
            requested_size,
            limit_price,
            status: LegStatus::Pending,
            order_id: None,
            filled_size: Size::ZERO,
            avg_price: None,
            error: None,
        }
    }

    /// Mark the leg filled.
    #[must_use]
    pub fn filled(mut self, order_id: OrderId, filled_size: Size, avg_price: Price) -> Self {
        self.status = LegStatus::Filled;
        self.order_id = Some(order_id);
        self.filled_size = filled_size;
        self.avg_price = Some(avg_price);
        self
    }

    /// Mark the leg acknowledged but unfilled.
    #[must_use]
    pub fn unfilled(mut self, order_id: OrderId) -> Self {
        self.status = LegStatus::Unfilled;
        self.order_id = Some(order_id);
        self
    }

    /// Mark a resting leg cancelled before any fill.
    #[must_use]
    pub fn canceled(mut self) -> Self {
        self.status = LegStatus::Canceled;
        self
    }

    /// Mark the leg failed with a venue error.
    #[must_use]
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = LegStatus::Failed;
        self.error = Some(error.into());
        self
    }

    /// Mark the leg timed out at the execution deadline.
    #[must_use]
    pub fn timed_out(mut self) -> Self {
        self.status = LegStatus::TimedOut;
        self.error = Some("deadline exceeded".into());
        self
    }

    /// The venue this leg targets.
    #[must_use]
    pub const fn venue(&self) -> Venue {
        self.venue
    }

    /// The token this leg trades.
    #[must_use]
    pub const fn token(&self) -> &TokenId {
        &self.token
    }

    /// Order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Requested size.
    #[must_use]
    pub const fn requested_size(&self) -> Size {
        self.requested_size
    }

    /// Limit price submitted with the order.
    #[must_use]
    pub const fn limit_price(&self) -> Price {
        self.limit_price
    }

    /// Terminal status of the leg.
    #[must_use]
    pub const fn status(&self) -> LegStatus {
        self.status
    }

    /// Venue-assigned order ID, if the order was acknowledged.
    #[must_use]
    pub const fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    /// Filled size (zero unless status is `Filled`).
    #[must_use]
    pub const fn filled_size(&self) -> Size {
        self.filled_size
    }

    /// Average fill price, when filled.
    #[must_use]
    pub const fn avg_price(&self) -> Option<Price> {
        self.avg_price
    }

    /// Error text, when the leg failed or timed out.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when the leg holds a position.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == LegStatus::Filled && self.filled_size > Size::ZERO
    }
}

/// Terminal outcome of a dual-leg execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Both legs filled; the riskless position is established.
    BothFilled,
    /// Only the venue-A leg filled; directional exposure exists.
    PartialAOnly,
    /// Only the venue-B leg filled; directional exposure exists.
    PartialBOnly,
    /// Neither leg filled; no exposure created.
    BothFailed,
}

impl ExecutionOutcome {
    /// Classify from the two legs' fill states.
    #[must_use]
    pub const fn classify(a_filled: bool, b_filled: bool) -> Self {
        match (a_filled, b_filled) {
            (true, true) => Self::BothFilled,
            (true, false) => Self::PartialAOnly,
            (false, true) => Self::PartialBOnly,
            (false, false) => Self::BothFailed,
        }
    }

    /// True when the attempt left an unhedged directional position.
    #[must_use]
    pub const fn creates_exposure(&self) -> bool {
        matches!(self, Self::PartialAOnly | Self::PartialBOnly)
    }
}

/// Remediation applied (or required) after an execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Remediation {
    /// Nothing to remediate.
    None,
    /// A resting, unfilled leg was cancelled before it could fill.
    CanceledUnfilled { venue: Venue, order_id: OrderId },
    /// A filled leg cannot be unwound; the position needs a hedge.
    ///
    /// This is the policy hook for unhedged exposure — consumers decide
    /// whether hedging is manual or automated, but the record always
    /// names the position explicitly.
    FlagForHedge {
        venue: Venue,
        token: TokenId,
        size: Size,
    },
    /// Fresh depth no longer met the thresholds; no order was placed.
    AbortedStale { reason: String },
}

/// Immutable audit record of one execution attempt.
///
/// Created once per attempt and never mutated afterwards; ownership stays
/// with the execution coordinator, consumers get clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    id: Uuid,
    opportunity: ArbOpportunity,
    leg_a: LegReport,
    leg_b: LegReport,
    outcome: ExecutionOutcome,
    remediation: Remediation,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Finalize a record; the outcome is derived from the legs so it can
    /// never disagree with them.
    pub fn new(
        opportunity: ArbOpportunity,
        leg_a: LegReport,
        leg_b: LegReport,
        remediation: Remediation,
        started_at: DateTime<Utc>,
    ) -> Self {
        let outcome = ExecutionOutcome::classify(leg_a.is_filled(), leg_b.is_filled());
        Self {
            id: Uuid::new_v4(),
            opportunity,
            leg_a,
            leg_b,
            outcome,
            remediation,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Unique record ID.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The opportunity this attempt acted on.
    #[must_use]
    pub const fn opportunity(&self) -> &ArbOpportunity {
        &self.opportunity
    }

    /// The venue-A leg.
    #[must_use]
    pub const fn leg_a(&self) -> &LegReport {
        &self.leg_a
    }

    /// The venue-B leg.
    #[must_use]
    pub const fn leg_b(&self) -> &LegReport {
        &self.leg_b
    }

    /// The leg for the given venue.
    #[must_use]
    pub const fn leg(&self, venue: Venue) -> &LegReport {
        match venue {
            Venue::A => &self.leg_a,
            Venue::B => &self.leg_b,
        }
    }

    /// Terminal outcome.
    #[must_use]
    pub const fn outcome(&self) -> ExecutionOutcome {
        self.outcome
    }

    /// Remediation taken or required.
    #[must_use]
    pub const fn remediation(&self) -> &Remediation {
        &self.remediation
    }

    /// When the attempt started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the record was finalized.
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}
