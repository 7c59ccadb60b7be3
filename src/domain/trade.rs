//! Trade tape entries and order sides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ConditionId, TokenId, Venue};
use super::money::{Price, Size};

/// Side of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// One fill observed on a venue's public tape.
///
/// Append-only monitoring data; the engine never mutates or re-orders
/// these. Timestamps are Unix seconds as delivered by the feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    venue: Venue,
    condition: ConditionId,
    token: TokenId,
    side: OrderSide,
    size: Size,
    price: Price,
    notional: Size,
    timestamp_secs: i64,
}

impl TradeEvent {
    /// Create a trade event; `notional` is derived as `size * price`.
    pub fn new(
        venue: Venue,
        condition: ConditionId,
        token: TokenId,
        side: OrderSide,
        size: Size,
        price: Price,
        timestamp_secs: i64,
    ) -> Self {
        Self {
            venue,
            condition,
            token,
            side,
            size,
            price,
            notional: size * price,
            timestamp_secs,
        }
    }

    /// The venue the fill happened on.
    #[must_use]
    pub const fn venue(&self) -> Venue {
        self.venue
    }

    /// Condition grouping this fill with its market's other outcome.
    #[must_use]
    pub const fn condition(&self) -> &ConditionId {
        &self.condition
    }

    /// The traded outcome token.
    #[must_use]
    pub const fn token(&self) -> &TokenId {
        &self.token
    }

    /// Taker side of the fill.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Fill size in shares.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Fill price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Notional value (`size * price`).
    #[must_use]
    pub const fn notional(&self) -> Size {
        self.notional
    }

    /// Unix timestamp in seconds.
    #[must_use]
    pub const fn timestamp_secs(&self) -> i64 {
        self.timestamp_secs
    }

    /// The fill time as UTC, when the timestamp is representable.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp_secs, 0)
    }
}
