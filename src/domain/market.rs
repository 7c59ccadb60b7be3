//! Markets and cross-venue matched pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ConditionId, MarketId, TokenId, Venue};
use super::money::Size;
use rust_decimal::Decimal;

/// Binary market outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// The complementary outcome.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Upper-case label used in route breakdowns.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

/// A binary market as listed by one venue's catalog.
///
/// Immutable per catalog refresh; identity is `(venue, market_id)`. Both
/// outcome tokens are required because every arbitrage route needs to
/// price one of them — catalog entries missing a token are dropped by the
/// venue adapter before they reach the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    venue: Venue,
    market_id: MarketId,
    title: String,
    condition: Option<ConditionId>,
    yes_token: TokenId,
    no_token: TokenId,
    end_date: Option<DateTime<Utc>>,
    volume: Option<Size>,
    liquidity: Option<Size>,
}

impl Market {
    /// Create a market with the required catalog fields.
    pub fn new(
        venue: Venue,
        market_id: MarketId,
        title: impl Into<String>,
        yes_token: TokenId,
        no_token: TokenId,
    ) -> Self {
        Self {
            venue,
            market_id,
            title: title.into(),
            condition: None,
            yes_token,
            no_token,
            end_date: None,
            volume: None,
            liquidity: None,
        }
    }

    /// Attach the venue's condition reference.
    #[must_use]
    pub fn with_condition(mut self, condition: ConditionId) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Attach the market's end date.
    #[must_use]
    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Attach reported volume.
    #[must_use]
    pub fn with_volume(mut self, volume: Size) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Attach reported liquidity.
    #[must_use]
    pub fn with_liquidity(mut self, liquidity: Size) -> Self {
        self.liquidity = Some(liquidity);
        self
    }

    /// The venue this market is listed on.
    #[must_use]
    pub const fn venue(&self) -> Venue {
        self.venue
    }

    /// The venue-native market ID.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// The market title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The condition reference, if the venue exposes one.
    #[must_use]
    pub const fn condition(&self) -> Option<&ConditionId> {
        self.condition.as_ref()
    }

    /// The token traded for the given outcome.
    #[must_use]
    pub const fn token(&self, outcome: Outcome) -> &TokenId {
        match outcome {
            Outcome::Yes => &self.yes_token,
            Outcome::No => &self.no_token,
        }
    }

    /// The YES outcome token.
    #[must_use]
    pub const fn yes_token(&self) -> &TokenId {
        &self.yes_token
    }

    /// The NO outcome token.
    #[must_use]
    pub const fn no_token(&self) -> &TokenId {
        &self.no_token
    }

    /// End date, if the venue exposes one.
    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Reported volume, if any.
    #[must_use]
    pub const fn volume(&self) -> Option<Size> {
        self.volume
    }

    /// Reported liquidity, if any.
    #[must_use]
    pub const fn liquidity(&self) -> Option<Size> {
        self.liquidity
    }
}

/// A cross-venue pair of semantically equivalent markets.
///
/// Produced by the matcher for one scan cycle; not persisted. Similarity
/// is in `[0, 1]`, with `1` meaning identical normalized titles or a
/// manual override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedMarket {
    a: Market,
    b: Market,
    similarity: Decimal,
}

impl MatchedMarket {
    /// Pair two markets.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MismatchedPairVenues` unless `a` is listed
    /// on venue A and `b` on venue B.
    pub fn try_new(a: Market, b: Market, similarity: Decimal) -> Result<Self, DomainError> {
        if a.venue() != Venue::A || b.venue() != Venue::B {
            return Err(DomainError::MismatchedPairVenues);
        }
        Ok(Self { a, b, similarity })
    }

    /// The venue-A market.
    #[must_use]
    pub const fn a(&self) -> &Market {
        &self.a
    }

    /// The venue-B market.
    #[must_use]
    pub const fn b(&self) -> &Market {
        &self.b
    }

    /// The market listed on the given venue.
    #[must_use]
    pub const fn market(&self, venue: Venue) -> &Market {
        match venue {
            Venue::A => &self.a,
            Venue::B => &self.b,
        }
    }

    /// Title similarity score in `[0, 1]`.
    #[must_use]
    pub const fn similarity(&self) -> Decimal {
        self.similarity
    }
}
