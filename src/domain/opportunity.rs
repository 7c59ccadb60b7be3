//! Arbitrage routes and opportunity snapshots.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{TokenId, Venue};
use super::market::{MatchedMarket, Outcome};
use super::money::{Price, Size};

/// A complementary-outcome pairing across the two venues.
///
/// Buying NO on one venue and YES on the other pays out $1 whichever way
/// the event resolves, so the route is riskless when the combined cost is
/// below $1 (fees excluded, see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArbRoute {
    /// Buy NO on venue A and YES on venue B.
    ANoBYes,
    /// Buy YES on venue A and NO on venue B.
    AYesBNo,
}

impl ArbRoute {
    /// Both routes, in evaluation order.
    pub const ALL: [Self; 2] = [Self::ANoBYes, Self::AYesBNo];

    /// The outcome bought on the given venue.
    #[must_use]
    pub const fn outcome(self, venue: Venue) -> Outcome {
        match (self, venue) {
            (Self::ANoBYes, Venue::A) | (Self::AYesBNo, Venue::B) => Outcome::No,
            (Self::ANoBYes, Venue::B) | (Self::AYesBNo, Venue::A) => Outcome::Yes,
        }
    }

    /// Short leg label like `A_NO`, used in price breakdowns.
    #[must_use]
    pub const fn leg_label(self, venue: Venue) -> &'static str {
        match (self, venue) {
            (Self::ANoBYes, Venue::A) => "A_NO",
            (Self::ANoBYes, Venue::B) => "B_YES",
            (Self::AYesBNo, Venue::A) => "A_YES",
            (Self::AYesBNo, Venue::B) => "B_NO",
        }
    }
}

impl fmt::Display for ArbRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ANoBYes => write!(f, "A_NO+B_YES"),
            Self::AYesBNo => write!(f, "A_YES+B_NO"),
        }
    }
}

/// A priced arbitrage candidate.
///
/// Valid only for the instant the underlying books were read: it is a
/// decision snapshot, not a reservation of liquidity. The execution
/// coordinator re-validates against fresh depth before acting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbOpportunity {
    pair: MatchedMarket,
    route: ArbRoute,
    cost: Price,
    profit_percent: Decimal,
    fill_size: Size,
    leg_a_price: Price,
    leg_b_price: Price,
    price_breakdown: String,
}

impl ArbOpportunity {
    /// Build an opportunity from the two simulated leg prices.
    ///
    /// Derived fields follow the riskless-payout identity:
    /// `cost = leg_a + leg_b` and `profit_percent = (1 - cost) * 100`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonPositiveFillSize` when `fill_size <= 0`.
    pub fn try_new(
        pair: MatchedMarket,
        route: ArbRoute,
        leg_a_price: Price,
        leg_b_price: Price,
        fill_size: Size,
    ) -> Result<Self, DomainError> {
        if fill_size <= Decimal::ZERO {
            return Err(DomainError::NonPositiveFillSize { size: fill_size });
        }
        let cost = leg_a_price + leg_b_price;
        let profit_percent = (Decimal::ONE - cost) * Decimal::ONE_HUNDRED;
        let price_breakdown = format!(
            "{} {:.4} | {} {:.4}",
            route.leg_label(Venue::A),
            leg_a_price,
            route.leg_label(Venue::B),
            leg_b_price,
        );
        Ok(Self {
            pair,
            route,
            cost,
            profit_percent,
            fill_size,
            leg_a_price,
            leg_b_price,
            price_breakdown,
        })
    }

    /// The matched pair this opportunity was priced against.
    #[must_use]
    pub const fn pair(&self) -> &MatchedMarket {
        &self.pair
    }

    /// The complementary-outcome route.
    #[must_use]
    pub const fn route(&self) -> ArbRoute {
        self.route
    }

    /// Combined average cost of both legs.
    #[must_use]
    pub const fn cost(&self) -> Price {
        self.cost
    }

    /// Riskless profit as a percentage of notional.
    #[must_use]
    pub const fn profit_percent(&self) -> Decimal {
        self.profit_percent
    }

    /// Executable size, bounded by the thinner leg.
    #[must_use]
    pub const fn fill_size(&self) -> Size {
        self.fill_size
    }

    /// Simulated average price of the given venue's leg.
    #[must_use]
    pub const fn leg_price(&self, venue: Venue) -> Price {
        match venue {
            Venue::A => self.leg_a_price,
            Venue::B => self.leg_b_price,
        }
    }

    /// The token bought on the given venue for this route.
    #[must_use]
    pub fn leg_token(&self, venue: Venue) -> &TokenId {
        self.pair.market(venue).token(self.route.outcome(venue))
    }

    /// Human-readable leg price summary.
    #[must_use]
    pub fn price_breakdown(&self) -> &str {
        &self.price_breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::MarketId;
    use crate::domain::market::Market;
    use rust_decimal_macros::dec;

    fn pair() -> MatchedMarket {
        let a = Market::new(
            Venue::A,
            MarketId::from("a1"),
            "Will it rain tomorrow?",
            TokenId::from("a1-yes"),
            TokenId::from("a1-no"),
        );
        let b = Market::new(
            Venue::B,
            MarketId::from("b1"),
            "Will it rain tomorrow?",
            TokenId::from("b1-yes"),
            TokenId::from("b1-no"),
        );
        MatchedMarket::try_new(a, b, dec!(1)).unwrap()
    }

    #[test]
    fn route_outcomes_are_complementary() {
        for route in ArbRoute::ALL {
            assert_eq!(
                route.outcome(Venue::A).complement(),
                route.outcome(Venue::B)
            );
        }
    }

    #[test]
    fn route_display() {
        assert_eq!(ArbRoute::ANoBYes.to_string(), "A_NO+B_YES");
        assert_eq!(ArbRoute::AYesBNo.to_string(), "A_YES+B_NO");
    }

    #[test]
    fn derived_fields_follow_payout_identity() {
        let opp =
            ArbOpportunity::try_new(pair(), ArbRoute::ANoBYes, dec!(0.55), dec!(0.40), dec!(10))
                .unwrap();
        assert_eq!(opp.cost(), dec!(0.95));
        assert_eq!(opp.profit_percent(), dec!(5.00));
        assert_eq!(opp.fill_size(), dec!(10));
        assert_eq!(opp.price_breakdown(), "A_NO 0.5500 | B_YES 0.4000");
    }

    #[test]
    fn leg_token_resolves_route_outcome() {
        let opp =
            ArbOpportunity::try_new(pair(), ArbRoute::ANoBYes, dec!(0.55), dec!(0.40), dec!(10))
                .unwrap();
        assert_eq!(opp.leg_token(Venue::A).as_str(), "a1-no");
        assert_eq!(opp.leg_token(Venue::B).as_str(), "b1-yes");

        let opp =
            ArbOpportunity::try_new(pair(), ArbRoute::AYesBNo, dec!(0.40), dec!(0.55), dec!(10))
                .unwrap();
        assert_eq!(opp.leg_token(Venue::A).as_str(), "a1-yes");
        assert_eq!(opp.leg_token(Venue::B).as_str(), "b1-no");
    }

    #[test]
    fn rejects_non_positive_fill_size() {
        let err = ArbOpportunity::try_new(pair(), ArbRoute::ANoBYes, dec!(0.5), dec!(0.4), dec!(0))
            .unwrap_err();
        assert_eq!(err, DomainError::NonPositiveFillSize { size: dec!(0) });
    }

    #[test]
    fn negative_edge_is_representable() {
        // The scanner filters these out; the type itself stays permissive
        // so the executor can compare stale and fresh costs.
        let opp =
            ArbOpportunity::try_new(pair(), ArbRoute::AYesBNo, dec!(0.60), dec!(0.52), dec!(5))
                .unwrap();
        assert_eq!(opp.cost(), dec!(1.12));
        assert_eq!(opp.profit_percent(), dec!(-12.00));
    }
}
