//! Order book types.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::money::{Price, Size};

/// A single price level in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    price: Price,
    size: Size,
}

impl PriceLevel {
    /// Create a new price level.
    #[must_use]
    pub const fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }

    /// Get the price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Get the size available at this price.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }
}

/// Order book for one outcome token.
///
/// Bids are sorted descending and asks ascending by price, strictly
/// monotonic within a side (no duplicate levels). An empty book is a
/// valid, cleared book; "never seen a snapshot" is represented by the
/// state store returning `None`, not by this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl OrderBook {
    /// Create an empty order book.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    /// Create a book from pre-sorted levels without validation.
    ///
    /// Callers are responsible for the side-ordering invariant; feeds of
    /// unknown quality should go through [`OrderBook::try_new`].
    #[must_use]
    pub const fn with_levels(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }

    /// Create a book, validating prices, sizes, and side ordering.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if any level price is outside `[0, 1]`, any
    /// size is non-positive, or a side is not strictly sorted
    /// (descending bids, ascending asks).
    pub fn try_new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Result<Self, DomainError> {
        validate_side(&bids, "bid", |prev, next| next < prev)?;
        validate_side(&asks, "ask", |prev, next| next > prev)?;
        Ok(Self { bids, asks })
    }

    /// All bid levels, best first.
    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// All ask levels, best first.
    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Best bid (highest buy price), if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Best ask (lowest sell price), if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Total size resting on the ask side.
    #[must_use]
    pub fn total_ask_size(&self) -> Size {
        self.asks.iter().map(PriceLevel::size).sum()
    }

    /// Total size resting on the bid side.
    #[must_use]
    pub fn total_bid_size(&self) -> Size {
        self.bids.iter().map(PriceLevel::size).sum()
    }

    /// True when neither side has any level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn validate_side(
    levels: &[PriceLevel],
    side: &'static str,
    in_order: impl Fn(Price, Price) -> bool,
) -> Result<(), DomainError> {
    use rust_decimal::Decimal;

    for level in levels {
        if level.price() < Decimal::ZERO || level.price() > Decimal::ONE {
            return Err(DomainError::PriceOutOfRange {
                price: level.price(),
            });
        }
        if level.size() <= Decimal::ZERO {
            return Err(DomainError::NonPositiveLevelSize { size: level.size() });
        }
    }
    for pair in levels.windows(2) {
        if !in_order(pair[0].price(), pair[1].price()) {
            return Err(DomainError::UnsortedSide {
                side,
                price: pair[1].price(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: Price, size: Size) -> PriceLevel {
        PriceLevel::new(price, size)
    }

    #[test]
    fn best_levels_are_first_elements() {
        let book = OrderBook::with_levels(
            vec![level(dec!(0.45), dec!(10)), level(dec!(0.44), dec!(5))],
            vec![level(dec!(0.50), dec!(10)), level(dec!(0.52), dec!(5))],
        );
        assert_eq!(book.best_bid().unwrap().price(), dec!(0.45));
        assert_eq!(book.best_ask().unwrap().price(), dec!(0.50));
    }

    #[test]
    fn empty_book_has_no_best_levels() {
        let book = OrderBook::new();
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn try_new_accepts_sorted_sides() {
        let book = OrderBook::try_new(
            vec![level(dec!(0.45), dec!(10)), level(dec!(0.40), dec!(5))],
            vec![level(dec!(0.50), dec!(10)), level(dec!(0.60), dec!(5))],
        );
        assert!(book.is_ok());
    }

    #[test]
    fn try_new_rejects_unsorted_bids() {
        let err = OrderBook::try_new(
            vec![level(dec!(0.40), dec!(10)), level(dec!(0.45), dec!(5))],
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::UnsortedSide {
                side: "bid",
                price: dec!(0.45)
            }
        );
    }

    #[test]
    fn try_new_rejects_duplicate_ask_price() {
        let err = OrderBook::try_new(
            vec![],
            vec![level(dec!(0.50), dec!(10)), level(dec!(0.50), dec!(5))],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::UnsortedSide { side: "ask", .. }));
    }

    #[test]
    fn try_new_rejects_price_out_of_range() {
        let err = OrderBook::try_new(vec![], vec![level(dec!(1.05), dec!(10))]).unwrap_err();
        assert_eq!(
            err,
            DomainError::PriceOutOfRange { price: dec!(1.05) }
        );
    }

    #[test]
    fn try_new_rejects_zero_size_level() {
        let err = OrderBook::try_new(vec![level(dec!(0.40), dec!(0))], vec![]).unwrap_err();
        assert_eq!(err, DomainError::NonPositiveLevelSize { size: dec!(0) });
    }

    #[test]
    fn side_totals_sum_levels() {
        let book = OrderBook::with_levels(
            vec![level(dec!(0.45), dec!(10))],
            vec![level(dec!(0.50), dec!(10)), level(dec!(0.52), dec!(7))],
        );
        assert_eq!(book.total_ask_size(), dec!(17));
        assert_eq!(book.total_bid_size(), dec!(10));
    }
}
