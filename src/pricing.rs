//! Depth-aware pricing.
//!
//! Top-of-book quotes lie about executable prices as soon as size is
//! involved, so the scanner prices every leg by walking the book. A
//! partial fill is a first-class result here, not an error: the caller
//! checks [`Fill::filled`] against its own minimum.

use rust_decimal::Decimal;

use crate::domain::money::BPS_SCALE;
use crate::domain::{OrderBook, OrderSide, Price, PriceLevel, Size};

/// Result of simulating a fill against book depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    filled: Size,
    notional: Decimal,
}

impl Fill {
    /// Size actually obtainable; may be less than the requested target.
    #[must_use]
    pub const fn filled(&self) -> Size {
        self.filled
    }

    /// Cost of the filled size (`sum of size * price` over consumed levels).
    #[must_use]
    pub const fn notional(&self) -> Decimal {
        self.notional
    }

    /// Size-weighted average price, or `None` when nothing filled.
    #[must_use]
    pub fn average_price(&self) -> Option<Price> {
        (self.filled > Decimal::ZERO).then(|| self.notional / self.filled)
    }
}

/// Best executable price for the given side: top ask for buys, top bid
/// for sells. `None` on an empty side.
#[must_use]
pub fn best_price(book: &OrderBook, side: OrderSide) -> Option<Price> {
    let level = match side {
        OrderSide::Buy => book.best_ask(),
        OrderSide::Sell => book.best_bid(),
    };
    level.map(PriceLevel::price)
}

/// Walk the book in priority order, consuming size until `target` is
/// reached or depth runs out. Does not mutate the book.
///
/// The caller must pass a positive `target`; a non-positive target is a
/// contract violation, not a runtime condition to recover from.
#[must_use]
pub fn simulate_fill(book: &OrderBook, side: OrderSide, target: Size) -> Fill {
    debug_assert!(target > Decimal::ZERO, "fill target must be positive");
    walk(levels(book, side), target, None)
}

/// Like [`simulate_fill`], but refuses levels priced beyond the slippage
/// cap relative to the best level.
///
/// This is the variant the scanner uses: when depth at acceptable prices
/// runs out, the fill stops there instead of blending in levels that
/// would breach the cap. A thin best level followed by a far jump prices
/// as `filled = thin size, avg = best` rather than an unexecutable
/// average.
#[must_use]
pub fn simulate_fill_capped(
    book: &OrderBook,
    side: OrderSide,
    target: Size,
    max_slippage_bps: u32,
) -> Fill {
    debug_assert!(target > Decimal::ZERO, "fill target must be positive");
    let side_levels = levels(book, side);
    let Some(best) = side_levels.first().map(PriceLevel::price) else {
        return Fill {
            filled: Decimal::ZERO,
            notional: Decimal::ZERO,
        };
    };
    let tolerance = best * Decimal::from(max_slippage_bps) / BPS_SCALE;
    let bound = match side {
        OrderSide::Buy => best + tolerance,
        OrderSide::Sell => best - tolerance,
    };
    walk(side_levels, target, Some((side, bound)))
}

/// Slippage of an achieved average fill price from the quoted entry
/// price, in basis points. Positive means worse for a buyer. `None` when
/// the entry price is zero (slippage is undefined there, and a zero
/// quote is never executable anyway).
#[must_use]
pub fn slippage_bps(entry_price: Price, avg_price: Price) -> Option<Decimal> {
    if entry_price.is_zero() {
        return None;
    }
    Some((avg_price - entry_price) / entry_price * BPS_SCALE)
}

fn levels(book: &OrderBook, side: OrderSide) -> &[PriceLevel] {
    match side {
        OrderSide::Buy => book.asks(),
        OrderSide::Sell => book.bids(),
    }
}

fn walk(levels: &[PriceLevel], target: Size, bound: Option<(OrderSide, Price)>) -> Fill {
    let mut remaining = target;
    let mut filled = Decimal::ZERO;
    let mut notional = Decimal::ZERO;

    for level in levels {
        if let Some((side, bound)) = bound {
            let beyond = match side {
                OrderSide::Buy => level.price() > bound,
                OrderSide::Sell => level.price() < bound,
            };
            if beyond {
                break;
            }
        }
        let take = level.size().min(remaining);
        notional += take * level.price();
        filled += take;
        remaining -= take;
        if remaining <= Decimal::ZERO {
            break;
        }
    }

    Fill { filled, notional }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: Price, size: Size) -> PriceLevel {
        PriceLevel::new(price, size)
    }

    fn asks(levels: Vec<PriceLevel>) -> OrderBook {
        OrderBook::with_levels(vec![], levels)
    }

    #[test]
    fn best_price_by_side() {
        let book = OrderBook::with_levels(
            vec![level(dec!(0.45), dec!(10))],
            vec![level(dec!(0.50), dec!(10))],
        );
        assert_eq!(best_price(&book, OrderSide::Buy), Some(dec!(0.50)));
        assert_eq!(best_price(&book, OrderSide::Sell), Some(dec!(0.45)));
        assert_eq!(best_price(&OrderBook::new(), OrderSide::Buy), None);
    }

    #[test]
    fn full_fill_within_top_level() {
        let book = asks(vec![level(dec!(0.40), dec!(100))]);
        let fill = simulate_fill(&book, OrderSide::Buy, dec!(10));
        assert_eq!(fill.filled(), dec!(10));
        assert_eq!(fill.average_price(), Some(dec!(0.40)));
        assert_eq!(fill.notional(), dec!(4.00));
    }

    #[test]
    fn fill_walks_multiple_levels_with_weighted_average() {
        let book = asks(vec![
            level(dec!(0.40), dec!(5)),
            level(dec!(0.44), dec!(5)),
        ]);
        let fill = simulate_fill(&book, OrderSide::Buy, dec!(10));
        assert_eq!(fill.filled(), dec!(10));
        // (5 * 0.40 + 5 * 0.44) / 10
        assert_eq!(fill.average_price(), Some(dec!(0.42)));
    }

    #[test]
    fn average_stays_within_consumed_price_range() {
        let book = asks(vec![
            level(dec!(0.40), dec!(3)),
            level(dec!(0.45), dec!(3)),
            level(dec!(0.50), dec!(3)),
        ]);
        let fill = simulate_fill(&book, OrderSide::Buy, dec!(9));
        let avg = fill.average_price().unwrap();
        assert!(avg >= dec!(0.40) && avg <= dec!(0.50));
    }

    #[test]
    fn exhausted_book_yields_partial_fill() {
        let book = asks(vec![level(dec!(0.40), dec!(6))]);
        let fill = simulate_fill(&book, OrderSide::Buy, dec!(10));
        assert_eq!(fill.filled(), dec!(6));
        assert_eq!(fill.average_price(), Some(dec!(0.40)));
    }

    #[test]
    fn empty_book_fills_nothing() {
        let fill = simulate_fill(&OrderBook::new(), OrderSide::Buy, dec!(10));
        assert_eq!(fill.filled(), dec!(0));
        assert_eq!(fill.average_price(), None);
    }

    #[test]
    fn simulate_fill_does_not_mutate_the_book() {
        let book = asks(vec![level(dec!(0.40), dec!(10))]);
        let before = book.clone();
        let _ = simulate_fill(&book, OrderSide::Buy, dec!(5));
        let _ = simulate_fill(&book, OrderSide::Buy, dec!(5));
        assert_eq!(book, before);
    }

    #[test]
    fn sell_side_walks_bids() {
        let book = OrderBook::with_levels(
            vec![level(dec!(0.45), dec!(5)), level(dec!(0.40), dec!(5))],
            vec![],
        );
        let fill = simulate_fill(&book, OrderSide::Sell, dec!(8));
        assert_eq!(fill.filled(), dec!(8));
        // (5 * 0.45 + 3 * 0.40) / 8
        assert_eq!(fill.average_price(), Some(dec!(0.43125)));
    }

    #[test]
    fn capped_fill_stops_before_far_level() {
        // 4 shares at the best price, then a jump far beyond the 150 bps cap.
        let book = asks(vec![
            level(dec!(0.55), dec!(4)),
            level(dec!(0.70), dec!(96)),
        ]);
        let fill = simulate_fill_capped(&book, OrderSide::Buy, dec!(10), 150);
        assert_eq!(fill.filled(), dec!(4));
        assert_eq!(fill.average_price(), Some(dec!(0.55)));

        // The plain walk blends both levels instead.
        let plain = simulate_fill(&book, OrderSide::Buy, dec!(10));
        assert_eq!(plain.filled(), dec!(10));
        assert_eq!(plain.average_price(), Some(dec!(0.64)));
    }

    #[test]
    fn capped_fill_consumes_levels_inside_tolerance() {
        // 0.55 * 1.015 = 0.55825, so 0.558 is inside the cap.
        let book = asks(vec![
            level(dec!(0.55), dec!(4)),
            level(dec!(0.558), dec!(6)),
        ]);
        let fill = simulate_fill_capped(&book, OrderSide::Buy, dec!(10), 150);
        assert_eq!(fill.filled(), dec!(10));
    }

    #[test]
    fn capped_fill_on_empty_book() {
        let fill = simulate_fill_capped(&OrderBook::new(), OrderSide::Buy, dec!(10), 150);
        assert_eq!(fill.filled(), dec!(0));
    }

    #[test]
    fn slippage_formula() {
        assert_eq!(slippage_bps(dec!(0.50), dec!(0.51)), Some(dec!(200)));
        assert_eq!(slippage_bps(dec!(0.50), dec!(0.50)), Some(dec!(0)));
        // Price improvement is negative slippage.
        assert_eq!(slippage_bps(dec!(0.50), dec!(0.49)), Some(dec!(-200)));
        assert_eq!(slippage_bps(dec!(0), dec!(0.50)), None);
    }
}
