//! Opportunity scanning: the buy/no-buy decision function.
//!
//! For every matched pair the scanner evaluates both complementary
//! routes against depth-simulated prices and emits the survivors, ranked
//! best first. Output is advisory — nothing here reserves liquidity, and
//! the books may move before a consumer acts (the execution coordinator
//! re-validates for exactly that reason).

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::TradingConfig;
use crate::domain::{
    ArbOpportunity, ArbRoute, MatchedMarket, OrderBook, OrderSide, TokenId, Venue,
};
use crate::pricing::{best_price, simulate_fill_capped, slippage_bps};
use crate::state::MarketStateStore;
use crate::venue::VenueAdapter;

/// Counters for one scan pass, for observability; failures inside a scan
/// are contained here, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Matched pairs examined.
    pub pairs_scanned: usize,
    /// Routes dropped because a required book was absent on both paths.
    pub routes_missing_data: usize,
    /// Routes dropped by size, slippage, or profitability filters.
    pub routes_rejected: usize,
    /// Fallback book fetches that failed hard (venue unreachable).
    pub fetch_errors: usize,
}

/// Evaluate one route of one pair against resolved books.
///
/// Pure decision logic: legs are priced with the slippage-capped depth
/// walk at the configured target size, then filtered on minimum fill
/// size, slippage, and profitability. The accepted opportunity is sized
/// to the thinner leg.
#[must_use]
pub fn evaluate_route(
    config: &TradingConfig,
    pair: &MatchedMarket,
    route: ArbRoute,
    book_a: &OrderBook,
    book_b: &OrderBook,
) -> Option<ArbOpportunity> {
    let target = config.target_size();
    let min_size = config.min_trade_size;
    let cap_bps = config.max_slippage_bps;

    let mut leg_prices = [Decimal::ZERO; 2];
    let mut leg_fills = [Decimal::ZERO; 2];

    for (slot, (venue, book)) in [(Venue::A, book_a), (Venue::B, book_b)].into_iter().enumerate() {
        let entry = best_price(book, OrderSide::Buy)?;
        let fill = simulate_fill_capped(book, OrderSide::Buy, target, cap_bps);
        if fill.filled() < min_size {
            debug!(
                route = %route,
                %venue,
                filled = %fill.filled(),
                "leg depth below minimum trade size"
            );
            return None;
        }
        let avg = fill.average_price()?;
        let slippage = slippage_bps(entry, avg)?;
        if slippage > Decimal::from(cap_bps) {
            debug!(route = %route, %venue, %slippage, "leg slippage beyond cap");
            return None;
        }
        leg_prices[slot] = avg;
        leg_fills[slot] = fill.filled();
    }

    let cost = leg_prices[0] + leg_prices[1];
    if cost >= Decimal::ONE {
        return None;
    }
    let profit_percent = (Decimal::ONE - cost) * Decimal::ONE_HUNDRED;
    if profit_percent < config.min_profit_percent {
        return None;
    }

    let fill_size = leg_fills[0].min(leg_fills[1]);
    ArbOpportunity::try_new(pair.clone(), route, leg_prices[0], leg_prices[1], fill_size).ok()
}

/// Scans matched pairs against current book state.
pub struct OpportunityScanner {
    store: Arc<MarketStateStore>,
    venue_a: Arc<dyn VenueAdapter>,
    venue_b: Arc<dyn VenueAdapter>,
    config: TradingConfig,
}

impl OpportunityScanner {
    /// Create a scanner over the shared store and the two venue adapters.
    pub fn new(
        store: Arc<MarketStateStore>,
        venue_a: Arc<dyn VenueAdapter>,
        venue_b: Arc<dyn VenueAdapter>,
        config: TradingConfig,
    ) -> Self {
        Self {
            store,
            venue_a,
            venue_b,
            config,
        }
    }

    /// The sizing and threshold configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &TradingConfig {
        &self.config
    }

    /// Evaluate both routes of every pair, returning accepted
    /// opportunities ranked by profit descending (ties: larger fill
    /// first, then lower cost).
    ///
    /// Books come from the state store when streamed data exists; absent
    /// entries fall back to a REST fetch through the venue adapter — the
    /// only point where scanning blocks on I/O. Unscannable pairs are
    /// skipped and counted, never fatal.
    pub async fn scan_pairs(
        &self,
        pairs: &[MatchedMarket],
    ) -> (Vec<ArbOpportunity>, ScanStats) {
        let mut stats = ScanStats::default();
        let mut opportunities = Vec::new();

        for pair in pairs {
            stats.pairs_scanned += 1;
            for route in ArbRoute::ALL {
                let token_a = pair.market(Venue::A).token(route.outcome(Venue::A));
                let token_b = pair.market(Venue::B).token(route.outcome(Venue::B));

                let book_a = self.resolve_book(Venue::A, token_a, &mut stats).await;
                let book_b = self.resolve_book(Venue::B, token_b, &mut stats).await;
                let (Some(book_a), Some(book_b)) = (book_a, book_b) else {
                    stats.routes_missing_data += 1;
                    continue;
                };

                match evaluate_route(&self.config, pair, route, &book_a, &book_b) {
                    Some(opportunity) => opportunities.push(opportunity),
                    None => stats.routes_rejected += 1,
                }
            }
        }

        opportunities.sort_by(|x, y| {
            y.profit_percent()
                .cmp(&x.profit_percent())
                .then_with(|| y.fill_size().cmp(&x.fill_size()))
                .then_with(|| x.cost().cmp(&y.cost()))
        });

        (opportunities, stats)
    }

    /// Prefer streamed state; fall back to a REST fetch when the store
    /// has never seen the token.
    async fn resolve_book(
        &self,
        venue: Venue,
        token: &TokenId,
        stats: &mut ScanStats,
    ) -> Option<OrderBook> {
        if let Some(book) = self.store.get_book(venue, token) {
            return Some(book);
        }
        let adapter = match venue {
            Venue::A => &self.venue_a,
            Venue::B => &self.venue_b,
        };
        match adapter.get_order_book(token).await {
            Ok(book) => Some(book),
            Err(e) => {
                stats.fetch_errors += 1;
                warn!(
                    venue = adapter.name(),
                    token = %token,
                    error = %e,
                    "book fetch failed, skipping route"
                );
                None
            }
        }
    }
}
