//! Market state store: the single source of truth for current books.
//!
//! Streaming ingestion writes here and the scanner reads here, so the
//! scanner never branches on whether data arrived by push or by REST
//! fallback. Books are keyed by `(venue, token)` in a sharded map —
//! updates to unrelated tokens never contend on one lock — and each
//! snapshot replaces the prior book atomically; there are no partial
//! merges.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::warn;

use crate::domain::{ConditionId, OrderBook, PriceLevel, TokenId, TradeEvent, Venue};

/// Shared store of the latest book per `(venue, token)` plus a bounded
/// recent-trade tape per `(venue, condition)`.
///
/// `get_book` returning `None` means no snapshot has ever arrived for
/// that key; an empty book is a valid, cleared state and is returned as
/// `Some`. Callers must not conflate the two.
pub struct MarketStateStore {
    books: DashMap<(Venue, TokenId), OrderBook>,
    trades: DashMap<(Venue, ConditionId), VecDeque<TradeEvent>>,
    tape_capacity: usize,
    discarded_snapshots: AtomicU64,
}

impl MarketStateStore {
    /// Create a store retaining up to `tape_capacity` trades per condition.
    #[must_use]
    pub fn new(tape_capacity: usize) -> Self {
        Self {
            books: DashMap::new(),
            trades: DashMap::new(),
            tape_capacity,
            discarded_snapshots: AtomicU64::new(0),
        }
    }

    /// Replace the stored book for `(venue, token)` with a new snapshot.
    ///
    /// Malformed payloads (out-of-range prices, non-positive sizes,
    /// unsorted sides) are discarded: the previous book stays readable,
    /// the discard counter is bumped, and nothing is raised to the
    /// caller. Feeds deliver junk occasionally; dropping one snapshot is
    /// cheaper than poisoning the store.
    pub fn apply_snapshot(
        &self,
        venue: Venue,
        token: TokenId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) {
        match OrderBook::try_new(bids, asks) {
            Ok(book) => {
                self.books.insert((venue, token), book);
            }
            Err(e) => {
                self.discarded_snapshots.fetch_add(1, Ordering::Relaxed);
                warn!(%venue, token = %token, error = %e, "discarded malformed book snapshot");
            }
        }
    }

    /// Append a trade to its condition's ring buffer, evicting the
    /// oldest entry once the tape is full.
    pub fn apply_trade(&self, trade: TradeEvent) {
        if self.tape_capacity == 0 {
            return;
        }
        let key = (trade.venue(), trade.condition().clone());
        let mut tape = self.trades.entry(key).or_default();
        if tape.len() == self.tape_capacity {
            tape.pop_front();
        }
        tape.push_back(trade);
    }

    /// Snapshot of the current book, or `None` if none ever arrived.
    #[must_use]
    pub fn get_book(&self, venue: Venue, token: &TokenId) -> Option<OrderBook> {
        self.books
            .get(&(venue, token.clone()))
            .map(|entry| entry.value().clone())
    }

    /// The most recent trades for a condition, oldest first, at most
    /// `limit` entries.
    #[must_use]
    pub fn recent_trades(
        &self,
        venue: Venue,
        condition: &ConditionId,
        limit: usize,
    ) -> Vec<TradeEvent> {
        self.trades
            .get(&(venue, condition.clone()))
            .map(|tape| {
                let skip = tape.len().saturating_sub(limit);
                tape.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Number of tokens with a stored book.
    #[must_use]
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// How many malformed snapshots have been discarded since startup.
    #[must_use]
    pub fn discarded_snapshots(&self) -> u64 {
        self.discarded_snapshots.load(Ordering::Relaxed)
    }
}
