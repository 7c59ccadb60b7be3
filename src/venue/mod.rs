//! Venue collaborator ports.
//!
//! The engine talks to each venue through two traits: [`VenueAdapter`]
//! for request/response operations (catalog, books, orders, balances) and
//! [`MarketDataStream`] for the push feed. Wire formats, authentication,
//! and pagination live in adapter crates; the engine only sees normalized
//! domain types and [`VenueError`](crate::error::VenueError)
//! classifications.
//!
//! ## Implementing an adapter
//!
//! 1. Map the venue catalog into [`Market`] values (drop entries missing
//!    either outcome token).
//! 2. Normalize book and trade messages into [`MarketEvent`]s; the engine
//!    validates and stores them.
//! 3. Classify transport failures as retryable
//!    (`Unavailable`/`RateLimited`) and order rejections as fatal — the
//!    retry policy keys off that split.

mod reconnecting;

pub use reconnecting::ReconnectingStream;

use async_trait::async_trait;

use crate::domain::{
    Market, OrderBook, OrderId, OrderSide, Price, PriceLevel, Size, TokenId, TradeEvent,
};
use crate::error::VenueError;

/// An order to submit to one venue.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    /// The outcome token to trade.
    pub token: TokenId,
    /// Buy or sell.
    pub side: OrderSide,
    /// Requested size in shares.
    pub size: Size,
    /// Limit price.
    pub limit_price: Price,
    /// Client-chosen key for venue-side idempotency, where supported.
    pub client_key: Option<String>,
}

/// Venue acknowledgement of a submitted order.
#[derive(Debug, Clone)]
pub struct OrderResult {
    /// Venue-assigned order ID.
    pub order_id: OrderId,
    /// Size filled so far; zero means the order is resting.
    pub filled: Size,
    /// Average fill price across fills, when any exist.
    pub avg_price: Option<Price>,
}

impl OrderResult {
    /// True when at least one share filled.
    #[must_use]
    pub fn has_fill(&self) -> bool {
        self.filled > Size::ZERO
    }
}

/// Token balance held at a venue.
#[derive(Debug, Clone)]
pub struct Balance {
    /// The held token (or the venue's cash token).
    pub token: TokenId,
    /// Total balance.
    pub total: Size,
    /// Portion not locked in open orders.
    pub available: Size,
}

/// Request/response operations of one venue.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Venue name for logging and diagnostics.
    fn name(&self) -> &str;

    /// Fetch up to `limit` active binary markets from the catalog.
    async fn list_active_markets(&self, limit: usize) -> Result<Vec<Market>, VenueError>;

    /// Fetch the current order book for a token.
    async fn get_order_book(&self, token: &TokenId) -> Result<OrderBook, VenueError>;

    /// Submit an order.
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderResult, VenueError>;

    /// Cancel an order; `true` means it was cancelled before any fill.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<bool, VenueError>;

    /// Current balances.
    async fn balances(&self) -> Result<Vec<Balance>, VenueError>;
}

/// Events pushed by a venue's market data feed.
///
/// Already parsed by the adapter; the engine validates level ordering
/// when it applies a snapshot to the state store.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    /// Full book snapshot for one token. Supersedes prior state entirely.
    BookSnapshot {
        token: TokenId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    },
    /// A public fill.
    Trade(TradeEvent),
    /// Feed connection established.
    Connected,
    /// Feed connection lost; the reconnecting wrapper handles this.
    Disconnected { reason: String },
}

/// Push feed of one venue.
#[async_trait]
pub trait MarketDataStream: Send {
    /// Connect to the venue feed.
    async fn connect(&mut self) -> Result<(), VenueError>;

    /// Subscribe to book and trade events for the given tokens.
    async fn subscribe(&mut self, tokens: &[TokenId]) -> Result<(), VenueError>;

    /// Await the next event; `None` means the stream closed.
    async fn next_event(&mut self) -> Option<MarketEvent>;

    /// Venue name for logging and diagnostics.
    fn venue_name(&self) -> &str;
}

/// Allow boxed streams behind the generic reconnecting wrapper.
#[async_trait]
impl MarketDataStream for Box<dyn MarketDataStream> {
    async fn connect(&mut self) -> Result<(), VenueError> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, tokens: &[TokenId]) -> Result<(), VenueError> {
        (**self).subscribe(tokens).await
    }

    async fn next_event(&mut self) -> Option<MarketEvent> {
        (**self).next_event().await
    }

    fn venue_name(&self) -> &str {
        (**self).venue_name()
    }
}
