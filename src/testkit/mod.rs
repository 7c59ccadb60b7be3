//! Test doubles for the venue ports.
//!
//! Enabled by the `testkit` feature so integration tests (and downstream
//! consumers writing their own) can exercise the engine without a live
//! venue: a programmable [`MockVenue`], a replayable [`ScriptedStream`],
//! and an in-memory [`MemorySink`].

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;

use crate::domain::{
    ArbOpportunity, ExecutionRecord, Market, OrderBook, OrderId, TokenId,
};
use crate::error::VenueError;
use crate::sink::RecordSink;
use crate::venue::{
    Balance, MarketDataStream, MarketEvent, OrderRequest, OrderResult, VenueAdapter,
};

/// Programmable in-memory venue.
///
/// Defaults are permissive: unknown books return `NotFound`, and orders
/// with no queued response fill fully at their limit price. Queue
/// responses per token to script failures, partial fills, or resting
/// orders; queued entries are consumed first, in order.
pub struct MockVenue {
    name: String,
    markets: Mutex<Vec<Market>>,
    books: Mutex<HashMap<TokenId, OrderBook>>,
    book_errors: Mutex<HashMap<TokenId, VecDeque<VenueError>>>,
    order_responses: Mutex<HashMap<TokenId, VecDeque<Result<OrderResult, VenueError>>>>,
    order_delays: Mutex<HashMap<TokenId, std::time::Duration>>,
    placed: Mutex<Vec<OrderRequest>>,
    canceled: Mutex<Vec<OrderId>>,
    cancel_succeeds: Mutex<bool>,
    balances: Mutex<Vec<Balance>>,
    next_order_seq: Mutex<u64>,
}

impl MockVenue {
    /// Create an empty mock venue.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markets: Mutex::new(Vec::new()),
            books: Mutex::new(HashMap::new()),
            book_errors: Mutex::new(HashMap::new()),
            order_responses: Mutex::new(HashMap::new()),
            order_delays: Mutex::new(HashMap::new()),
            placed: Mutex::new(Vec::new()),
            canceled: Mutex::new(Vec::new()),
            cancel_succeeds: Mutex::new(true),
            balances: Mutex::new(Vec::new()),
            next_order_seq: Mutex::new(0),
        }
    }

    /// Set the catalog returned by `list_active_markets`.
    pub fn set_markets(&self, markets: Vec<Market>) {
        *self.markets.lock() = markets;
    }

    /// Set the book served for a token.
    pub fn set_book(&self, token: TokenId, book: OrderBook) {
        self.books.lock().insert(token, book);
    }

    /// Queue a one-shot error for the next book fetch of a token.
    pub fn push_book_error(&self, token: TokenId, error: VenueError) {
        self.book_errors.lock().entry(token).or_default().push_back(error);
    }

    /// Queue the next `place_order` response for a token.
    pub fn push_order_response(
        &self,
        token: TokenId,
        response: Result<OrderResult, VenueError>,
    ) {
        self.order_responses
            .lock()
            .entry(token)
            .or_default()
            .push_back(response);
    }

    /// Delay `place_order` responses for a token (deadline tests).
    pub fn set_order_delay(&self, token: TokenId, delay: std::time::Duration) {
        self.order_delays.lock().insert(token, delay);
    }

    /// Make `cancel_order` report failure-to-cancel (`false`).
    pub fn set_cancel_succeeds(&self, succeeds: bool) {
        *self.cancel_succeeds.lock() = succeeds;
    }

    /// Set the balances returned by `balances`.
    pub fn set_balances(&self, balances: Vec<Balance>) {
        *self.balances.lock() = balances;
    }

    /// Every order request received, in arrival order.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().clone()
    }

    /// Every cancel received, in arrival order.
    #[must_use]
    pub fn canceled_orders(&self) -> Vec<OrderId> {
        self.canceled.lock().clone()
    }

    fn next_order_id(&self) -> OrderId {
        let mut seq = self.next_order_seq.lock();
        *seq += 1;
        OrderId::from(format!("{}-order-{}", self.name, *seq))
    }
}

#[async_trait]
impl VenueAdapter for MockVenue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_active_markets(&self, limit: usize) -> Result<Vec<Market>, VenueError> {
        let markets = self.markets.lock();
        Ok(markets.iter().take(limit).cloned().collect())
    }

    async fn get_order_book(&self, token: &TokenId) -> Result<OrderBook, VenueError> {
        if let Some(error) = self
            .book_errors
            .lock()
            .get_mut(token)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        self.books
            .lock()
            .get(token)
            .cloned()
            .ok_or_else(|| VenueError::NotFound {
                reference: token.to_string(),
            })
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderResult, VenueError> {
        let delay = self.order_delays.lock().get(&request.token).copied();
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        self.placed.lock().push(request.clone());

        let queued = self
            .order_responses
            .lock()
            .get_mut(&request.token)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(response) => response,
            None => Ok(OrderResult {
                order_id: self.next_order_id(),
                filled: request.size,
                avg_price: Some(request.limit_price),
            }),
        }
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<bool, VenueError> {
        self.canceled.lock().push(order_id.clone());
        Ok(*self.cancel_succeeds.lock())
    }

    async fn balances(&self) -> Result<Vec<Balance>, VenueError> {
        Ok(self.balances.lock().clone())
    }
}

/// Stream that replays a fixed sequence of events, then reports closure.
pub struct ScriptedStream {
    name: String,
    events: VecDeque<MarketEvent>,
    subscriptions: Vec<Vec<TokenId>>,
}

impl ScriptedStream {
    /// Create a stream that will emit `events` in order.
    #[must_use]
    pub fn new(name: impl Into<String>, events: Vec<MarketEvent>) -> Self {
        Self {
            name: name.into(),
            events: events.into(),
            subscriptions: Vec::new(),
        }
    }

    /// Token sets passed to `subscribe`, in call order.
    #[must_use]
    pub fn subscriptions(&self) -> &[Vec<TokenId>] {
        &self.subscriptions
    }
}

#[async_trait]
impl MarketDataStream for ScriptedStream {
    async fn connect(&mut self) -> Result<(), VenueError> {
        Ok(())
    }

    async fn subscribe(&mut self, tokens: &[TokenId]) -> Result<(), VenueError> {
        self.subscriptions.push(tokens.to_vec());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<MarketEvent> {
        self.events.pop_front()
    }

    fn venue_name(&self) -> &str {
        &self.name
    }
}

/// Sink that retains everything in memory for assertions.
#[derive(Default)]
pub struct MemorySink {
    opportunities: Mutex<Vec<ArbOpportunity>>,
    executions: Mutex<Vec<ExecutionRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All opportunities recorded so far.
    #[must_use]
    pub fn opportunities(&self) -> Vec<ArbOpportunity> {
        self.opportunities.lock().clone()
    }

    /// All execution records recorded so far.
    #[must_use]
    pub fn executions(&self) -> Vec<ExecutionRecord> {
        self.executions.lock().clone()
    }
}

impl RecordSink for MemorySink {
    fn record_opportunities(&self, opportunities: &[ArbOpportunity]) {
        self.opportunities.lock().extend_from_slice(opportunities);
    }

    fn record_execution(&self, record: &ExecutionRecord) {
        self.executions.lock().push(record.clone());
    }
}
