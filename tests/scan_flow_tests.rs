//! End-to-end scan flow: catalogs through matching, streamed state, and
//! depth pricing to ranked opportunities.

use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::watch;

use crossarb::config::Config;
use crossarb::domain::{
    Market, MarketId, OrderBook, PriceLevel, TokenId, Venue,
};
use crossarb::engine::{run_ingest, Engine};
use crossarb::sink::RecordSink;
use crossarb::testkit::{MemorySink, MockVenue, ScriptedStream};
use crossarb::venue::{MarketEvent, VenueAdapter};

fn market(venue: Venue, id: &str, title: &str) -> Market {
    Market::new(
        venue,
        MarketId::from(id),
        title,
        TokenId::from(format!("{id}-yes")),
        TokenId::from(format!("{id}-no")),
    )
}

fn asks_book(levels: &[(rust_decimal::Decimal, rust_decimal::Decimal)]) -> OrderBook {
    OrderBook::with_levels(
        vec![],
        levels.iter().map(|(p, s)| PriceLevel::new(*p, *s)).collect(),
    )
}

fn engine() -> (Engine, Arc<MockVenue>, Arc<MockVenue>, Arc<MemorySink>) {
    let venue_a = Arc::new(MockVenue::new("mock-a"));
    let venue_b = Arc::new(MockVenue::new("mock-b"));
    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new(
        Config::default(),
        venue_a.clone() as Arc<dyn VenueAdapter>,
        venue_b.clone() as Arc<dyn VenueAdapter>,
        sink.clone() as Arc<dyn RecordSink>,
    );
    (engine, venue_a, venue_b, sink)
}

#[tokio::test]
async fn profitable_pair_is_found_and_priced_exactly() {
    let (engine, venue_a, venue_b, sink) = engine();

    venue_a.set_markets(vec![market(Venue::A, "a1", "Will it rain in London tomorrow?")]);
    venue_b.set_markets(vec![market(Venue::B, "b1", "Will it rain in London tomorrow?")]);

    // YES on A at 0.40 (depth 100), NO on B at 0.55 (depth 100),
    // target size 10.
    venue_a.set_book(TokenId::from("a1-yes"), asks_book(&[(dec!(0.40), dec!(100))]));
    venue_a.set_book(TokenId::from("a1-no"), asks_book(&[(dec!(0.70), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-yes"), asks_book(&[(dec!(0.45), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-no"), asks_book(&[(dec!(0.55), dec!(100))]));

    let opportunities = engine.scan_once(50, dec!(0.6)).await.unwrap();

    assert_eq!(opportunities.len(), 1);
    let opp = &opportunities[0];
    assert_eq!(opp.cost(), dec!(0.95));
    assert_eq!(opp.profit_percent(), dec!(5.00));
    assert_eq!(opp.fill_size(), dec!(10));
    assert_eq!(opp.pair().similarity(), dec!(1));

    // The accepted scan lands in the audit sink too.
    assert_eq!(sink.opportunities().len(), 1);
}

#[tokio::test]
async fn overpriced_routes_are_never_emitted() {
    let (engine, venue_a, venue_b, _sink) = engine();

    venue_a.set_markets(vec![market(Venue::A, "a1", "Will the Fed cut rates in March?")]);
    venue_b.set_markets(vec![market(Venue::B, "b1", "Will the Fed cut rates in March?")]);

    // Both routes cost >= 1 (1.02 and 1.03): nothing comes out.
    venue_a.set_book(TokenId::from("a1-yes"), asks_book(&[(dec!(0.47), dec!(100))]));
    venue_a.set_book(TokenId::from("a1-no"), asks_book(&[(dec!(0.58), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-yes"), asks_book(&[(dec!(0.45), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-no"), asks_book(&[(dec!(0.55), dec!(100))]));

    let opportunities = engine.scan_once(50, dec!(0.6)).await.unwrap();
    assert!(opportunities.is_empty());
}

#[tokio::test]
async fn every_emitted_opportunity_satisfies_invariants() {
    let (engine, venue_a, venue_b, _sink) = engine();

    venue_a.set_markets(vec![
        market(Venue::A, "a1", "Will it rain in London tomorrow?"),
        market(Venue::A, "a2", "Will the Fed cut rates in March?"),
        market(Venue::A, "a3", "Will Bitcoin close above 100k this year?"),
    ]);
    venue_b.set_markets(vec![
        market(Venue::B, "b1", "Will it rain in London tomorrow?"),
        market(Venue::B, "b2", "Will the Fed cut rates in March?"),
        market(Venue::B, "b3", "Will Bitcoin close above 100k this year?"),
    ]);

    // A mix of viable and non-viable books across the three pairs.
    venue_a.set_book(TokenId::from("a1-yes"), asks_book(&[(dec!(0.40), dec!(100))]));
    venue_a.set_book(TokenId::from("a1-no"), asks_book(&[(dec!(0.63), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-yes"), asks_book(&[(dec!(0.42), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-no"), asks_book(&[(dec!(0.57), dec!(100))]));

    venue_a.set_book(TokenId::from("a2-yes"), asks_book(&[(dec!(0.30), dec!(40))]));
    venue_a.set_book(TokenId::from("a2-no"), asks_book(&[(dec!(0.72), dec!(40))]));
    venue_b.set_book(TokenId::from("b2-yes"), asks_book(&[(dec!(0.31), dec!(40))]));
    venue_b.set_book(TokenId::from("b2-no"), asks_book(&[(dec!(0.66), dec!(40))]));

    venue_a.set_book(TokenId::from("a3-yes"), asks_book(&[(dec!(0.50), dec!(3))]));
    venue_a.set_book(TokenId::from("a3-no"), asks_book(&[(dec!(0.52), dec!(3))]));
    venue_b.set_book(TokenId::from("b3-yes"), asks_book(&[(dec!(0.49), dec!(3))]));
    venue_b.set_book(TokenId::from("b3-no"), asks_book(&[(dec!(0.48), dec!(3))]));

    let config = Config::default();
    let opportunities = engine.scan_once(50, dec!(0.6)).await.unwrap();

    assert!(!opportunities.is_empty());
    for opp in &opportunities {
        assert!(opp.cost() < dec!(1));
        assert!(opp.fill_size() >= config.trading.min_trade_size);
        assert!(opp.profit_percent() >= config.trading.min_profit_percent);
        assert_eq!(
            opp.profit_percent(),
            (rust_decimal::Decimal::ONE - opp.cost()) * rust_decimal::Decimal::ONE_HUNDRED
        );
    }
    // Ranked by profit, best first.
    for window in opportunities.windows(2) {
        assert!(window[0].profit_percent() >= window[1].profit_percent());
    }
}

#[tokio::test]
async fn thin_leg_caps_opportunity_size() {
    let venue_a = Arc::new(MockVenue::new("mock-a"));
    let venue_b = Arc::new(MockVenue::new("mock-b"));

    venue_a.set_markets(vec![market(Venue::A, "a1", "Will it rain in London tomorrow?")]);
    venue_b.set_markets(vec![market(Venue::B, "b1", "Will it rain in London tomorrow?")]);

    venue_a.set_book(TokenId::from("a1-yes"), asks_book(&[(dec!(0.40), dec!(100))]));
    venue_a.set_book(TokenId::from("a1-no"), asks_book(&[(dec!(0.70), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-yes"), asks_book(&[(dec!(0.45), dec!(100))]));
    // Only 4 at the good price, then a jump past the slippage cap.
    venue_b.set_book(
        TokenId::from("b1-no"),
        asks_book(&[(dec!(0.55), dec!(4)), (dec!(0.70), dec!(96))]),
    );

    let mut config = Config::default();
    config.trading.min_trade_size = dec!(1);
    let engine = Engine::new(
        config,
        venue_a as Arc<dyn VenueAdapter>,
        venue_b as Arc<dyn VenueAdapter>,
        Arc::new(MemorySink::new()) as Arc<dyn RecordSink>,
    );

    let opportunities = engine.scan_once(50, dec!(0.6)).await.unwrap();
    assert_eq!(opportunities.len(), 1);
    let opp = &opportunities[0];
    // The B leg prices at its best level only; size matches the thin leg.
    assert_eq!(opp.leg_price(Venue::B), dec!(0.55));
    assert_eq!(opp.cost(), dec!(0.95));
    assert_eq!(opp.fill_size(), dec!(4));
}

#[tokio::test]
async fn streamed_snapshots_take_priority_over_rest_fallback() {
    let (engine, venue_a, venue_b, _sink) = engine();

    venue_a.set_markets(vec![market(Venue::A, "a1", "Will it rain in London tomorrow?")]);
    venue_b.set_markets(vec![market(Venue::B, "b1", "Will it rain in London tomorrow?")]);

    // REST books are unprofitable...
    venue_a.set_book(TokenId::from("a1-yes"), asks_book(&[(dec!(0.50), dec!(100))]));
    venue_a.set_book(TokenId::from("a1-no"), asks_book(&[(dec!(0.60), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-yes"), asks_book(&[(dec!(0.50), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-no"), asks_book(&[(dec!(0.60), dec!(100))]));

    // ...but the stream has pushed better prices for one route.
    let events = vec![
        MarketEvent::BookSnapshot {
            token: TokenId::from("a1-yes"),
            bids: vec![],
            asks: vec![PriceLevel::new(dec!(0.40), dec!(100))],
        },
    ];
    let (_tx, rx) = watch::channel(false);
    run_ingest(
        Venue::A,
        engine.store(),
        ScriptedStream::new("scripted-a", events),
        rx,
    )
    .await;

    let events_b = vec![MarketEvent::BookSnapshot {
        token: TokenId::from("b1-no"),
        bids: vec![],
        asks: vec![PriceLevel::new(dec!(0.55), dec!(100))],
    }];
    let (_tx, rx) = watch::channel(false);
    run_ingest(
        Venue::B,
        engine.store(),
        ScriptedStream::new("scripted-b", events_b),
        rx,
    )
    .await;

    let opportunities = engine.scan_once(50, dec!(0.6)).await.unwrap();

    // The streamed 0.40/0.55 books drive the decision, not the REST ones.
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].cost(), dec!(0.95));
}

#[tokio::test]
async fn venue_failure_on_one_book_skips_only_that_route() {
    let (engine, venue_a, venue_b, _sink) = engine();

    venue_a.set_markets(vec![market(Venue::A, "a1", "Will it rain in London tomorrow?")]);
    venue_b.set_markets(vec![market(Venue::B, "b1", "Will it rain in London tomorrow?")]);

    venue_a.set_book(TokenId::from("a1-yes"), asks_book(&[(dec!(0.40), dec!(100))]));
    // a1-no intentionally missing: the A_NO+B_YES route cannot be priced.
    venue_b.set_book(TokenId::from("b1-yes"), asks_book(&[(dec!(0.45), dec!(100))]));
    venue_b.set_book(TokenId::from("b1-no"), asks_book(&[(dec!(0.55), dec!(100))]));

    let opportunities = engine.scan_once(50, dec!(0.6)).await.unwrap();

    // The other route still comes through.
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].cost(), dec!(0.95));
}
