//! Reconnecting wrapper for market data streams.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::domain::TokenId;
use crate::error::VenueError;

use super::{MarketDataStream, MarketEvent};

/// Adds reconnect-with-backoff to any [`MarketDataStream`].
///
/// Disconnects are swallowed: consumers only ever see data events, and
/// the subscription set is replayed after each successful reconnect. The
/// delay doubles per consecutive failure (1s, 2s, 4s, ... by default) and
/// is capped by [`StreamConfig::max_backoff_ms`].
pub struct ReconnectingStream<S: MarketDataStream> {
    inner: S,
    config: StreamConfig,
    subscribed: Vec<TokenId>,
    current_delay_ms: u64,
    connected: bool,
}

impl<S: MarketDataStream> ReconnectingStream<S> {
    /// Wrap a stream with the given backoff configuration.
    pub fn new(inner: S, config: StreamConfig) -> Self {
        let current_delay_ms = config.initial_backoff_ms;
        Self {
            inner,
            config,
            subscribed: Vec::new(),
            current_delay_ms,
            connected: false,
        }
    }

    fn reset_backoff(&mut self) {
        self.current_delay_ms = self.config.initial_backoff_ms;
    }

    /// Current delay, advancing the schedule for the next failure.
    fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_millis(self.current_delay_ms);
        let grown = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = grown.min(self.config.max_backoff_ms);
        delay
    }

    async fn reconnect(&mut self) -> Result<(), VenueError> {
        let delay = self.next_delay();
        info!(
            venue = self.inner.venue_name(),
            delay_ms = delay.as_millis() as u64,
            "reconnecting after delay"
        );
        sleep(delay).await;

        self.inner.connect().await?;
        self.connected = true;

        if !self.subscribed.is_empty() {
            debug!(
                venue = self.inner.venue_name(),
                tokens = self.subscribed.len(),
                "resubscribing"
            );
            self.inner.subscribe(&self.subscribed).await?;
        }

        self.reset_backoff();
        Ok(())
    }
}

#[async_trait]
impl<S: MarketDataStream + Send> MarketDataStream for ReconnectingStream<S> {
    async fn connect(&mut self) -> Result<(), VenueError> {
        let result = self.inner.connect().await;
        if result.is_ok() {
            self.connected = true;
            self.reset_backoff();
        }
        result
    }

    async fn subscribe(&mut self, tokens: &[TokenId]) -> Result<(), VenueError> {
        // Remember the set for replay after reconnect.
        self.subscribed = tokens.to_vec();
        self.inner.subscribe(tokens).await
    }

    async fn next_event(&mut self) -> Option<MarketEvent> {
        loop {
            if !self.connected {
                if let Err(e) = self.reconnect().await {
                    warn!(
                        venue = self.inner.venue_name(),
                        error = %e,
                        "reconnect attempt failed"
                    );
                    continue;
                }
            }

            match self.inner.next_event().await {
                Some(MarketEvent::Disconnected { reason }) => {
                    warn!(
                        venue = self.inner.venue_name(),
                        reason = %reason,
                        "feed disconnected"
                    );
                    self.connected = false;
                }
                Some(event) => return Some(event),
                None => {
                    warn!(
                        venue = self.inner.venue_name(),
                        "feed ended unexpectedly"
                    );
                    self.connected = false;
                }
            }
        }
    }

    fn venue_name(&self) -> &str {
        self.inner.venue_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Stream that fails to connect a set number of times, then serves
    /// scripted events.
    struct FlakyStream {
        connect_failures: u32,
        events: VecDeque<MarketEvent>,
        subscriptions: Vec<Vec<TokenId>>,
    }

    #[async_trait]
    impl MarketDataStream for FlakyStream {
        async fn connect(&mut self) -> Result<(), VenueError> {
            if self.connect_failures > 0 {
                self.connect_failures -= 1;
                return Err(VenueError::Unavailable("refused".into()));
            }
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
            "flaky"
        }
    }

    fn fast_config() -> StreamConfig {
        StreamConfig {
            initial_backoff_ms: 1,
            backoff_multiplier: 2.0,
            max_backoff_ms: 4,
        }
    }

    #[test]
    fn delay_doubles_to_cap() {
        let inner = FlakyStream {
            connect_failures: 0,
            events: VecDeque::new(),
            subscriptions: Vec::new(),
        };
        let mut stream = ReconnectingStream::new(
            inner,
            StreamConfig {
                initial_backoff_ms: 1_000,
                backoff_multiplier: 2.0,
                max_backoff_ms: 30_000,
            },
        );
        let delays: Vec<u64> = (0..7).map(|_| stream.next_delay().as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
    }

    #[tokio::test]
    async fn reconnects_through_failures_and_resubscribes() {
        let inner = FlakyStream {
            connect_failures: 2,
            events: VecDeque::from([MarketEvent::Connected]),
            subscriptions: Vec::new(),
        };
        let mut stream = ReconnectingStream::new(inner, fast_config());
        stream
            .subscribe(&[TokenId::from("tok-1")])
            .await
            .unwrap();

        // Not yet connected: next_event drives reconnect until an event flows.
        let event = stream.next_event().await;
        assert!(matches!(event, Some(MarketEvent::Connected)));

        // One initial subscribe plus one replay after the successful connect.
        assert_eq!(stream.inner.subscriptions.len(), 2);
        assert_eq!(stream.inner.subscriptions[1], vec![TokenId::from("tok-1")]);
    }

    #[tokio::test]
    async fn disconnect_event_is_swallowed_and_stream_recovers() {
        let inner = FlakyStream {
            connect_failures: 0,
            events: VecDeque::from([
                MarketEvent::Disconnected {
                    reason: "server closed".into(),
                },
                MarketEvent::Connected,
            ]),
            subscriptions: Vec::new(),
        };
        let mut stream = ReconnectingStream::new(inner, fast_config());
        stream.connect().await.unwrap();

        // The Disconnected event triggers a silent reconnect; the consumer
        // sees only the following data event.
        let event = stream.next_event().await;
        assert!(matches!(event, Some(MarketEvent::Connected)));
    }
}
