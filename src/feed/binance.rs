//! WebSocket client for the Binance trade stream

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, instrument, warn};

use super::messages::{BinanceStreamEnvelope, BinanceTradeEvent};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::FeedClient;
use crate::common::types::{ConnectionStatus, Exchange, FeedEvent, Side, TradeTick};

/// How often the reader pings the server and re-checks the connected flag
const PING_INTERVAL_SECS: u64 = 15;

/// WebSocket client for Binance combined-stream trade data
pub struct BinanceFeedClient {
    /// Combined-stream URL
    url: String,
    /// Connected state flag
    is_connected: Arc<AtomicBool>,
}

impl BinanceFeedClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            is_connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Connect and start forwarding trade events
    ///
    /// Spawns a reader task that parses incoming messages and forwards them
    /// as `FeedEvent`s until the stream ends or the client disconnects.
    #[instrument(skip(self, event_sender))]
    pub async fn connect_and_stream(
        &mut self,
        event_sender: mpsc::Sender<FeedEvent>,
    ) -> Result<()> {
        info!("Connecting to Binance WebSocket: {}", self.url);

        let (ws_stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| ClientError::WebSocketConnection(e.to_string()))?;

        info!("Binance WebSocket connection established");
        self.is_connected.store(true, Ordering::SeqCst);

        let _ = event_sender
            .send(FeedEvent::ConnectionStatus {
                exchange: Exchange::Binance,
                status: ConnectionStatus::Connected,
            })
            .await;

        let (mut write, mut read) = ws_stream.split();
        let is_connected = self.is_connected.clone();

        tokio::spawn(async move {
            let mut ping_interval = interval(Duration::from_secs(PING_INTERVAL_SECS));

            loop {
                tokio::select! {
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match Self::parse_message(&text) {
                                    Ok(Some(event)) => {
                                        if event_sender.send(event).await.is_err() {
                                            error!("Feed event channel closed");
                                            break;
                                        }
                                    }
                                    Ok(None) => {}
                                    Err(e) => {
                                        warn!("Failed to parse Binance message: {} - {}", e, text);
                                        let _ = event_sender
                                            .send(FeedEvent::Raw {
                                                exchange: Exchange::Binance,
                                                message: text,
                                            })
                                            .await;
                                    }
                                }
                            }
                            Some(Ok(Message::Ping(data))) => {
                                debug!("Received Ping, sending Pong");
                                if write.send(Message::Pong(data)).await.is_err() {
                                    break;
                                }
                            }
                            Some(Ok(Message::Pong(_))) => {
                                debug!("Received Pong");
                                let _ = event_sender
                                    .send(FeedEvent::Heartbeat {
                                        exchange: Exchange::Binance,
                                    })
                                    .await;
                            }
                            Some(Ok(Message::Close(frame))) => {
                                info!("Binance WebSocket closed: {:?}", frame);
                                is_connected.store(false, Ordering::SeqCst);
                                let _ = event_sender
                                    .send(FeedEvent::ConnectionStatus {
                                        exchange: Exchange::Binance,
                                        status: ConnectionStatus::Disconnected(
                                            frame.map(|f| f.reason.to_string()),
                                        ),
                                    })
                                    .await;
                                break;
                            }
                            Some(Err(e)) => {
                                error!("Binance WebSocket error: {}", e);
                                is_connected.store(false, Ordering::SeqCst);
                                let _ = event_sender
                                    .send(FeedEvent::ConnectionStatus {
                                        exchange: Exchange::Binance,
                                        status: ConnectionStatus::Error(e.to_string()),
                                    })
                                    .await;
                                break;
                            }
                            None => {
                                info!("Binance WebSocket stream ended");
                                is_connected.store(false, Ordering::SeqCst);
                                let _ = event_sender
                                    .send(FeedEvent::ConnectionStatus {
                                        exchange: Exchange::Binance,
                                        status: ConnectionStatus::Disconnected(None),
                                    })
                                    .await;
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = ping_interval.tick() => {
                        if !is_connected.load(Ordering::SeqCst) {
                            // disconnect() was called
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                        if write.send(Message::Ping(Vec::new())).await.is_err() {
                            is_connected.store(false, Ordering::SeqCst);
                            break;
                        }
                    }
                }
            }
        });

        Ok(())
    }

    /// Parse an incoming combined-stream message into a FeedEvent.
    ///
    /// Non-trade streams yield `None`; they are valid but uninteresting.
    fn parse_message(text: &str) -> Result<Option<FeedEvent>> {
        let envelope: BinanceStreamEnvelope = serde_json::from_str(text)?;

        if !envelope.stream.ends_with("@trade") {
            return Ok(None);
        }

        let trade: BinanceTradeEvent = serde_json::from_value(envelope.data)?;

        let size: Decimal = trade
            .quantity
            .parse()
            .map_err(|_| ClientError::InvalidResponse(format!("bad quantity: {}", trade.quantity)))?;
        let price: Option<Decimal> = trade.price.parse().ok();

        // Buyer being the maker means the taker sold
        let side = if trade.buyer_is_maker {
            Side::Sell
        } else {
            Side::Buy
        };

        let timestamp = DateTime::<Utc>::from_timestamp_millis(trade.trade_time)
            .unwrap_or_else(Utc::now);

        Ok(Some(FeedEvent::Trade(TradeTick {
            exchange: Exchange::Binance,
            price,
            size,
            side,
            timestamp,
        })))
    }
}

#[async_trait]
impl FeedClient for BinanceFeedClient {
    async fn start(&mut self, sender: mpsc::Sender<FeedEvent>) -> Result<()> {
        self.connect_and_stream(sender).await
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.is_connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    fn exchange_name(&self) -> &'static str {
        "binance"
    }
}
