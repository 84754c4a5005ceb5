//! WebSocket client for the Coinbase exchange feed

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

use super::messages::{CoinbaseErrorMessage, CoinbaseMatchEvent, CoinbaseSubscribeMessage};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::FeedClient;
use crate::common::types::{ConnectionStatus, Exchange, FeedEvent, Side, TradeTick};

/// How often the reader pings the server and re-checks the connected flag
const PING_INTERVAL_SECS: u64 = 15;

/// WebSocket client for the Coinbase matches channel
pub struct CoinbaseFeedClient {
    url: String,
    product_id: String,
    is_connected: Arc<AtomicBool>,
}

impl CoinbaseFeedClient {
    pub fn new(url: &str, product_id: &str) -> Self {
        Self {
            url: url.to_string(),
            product_id: product_id.to_string(),
            is_connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Connect, subscribe to the matches channel, and start forwarding events
    #[instrument(skip(self, event_sender))]
    pub async fn connect_and_stream(
        &mut self,
        event_sender: mpsc::Sender<FeedEvent>,
    ) -> Result<()> {
        info!("Connecting to Coinbase WebSocket: {}", self.url);

        let (ws_stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| ClientError::WebSocketConnection(e.to_string()))?;

        info!("Coinbase WebSocket connection established");
        self.is_connected.store(true, Ordering::SeqCst);

        let _ = event_sender
            .send(FeedEvent::ConnectionStatus {
                exchange: Exchange::Coinbase,
                status: ConnectionStatus::Connected,
            })
            .await;

        let (mut write, mut read) = ws_stream.split();

        // Subscribe to matches (+ heartbeat keepalive) for the product
        let subscribe = CoinbaseSubscribeMessage::new(&self.product_id);
        let msg_json = serde_json::to_string(&subscribe)?;
        debug!("Sending subscription message: {}", msg_json);
        write.send(Message::Text(msg_json)).await?;

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
                                        warn!("Failed to parse Coinbase message: {} - {}", e, text);
                                        let _ = event_sender
                                            .send(FeedEvent::Raw {
                                                exchange: Exchange::Coinbase,
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
                            }
                            Some(Ok(Message::Close(frame))) => {
                                info!("Coinbase WebSocket closed: {:?}", frame);
                                is_connected.store(false, Ordering::SeqCst);
                                let _ = event_sender
                                    .send(FeedEvent::ConnectionStatus {
                                        exchange: Exchange::Coinbase,
                                        status: ConnectionStatus::Disconnected(
                                            frame.map(|f| f.reason.to_string()),
                                        ),
                                    })
                                    .await;
                                break;
                            }
                            Some(Err(e)) => {
                                error!("Coinbase WebSocket error: {}", e);
                                is_connected.store(false, Ordering::SeqCst);
                                let _ = event_sender
                                    .send(FeedEvent::ConnectionStatus {
                                        exchange: Exchange::Coinbase,
                                        status: ConnectionStatus::Error(e.to_string()),
                                    })
                                    .await;
                                break;
                            }
                            None => {
                                info!("Coinbase WebSocket stream ended");
                                is_connected.store(false, Ordering::SeqCst);
                                let _ = event_sender
                                    .send(FeedEvent::ConnectionStatus {
                                        exchange: Exchange::Coinbase,
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

    /// Parse an incoming feed message into a FeedEvent
    fn parse_message(text: &str) -> Result<Option<FeedEvent>> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        match value.get("type").and_then(|v| v.as_str()) {
            Some("match") | Some("last_match") => {
                let event: CoinbaseMatchEvent = serde_json::from_value(value)?;

                let size: Decimal = event.size.parse().map_err(|_| {
                    ClientError::InvalidResponse(format!("bad size: {}", event.size))
                })?;
                let price: Option<Decimal> = event.price.parse().ok();

                let side = match event.side.as_str() {
                    "buy" => Side::Buy,
                    _ => Side::Sell,
                };

                let timestamp = event
                    .time
                    .as_deref()
                    .and_then(|t| t.parse::<DateTime<Utc>>().ok())
                    .unwrap_or_else(Utc::now);

                Ok(Some(FeedEvent::Trade(TradeTick {
                    exchange: Exchange::Coinbase,
                    price,
                    size,
                    side,
                    timestamp,
                })))
            }
            Some("heartbeat") => Ok(Some(FeedEvent::Heartbeat {
                exchange: Exchange::Coinbase,
            })),
            Some("subscriptions") => {
                debug!("Coinbase subscriptions confirmed");
                Ok(None)
            }
            Some("error") => {
                let error: CoinbaseErrorMessage = serde_json::from_value(value)?;
                warn!(
                    "Coinbase feed error: {} ({})",
                    error.message,
                    error.reason.unwrap_or_default()
                );
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl FeedClient for CoinbaseFeedClient {
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
        "coinbase"
    }
}
