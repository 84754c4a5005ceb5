//! Trait definitions for exchange feed clients

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::errors::Result;
use super::types::FeedEvent;

/// Trait for exchange trade-stream clients (Binance, Coinbase, etc.)
///
/// This trait provides a unified interface for connecting to and
/// receiving trade data from exchanges.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Connect to the exchange's WebSocket server and start forwarding
    /// trade events to the provided channel.
    ///
    /// This spawns an internal task that processes incoming messages
    /// and forwards them as `FeedEvent`s.
    ///
    /// # Arguments
    /// * `sender` - Channel sender for forwarding events
    async fn start(&mut self, sender: mpsc::Sender<FeedEvent>) -> Result<()>;

    /// Gracefully disconnect from the exchange
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if the client is currently connected
    fn is_connected(&self) -> bool;

    /// Get the name of the exchange
    fn exchange_name(&self) -> &'static str;
}
