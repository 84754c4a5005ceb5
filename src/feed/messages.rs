//! WebSocket message types for the exchange feeds

use serde::{Deserialize, Serialize};

/// Envelope for Binance combined streams: `{"stream": "...", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceStreamEnvelope {
    pub stream: String,
    pub data: serde_json::Value,
}

/// `<symbol>@trade` payload
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceTradeEvent {
    /// Event type ("trade")
    #[serde(rename = "e")]
    pub event_type: String,
    /// Event time (ms)
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Symbol
    #[serde(rename = "s")]
    pub symbol: String,
    /// Trade ID
    #[serde(rename = "t")]
    pub trade_id: i64,
    /// Price
    #[serde(rename = "p")]
    pub price: String,
    /// Quantity in base asset
    #[serde(rename = "q")]
    pub quantity: String,
    /// Trade time (ms)
    #[serde(rename = "T")]
    pub trade_time: i64,
    /// True when the buyer is the market maker, i.e. the taker sold
    #[serde(rename = "m")]
    pub buyer_is_maker: bool,
}

/// Subscription request for the Coinbase feed
#[derive(Debug, Clone, Serialize)]
pub struct CoinbaseSubscribeMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub product_ids: Vec<String>,
    pub channels: Vec<String>,
}

impl CoinbaseSubscribeMessage {
    pub fn new(product_id: &str) -> Self {
        Self {
            message_type: "subscribe".to_string(),
            product_ids: vec![product_id.to_string()],
            channels: vec!["matches".to_string(), "heartbeat".to_string()],
        }
    }
}

/// A match (trade execution) on the Coinbase feed.
///
/// Sent as `"type": "match"`, or `"last_match"` right after subscribing.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseMatchEvent {
    #[serde(rename = "type")]
    pub message_type: String,
    pub trade_id: Option<i64>,
    /// "buy" or "sell"; the feed counts "buy" toward buy volume
    pub side: String,
    pub size: String,
    pub price: String,
    pub product_id: String,
    pub time: Option<String>,
}

/// Error message from the Coinbase feed
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseErrorMessage {
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binance_trade_envelope() {
        let json = r#"{
            "stream": "btcusdt@trade",
            "data": {
                "e": "trade", "E": 1704067200123, "s": "BTCUSDT",
                "t": 12345, "p": "42000.50", "q": "0.015",
                "T": 1704067200120, "m": true
            }
        }"#;

        let envelope: BinanceStreamEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.stream, "btcusdt@trade");

        let trade: BinanceTradeEvent = serde_json::from_value(envelope.data).unwrap();
        assert_eq!(trade.symbol, "BTCUSDT");
        assert_eq!(trade.quantity, "0.015");
        assert!(trade.buyer_is_maker);
    }

    #[test]
    fn test_coinbase_subscribe_message_shape() {
        let msg = CoinbaseSubscribeMessage::new("BTC-USD");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "subscribe");
        assert_eq!(json["product_ids"][0], "BTC-USD");
        assert_eq!(json["channels"][0], "matches");
    }

    #[test]
    fn test_parse_coinbase_match() {
        let json = r#"{
            "type": "match", "trade_id": 98765, "side": "sell",
            "size": "0.25", "price": "42001.10", "product_id": "BTC-USD",
            "time": "2024-01-01T00:00:00.000000Z"
        }"#;

        let event: CoinbaseMatchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.message_type, "match");
        assert_eq!(event.side, "sell");
        assert_eq!(event.size, "0.25");
    }
}
