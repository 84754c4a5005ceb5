//! Unified types used across both exchange feed clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source exchange identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Coinbase,
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exchange::Binance => write!(f, "binance"),
            Exchange::Coinbase => write!(f, "coinbase"),
        }
    }
}

/// Taker side of an executed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A single trade execution reported by an exchange stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTick {
    /// Exchange this trade is from
    pub exchange: Exchange,
    /// Execution price, when the stream carries one
    pub price: Option<Decimal>,
    /// Trade size in base asset (BTC)
    pub size: Decimal,
    /// Side of the taker order
    pub side: Side,
    /// Timestamp of the trade
    pub timestamp: DateTime<Utc>,
}

/// Connection status for a feed client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Successfully connected
    Connected,
    /// Disconnected (with optional reason)
    Disconnected(Option<String>),
    /// Attempting to reconnect
    Reconnecting { attempt: u32 },
    /// Connection error
    Error(String),
}

/// Unified feed event from either exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeedEvent {
    /// Trade execution
    Trade(TradeTick),
    /// Connection status change
    ConnectionStatus {
        exchange: Exchange,
        status: ConnectionStatus,
    },
    /// Heartbeat/ping response
    Heartbeat { exchange: Exchange },
    /// Aggregate buy/sell volume totals from the REST poll fallback,
    /// replacing the accumulated values for that exchange
    VolumeTotals {
        exchange: Exchange,
        buy: Decimal,
        sell: Decimal,
    },
    /// Raw/unknown message (for debugging)
    Raw { exchange: Exchange, message: String },
}

impl FeedEvent {
    /// Get the exchange this event is from
    pub fn exchange(&self) -> Exchange {
        match self {
            FeedEvent::Trade(tick) => tick.exchange,
            FeedEvent::ConnectionStatus { exchange, .. } => *exchange,
            FeedEvent::Heartbeat { exchange } => *exchange,
            FeedEvent::VolumeTotals { exchange, .. } => *exchange,
            FeedEvent::Raw { exchange, .. } => *exchange,
        }
    }
}

/// Buy/sell volume readings for one exchange together with the running
/// historical maxima used for percentage normalization.
///
/// `None` means the exchange has not reported that side since the last
/// accumulator reset (or is disconnected); maxima only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExchangeVolumes {
    pub buy: Option<Decimal>,
    pub sell: Option<Decimal>,
    pub buy_max: Decimal,
    pub sell_max: Decimal,
}

impl ExchangeVolumes {
    /// Current volume for a side
    pub fn volume(&self, side: Side) -> Option<Decimal> {
        match side {
            Side::Buy => self.buy,
            Side::Sell => self.sell,
        }
    }

    /// Historical maximum for a side
    pub fn max(&self, side: Side) -> Decimal {
        match side {
            Side::Buy => self.buy_max,
            Side::Sell => self.sell_max,
        }
    }

    /// Volume as a fraction of the historical maximum for that side.
    ///
    /// Returns `None` when the current volume is missing or non-positive, or
    /// when no maximum has been observed yet; resolvers treat that as "no
    /// signal" rather than an error.
    pub fn percent(&self, side: Side) -> Option<Decimal> {
        let volume = self.volume(side)?;
        let max = self.max(side);
        if volume <= Decimal::ZERO || max <= Decimal::ZERO {
            return None;
        }
        Some(volume / max)
    }
}

/// Throttled snapshot of both exchanges published by the feed hub.
///
/// This is the single input read by both fighter pipelines each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeSnapshot {
    pub binance: ExchangeVolumes,
    pub coinbase: ExchangeVolumes,
    /// Combat mode: the hero defends when Binance sell volume exceeds Binance
    /// buy volume; the villain always holds the inverted mode. Only Binance
    /// decides the mode even though both exchanges feed type selection.
    pub hero_defending: bool,
}

impl VolumeSnapshot {
    /// Volumes for one exchange
    pub fn exchange(&self, exchange: Exchange) -> &ExchangeVolumes {
        match exchange {
            Exchange::Binance => &self.binance,
            Exchange::Coinbase => &self.coinbase,
        }
    }
}
