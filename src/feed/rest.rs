//! REST fallback for volume data
//!
//! When a websocket is down the supervisor polls these endpoints so the match
//! keeps moving on stale-but-plausible volumes: recent trades on Binance and
//! the level-2 order book on Coinbase.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::common::errors::{ClientError, Result};

/// Order book levels summed into the Coinbase volume figures
const BOOK_LEVELS_PER_SIDE: usize = 50;

/// A recent trade from the Binance REST API
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceRestTrade {
    pub qty: String,
    #[serde(rename = "isBuyerMaker")]
    pub is_buyer_maker: bool,
}

/// Level-2 order book from the Coinbase REST API.
///
/// Each level is `[price, size, num_orders]` with mixed JSON types.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseBookResponse {
    pub bids: Vec<Vec<serde_json::Value>>,
    pub asks: Vec<Vec<serde_json::Value>>,
}

/// REST client for the volume-poll fallback
pub struct VolumeRestClient {
    client: reqwest::Client,
    binance_base: String,
    binance_symbol: String,
    coinbase_base: String,
    coinbase_product: String,
}

impl VolumeRestClient {
    pub fn new(
        binance_base: &str,
        binance_symbol: &str,
        coinbase_base: &str,
        coinbase_product: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent("btc_punchup/0.1")
            .build()?;

        Ok(Self {
            client,
            binance_base: binance_base.trim_end_matches('/').to_string(),
            binance_symbol: binance_symbol.to_string(),
            coinbase_base: coinbase_base.trim_end_matches('/').to_string(),
            coinbase_product: coinbase_product.to_string(),
        })
    }

    /// Fetch recent Binance trades and split their volume by taker side
    #[instrument(skip(self))]
    pub async fn binance_recent_volumes(&self) -> Result<(Decimal, Decimal)> {
        let url = format!(
            "{}/api/v3/trades?symbol={}&limit=100",
            self.binance_base, self.binance_symbol
        );
        let trades: Vec<BinanceRestTrade> =
            self.client.get(&url).send().await?.json().await?;

        let mut buy = Decimal::ZERO;
        let mut sell = Decimal::ZERO;
        for trade in &trades {
            let qty: Decimal = trade.qty.parse().map_err(|_| {
                ClientError::InvalidResponse(format!("bad trade qty: {}", trade.qty))
            })?;
            if trade.is_buyer_maker {
                sell += qty;
            } else {
                buy += qty;
            }
        }

        debug!("Binance REST volumes: buy={} sell={}", buy, sell);
        Ok((buy, sell))
    }

    /// Fetch the Coinbase order book and sum resting size per side
    #[instrument(skip(self))]
    pub async fn coinbase_book_volumes(&self) -> Result<(Decimal, Decimal)> {
        let url = format!(
            "{}/products/{}/book?level=2",
            self.coinbase_base, self.coinbase_product
        );
        let book: CoinbaseBookResponse = self.client.get(&url).send().await?.json().await?;

        let buy = sum_level_sizes(&book.bids);
        let sell = sum_level_sizes(&book.asks);

        debug!("Coinbase REST volumes: buy={} sell={}", buy, sell);
        Ok((buy, sell))
    }
}

fn sum_level_sizes(levels: &[Vec<serde_json::Value>]) -> Decimal {
    levels
        .iter()
        .take(BOOK_LEVELS_PER_SIDE)
        .filter_map(|level| level.get(1))
        .filter_map(|size| size.as_str())
        .filter_map(|size| size.parse::<Decimal>().ok())
        .sum()
}
