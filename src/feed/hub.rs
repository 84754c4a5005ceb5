//! Feed hub: volume aggregation and snapshot publishing
//!
//! Collects trade events from both exchange clients, accumulates buy/sell
//! volume per exchange, and publishes throttled [`VolumeSnapshot`]s on a
//! watch channel. Accumulation happens on every message; publication never
//! happens faster than the configured throttle, which caps how often the
//! fighter pipelines re-evaluate. Accumulators reset on a fixed interval;
//! the historical maxima never do.
//!
//! A supervisor task owns both websocket clients, reconnects them when they
//! drop, and bridges the REST volume poll in while a socket is down.

use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::common::channels::create_feed_channel;
use crate::common::errors::Result;
use crate::common::traits::FeedClient;
use crate::common::types::{
    Exchange, ExchangeVolumes, FeedEvent, Side, TradeTick, VolumeSnapshot,
};
use crate::config::types::AppConfig;

use super::binance::BinanceFeedClient;
use super::coinbase::CoinbaseFeedClient;
use super::rest::VolumeRestClient;

/// Per-exchange buy/sell accumulators plus running maxima.
///
/// `None` means "no data since start"; a reset leaves `Some(0)` behind so a
/// connected-but-quiet exchange reads as zero volume, not as missing.
#[derive(Debug, Clone, Default)]
pub struct VolumeAggregator {
    binance_buy: Option<Decimal>,
    binance_sell: Option<Decimal>,
    coinbase_buy: Option<Decimal>,
    coinbase_sell: Option<Decimal>,
    binance: MaximaPair,
    coinbase: MaximaPair,
}

#[derive(Debug, Clone, Copy, Default)]
struct MaximaPair {
    buy: Decimal,
    sell: Decimal,
}

impl MaximaPair {
    fn observe(&mut self, buy: Option<Decimal>, sell: Option<Decimal>) {
        if let Some(buy) = buy {
            if buy > Decimal::ZERO && buy > self.buy {
                self.buy = buy;
            }
        }
        if let Some(sell) = sell {
            if sell > Decimal::ZERO && sell > self.sell {
                self.sell = sell;
            }
        }
    }
}

impl VolumeAggregator {
    /// Add one executed trade to the matching accumulator
    pub fn record(&mut self, tick: &TradeTick) {
        let slot = match (tick.exchange, tick.side) {
            (Exchange::Binance, Side::Buy) => &mut self.binance_buy,
            (Exchange::Binance, Side::Sell) => &mut self.binance_sell,
            (Exchange::Coinbase, Side::Buy) => &mut self.coinbase_buy,
            (Exchange::Coinbase, Side::Sell) => &mut self.coinbase_sell,
        };
        *slot = Some(slot.unwrap_or_default() + tick.size);
    }

    /// Replace an exchange's accumulated volumes with REST poll totals
    pub fn set_totals(&mut self, exchange: Exchange, buy: Decimal, sell: Decimal) {
        match exchange {
            Exchange::Binance => {
                self.binance_buy = Some(buy);
                self.binance_sell = Some(sell);
            }
            Exchange::Coinbase => {
                self.coinbase_buy = Some(buy);
                self.coinbase_sell = Some(sell);
            }
        }
    }

    /// Zero the accumulators (periodic reset); maxima are untouched
    pub fn reset_accumulators(&mut self) {
        for slot in [
            &mut self.binance_buy,
            &mut self.binance_sell,
            &mut self.coinbase_buy,
            &mut self.coinbase_sell,
        ] {
            if slot.is_some() {
                *slot = Some(Decimal::ZERO);
            }
        }
    }

    /// Build the published snapshot, folding current values into the
    /// monotone maxima and deriving the combat mode.
    ///
    /// Mode: the hero defends iff Binance sell volume exceeds Binance buy
    /// volume. Only Binance decides the mode even though both exchanges feed
    /// punch/defense type selection - pinned behavior, see the quirk test.
    pub fn snapshot(&mut self) -> VolumeSnapshot {
        self.binance.observe(self.binance_buy, self.binance_sell);
        self.coinbase.observe(self.coinbase_buy, self.coinbase_sell);

        let hero_defending =
            self.binance_sell.unwrap_or_default() > self.binance_buy.unwrap_or_default();

        VolumeSnapshot {
            binance: ExchangeVolumes {
                buy: self.binance_buy,
                sell: self.binance_sell,
                buy_max: self.binance.buy,
                sell_max: self.binance.sell,
            },
            coinbase: ExchangeVolumes {
                buy: self.coinbase_buy,
                sell: self.coinbase_sell,
                buy_max: self.coinbase.buy,
                sell_max: self.coinbase.sell,
            },
            hero_defending,
        }
    }
}

/// Handle to the running feed: snapshot stream plus shutdown
pub struct FeedHandle {
    snapshots: watch::Receiver<VolumeSnapshot>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl FeedHandle {
    /// Throttled volume snapshot stream
    pub fn snapshots(&self) -> watch::Receiver<VolumeSnapshot> {
        self.snapshots.clone()
    }

    /// Disconnect both clients and stop the hub tasks
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Owner of the exchange clients and aggregation tasks
pub struct FeedHub {
    config: AppConfig,
}

impl FeedHub {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Connect the exchange clients and start the aggregation pipeline.
    ///
    /// Initial connection failures are logged, not fatal; the supervisor
    /// keeps retrying on its check interval.
    pub async fn start(self) -> Result<FeedHandle> {
        let settings = self.config.settings.clone();
        let (events_tx, events_rx) = create_feed_channel();

        let mut binance = BinanceFeedClient::new(&self.config.binance.websocket_url);
        let mut coinbase = CoinbaseFeedClient::new(
            &self.config.coinbase.websocket_url,
            &self.config.coinbase.product_id,
        );

        if let Err(e) = binance.start(events_tx.clone()).await {
            warn!("Initial Binance connection failed: {}", e);
        }
        if let Err(e) = coinbase.start(events_tx.clone()).await {
            warn!("Initial Coinbase connection failed: {}", e);
        }

        let rest = VolumeRestClient::new(
            &self.config.binance.rest_url,
            &self.config.binance.symbol,
            &self.config.coinbase.rest_url,
            &self.config.coinbase.product_id,
            Duration::from_secs(settings.request_timeout_seconds),
        )?;

        let (snapshot_tx, snapshot_rx) = watch::channel(VolumeSnapshot::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tasks = vec![
            tokio::spawn(aggregate(
                events_rx,
                snapshot_tx,
                Duration::from_millis(settings.emit_throttle_ms),
                Duration::from_millis(settings.volume_reset_interval_ms),
                shutdown_rx.clone(),
            )),
            tokio::spawn(supervise(
                binance,
                coinbase,
                rest,
                events_tx,
                Duration::from_secs(settings.reconnect_check_interval_seconds),
                Duration::from_millis(settings.reconnect_delay_ms),
                shutdown_rx,
            )),
        ];

        Ok(FeedHandle {
            snapshots: snapshot_rx,
            shutdown: shutdown_tx,
            tasks,
        })
    }
}

/// Accumulate feed events and publish throttled snapshots
async fn aggregate(
    mut events: mpsc::Receiver<FeedEvent>,
    snapshots: watch::Sender<VolumeSnapshot>,
    emit_throttle: Duration,
    reset_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut aggregator = VolumeAggregator::default();
    let mut emit = interval(emit_throttle);
    let mut reset = interval(reset_interval);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(FeedEvent::Trade(tick)) => aggregator.record(&tick),
                    Some(FeedEvent::VolumeTotals { exchange, buy, sell }) => {
                        aggregator.set_totals(exchange, buy, sell);
                    }
                    Some(FeedEvent::ConnectionStatus { exchange, status }) => {
                        info!("{} connection status: {:?}", exchange, status);
                    }
                    Some(FeedEvent::Heartbeat { .. }) => {}
                    Some(FeedEvent::Raw { exchange, message }) => {
                        debug!("Unparsed {} message: {}", exchange, message);
                    }
                    None => break,
                }
            }
            _ = emit.tick() => {
                snapshots.send_replace(aggregator.snapshot());
            }
            _ = reset.tick() => {
                aggregator.reset_accumulators();
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    debug!("feed aggregator stopped");
}

/// Keep both clients connected; bridge REST volumes while a socket is down
async fn supervise(
    mut binance: BinanceFeedClient,
    mut coinbase: CoinbaseFeedClient,
    rest: VolumeRestClient,
    events_tx: mpsc::Sender<FeedEvent>,
    check_interval: Duration,
    reconnect_delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut check = interval(check_interval);
    // The first tick completes immediately; skip it so a clean startup
    // doesn't double-connect
    check.tick().await;

    loop {
        tokio::select! {
            _ = check.tick() => {
                if !binance.is_connected() {
                    warn!("Binance feed down; polling REST and reconnecting");
                    match rest.binance_recent_volumes().await {
                        Ok((buy, sell)) => {
                            let _ = events_tx
                                .send(FeedEvent::VolumeTotals {
                                    exchange: Exchange::Binance,
                                    buy,
                                    sell,
                                })
                                .await;
                        }
                        Err(e) => debug!("Binance REST fallback failed: {}", e),
                    }
                    tokio::time::sleep(reconnect_delay).await;
                    if let Err(e) = binance.start(events_tx.clone()).await {
                        warn!("Binance reconnect failed: {}", e);
                    }
                }

                if !coinbase.is_connected() {
                    warn!("Coinbase feed down; polling REST and reconnecting");
                    match rest.coinbase_book_volumes().await {
                        Ok((buy, sell)) => {
                            let _ = events_tx
                                .send(FeedEvent::VolumeTotals {
                                    exchange: Exchange::Coinbase,
                                    buy,
                                    sell,
                                })
                                .await;
                        }
                        Err(e) => debug!("Coinbase REST fallback failed: {}", e),
                    }
                    tokio::time::sleep(reconnect_delay).await;
                    if let Err(e) = coinbase.start(events_tx.clone()).await {
                        warn!("Coinbase reconnect failed: {}", e);
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    let _ = binance.disconnect().await;
                    let _ = coinbase.disconnect().await;
                    break;
                }
            }
        }
    }
    debug!("feed supervisor stopped");
}
