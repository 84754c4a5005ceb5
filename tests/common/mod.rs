//! Common test utilities and fixtures

use btc_punchup::common::types::{ExchangeVolumes, VolumeSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Exchange volumes with a fixed 100-unit historical maximum on both sides,
/// so a volume of e.g. 50 reads as 50%.
pub fn exchange_volumes(buy: Option<Decimal>, sell: Option<Decimal>) -> ExchangeVolumes {
    ExchangeVolumes {
        buy,
        sell,
        buy_max: dec!(100),
        sell_max: dec!(100),
    }
}

/// Hero on offense: Binance buys outweigh Binance sells, and the given buy
/// volumes drive the hero's hands (Binance = left, Coinbase = right).
pub fn hero_offense(binance_buy: Decimal, coinbase_buy: Decimal) -> VolumeSnapshot {
    VolumeSnapshot {
        binance: exchange_volumes(Some(binance_buy), Some(dec!(0))),
        coinbase: exchange_volumes(Some(coinbase_buy), None),
        hero_defending: false,
    }
}

/// Hero on defense: Binance sells outweigh Binance buys, and the given buy
/// volumes drive the hero's defense-type selection.
///
/// Sell volumes sit below 1% of their own historical maximum, so the villain
/// (driven by the sell channel) stays idle and the hero's defense behavior can
/// be observed in isolation.
pub fn hero_defense(binance_buy: Decimal, coinbase_buy: Decimal) -> VolumeSnapshot {
    VolumeSnapshot {
        binance: ExchangeVolumes {
            buy: Some(binance_buy),
            sell: Some(dec!(50)),
            buy_max: dec!(100),
            sell_max: dec!(10000),
        },
        coinbase: ExchangeVolumes {
            buy: Some(coinbase_buy),
            sell: Some(dec!(0)),
            buy_max: dec!(100),
            sell_max: dec!(10000),
        },
        hero_defending: true,
    }
}

/// Both channels populated: buy volumes drive the hero, sell volumes the
/// villain, and the Binance buy/sell comparison decides the mode.
pub fn duel(
    binance_buy: Decimal,
    coinbase_buy: Decimal,
    binance_sell: Decimal,
    coinbase_sell: Decimal,
) -> VolumeSnapshot {
    VolumeSnapshot {
        binance: exchange_volumes(Some(binance_buy), Some(binance_sell)),
        coinbase: exchange_volumes(Some(coinbase_buy), Some(coinbase_sell)),
        // Mode comes from the Binance buy/sell comparison alone
        hero_defending: binance_sell > binance_buy,
    }
}
