//! Feed module - exchange websocket clients and the volume aggregation hub

pub mod binance;
pub mod coinbase;
pub mod hub;
pub mod messages;
pub mod rest;

pub use binance::BinanceFeedClient;
pub use coinbase::CoinbaseFeedClient;
pub use hub::{FeedHandle, FeedHub, VolumeAggregator};
pub use rest::VolumeRestClient;
