//! BtcPunchup Library
//!
//! A Rust library that renders a live boxing match driven by real-time
//! Binance and Coinbase BTC trade-volume telemetry: the feed layer turns
//! exchange websockets into throttled volume snapshots, and the fight engine
//! turns those snapshots into a deterministic sequence of fighter actions.

pub mod common;
pub mod config;
pub mod engine;
pub mod feed;

// Re-export commonly used types
pub use common::errors::{ClientError, Result};
pub use common::types::{
    ConnectionStatus, Exchange, ExchangeVolumes, FeedEvent, Side, TradeTick, VolumeSnapshot,
};
pub use config::types::AppConfig;
pub use feed::{BinanceFeedClient, CoinbaseFeedClient, FeedHandle, FeedHub};

// Engine types
pub use engine::{
    clip_for, reaction_for, required_defense_for, AnimationTag, Arena, ClipSpec, DefenseType,
    Directive, FighterId, FighterMachine, FighterSnapshot, FighterState, FighterStateKind, Hand,
    KoPhase, Playback, PunchType, ReactionType,
};
