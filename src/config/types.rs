//! Configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::types::{DefenseType, Hand, KoPhase, PunchType};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Binance feed configuration
    #[serde(default)]
    pub binance: BinanceConfig,
    /// Coinbase feed configuration
    #[serde(default)]
    pub coinbase: CoinbaseConfig,
    /// Fight engine tunables
    #[serde(default)]
    pub fight: FightConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            binance: BinanceConfig::default(),
            coinbase: CoinbaseConfig::default(),
            fight: FightConfig::default(),
            settings: AppSettings::default(),
        }
    }
}

/// Binance feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceConfig {
    /// Combined-stream WebSocket URL
    #[serde(default = "default_binance_ws_url")]
    pub websocket_url: String,
    /// REST base URL for the volume-poll fallback
    #[serde(default = "default_binance_rest_url")]
    pub rest_url: String,
    /// Symbol to stream
    #[serde(default = "default_binance_symbol")]
    pub symbol: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            websocket_url: default_binance_ws_url(),
            rest_url: default_binance_rest_url(),
            symbol: default_binance_symbol(),
        }
    }
}

fn default_binance_ws_url() -> String {
    "wss://stream.binance.com:9443/stream?streams=btcusdt@trade".to_string()
}

fn default_binance_rest_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_binance_symbol() -> String {
    "BTCUSDT".to_string()
}

/// Coinbase feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseConfig {
    /// WebSocket feed URL
    #[serde(default = "default_coinbase_ws_url")]
    pub websocket_url: String,
    /// REST base URL for the volume-poll fallback
    #[serde(default = "default_coinbase_rest_url")]
    pub rest_url: String,
    /// Product to subscribe to
    #[serde(default = "default_coinbase_product")]
    pub product_id: String,
}

impl Default for CoinbaseConfig {
    fn default() -> Self {
        Self {
            websocket_url: default_coinbase_ws_url(),
            rest_url: default_coinbase_rest_url(),
            product_id: default_coinbase_product(),
        }
    }
}

fn default_coinbase_ws_url() -> String {
    "wss://ws-feed.exchange.coinbase.com".to_string()
}

fn default_coinbase_rest_url() -> String {
    "https://api.exchange.coinbase.com".to_string()
}

fn default_coinbase_product() -> String {
    "BTC-USD".to_string()
}

/// Fight engine tunables.
///
/// Every quantity the match logic depends on is fixed at start-up; there is
/// no runtime reconfiguration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightConfig {
    /// Milliseconds per animation frame
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u64,

    /// Punch cooldowns, increasing with punch severity
    #[serde(default = "default_jab_cooldown_ms")]
    pub jab_cooldown_ms: u64,
    #[serde(default = "default_body_cooldown_ms")]
    pub body_cooldown_ms: u64,
    #[serde(default = "default_hook_cooldown_ms")]
    pub hook_cooldown_ms: u64,
    #[serde(default = "default_cross_cooldown_ms")]
    pub cross_cooldown_ms: u64,
    #[serde(default = "default_uppercut_cooldown_ms")]
    pub uppercut_cooldown_ms: u64,

    /// Minimum time to keep showing a defense before a switch is allowed
    #[serde(default = "default_defense_cooldown_ms")]
    pub head_block_cooldown_ms: u64,
    #[serde(default = "default_defense_cooldown_ms")]
    pub body_block_cooldown_ms: u64,
    #[serde(default = "default_defense_cooldown_ms")]
    pub dodge_left_cooldown_ms: u64,
    #[serde(default = "default_defense_cooldown_ms")]
    pub dodge_right_cooldown_ms: u64,

    /// Minimum idle time after a defense completes before re-entering defense
    #[serde(default = "default_min_idle_after_defense_ms")]
    pub min_idle_after_defense_ms: u64,

    /// Fallback timeout that clears a Damaged state whose completion deadline
    /// was lost, so the match cannot get stuck
    #[serde(default = "default_damage_safety_timeout_ms")]
    pub damage_safety_timeout_ms: u64,

    /// KO phase display durations
    #[serde(default = "default_ko_fall_ms")]
    pub ko_fall_ms: u64,
    #[serde(default = "default_ko_knocked_down_ms")]
    pub ko_knocked_down_ms: u64,
    #[serde(default = "default_ko_rise_ms")]
    pub ko_rise_ms: u64,

    /// Damage points per punch type
    #[serde(default = "default_jab_damage")]
    pub jab_damage: u32,
    #[serde(default = "default_body_damage")]
    pub body_damage: u32,
    #[serde(default = "default_hook_damage")]
    pub hook_damage: u32,
    #[serde(default = "default_cross_damage")]
    pub cross_damage: u32,
    #[serde(default = "default_uppercut_damage")]
    pub uppercut_damage: u32,

    /// KO threshold and damage bar cap
    #[serde(default = "default_max_damage_points")]
    pub max_damage_points: u32,

    /// Hand that executes when both hands are eligible in the same tick
    #[serde(default = "default_priority_hand")]
    pub priority_hand: Hand,
}

impl Default for FightConfig {
    fn default() -> Self {
        // serde defaults and Default must agree; both go through the same fns
        Self {
            frame_duration_ms: default_frame_duration_ms(),
            jab_cooldown_ms: default_jab_cooldown_ms(),
            body_cooldown_ms: default_body_cooldown_ms(),
            hook_cooldown_ms: default_hook_cooldown_ms(),
            cross_cooldown_ms: default_cross_cooldown_ms(),
            uppercut_cooldown_ms: default_uppercut_cooldown_ms(),
            head_block_cooldown_ms: default_defense_cooldown_ms(),
            body_block_cooldown_ms: default_defense_cooldown_ms(),
            dodge_left_cooldown_ms: default_defense_cooldown_ms(),
            dodge_right_cooldown_ms: default_defense_cooldown_ms(),
            min_idle_after_defense_ms: default_min_idle_after_defense_ms(),
            damage_safety_timeout_ms: default_damage_safety_timeout_ms(),
            ko_fall_ms: default_ko_fall_ms(),
            ko_knocked_down_ms: default_ko_knocked_down_ms(),
            ko_rise_ms: default_ko_rise_ms(),
            jab_damage: default_jab_damage(),
            body_damage: default_body_damage(),
            hook_damage: default_hook_damage(),
            cross_damage: default_cross_damage(),
            uppercut_damage: default_uppercut_damage(),
            max_damage_points: default_max_damage_points(),
            priority_hand: default_priority_hand(),
        }
    }
}

impl FightConfig {
    /// Milliseconds per animation frame as a Duration
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_duration_ms)
    }

    /// Cooldown for a punch type
    pub fn punch_cooldown(&self, punch: PunchType) -> Duration {
        let ms = match punch {
            PunchType::Jab => self.jab_cooldown_ms,
            PunchType::Body => self.body_cooldown_ms,
            PunchType::Hook => self.hook_cooldown_ms,
            PunchType::Cross => self.cross_cooldown_ms,
            PunchType::Uppercut => self.uppercut_cooldown_ms,
        };
        Duration::from_millis(ms)
    }

    /// Cooldown before switching away from a defense type
    pub fn defense_cooldown(&self, defense: DefenseType) -> Duration {
        let ms = match defense {
            DefenseType::HeadBlock => self.head_block_cooldown_ms,
            DefenseType::BodyBlock => self.body_block_cooldown_ms,
            DefenseType::DodgeLeft => self.dodge_left_cooldown_ms,
            DefenseType::DodgeRight => self.dodge_right_cooldown_ms,
        };
        Duration::from_millis(ms)
    }

    /// Minimum idle interval after a defense completes
    pub fn min_idle_after_defense(&self) -> Duration {
        Duration::from_millis(self.min_idle_after_defense_ms)
    }

    /// Safety timeout for a stuck Damaged state
    pub fn damage_safety_timeout(&self) -> Duration {
        Duration::from_millis(self.damage_safety_timeout_ms)
    }

    /// Display duration for a KO phase
    pub fn ko_duration(&self, phase: KoPhase) -> Duration {
        let ms = match phase {
            KoPhase::Fall => self.ko_fall_ms,
            KoPhase::KnockedDown => self.ko_knocked_down_ms,
            KoPhase::Rise => self.ko_rise_ms,
        };
        Duration::from_millis(ms)
    }

    /// Damage points for a punch type
    pub fn damage_points(&self, punch: PunchType) -> u32 {
        match punch {
            PunchType::Jab => self.jab_damage,
            PunchType::Body => self.body_damage,
            PunchType::Hook => self.hook_damage,
            PunchType::Cross => self.cross_damage,
            PunchType::Uppercut => self.uppercut_damage,
        }
    }
}

fn default_frame_duration_ms() -> u64 {
    80
}

fn default_jab_cooldown_ms() -> u64 {
    1000
}

fn default_body_cooldown_ms() -> u64 {
    2000
}

fn default_hook_cooldown_ms() -> u64 {
    3000
}

fn default_cross_cooldown_ms() -> u64 {
    4000
}

fn default_uppercut_cooldown_ms() -> u64 {
    5000
}

fn default_defense_cooldown_ms() -> u64 {
    1000
}

fn default_min_idle_after_defense_ms() -> u64 {
    100
}

fn default_damage_safety_timeout_ms() -> u64 {
    3000
}

fn default_ko_fall_ms() -> u64 {
    400
}

fn default_ko_knocked_down_ms() -> u64 {
    5000
}

fn default_ko_rise_ms() -> u64 {
    4600
}

fn default_jab_damage() -> u32 {
    1
}

fn default_body_damage() -> u32 {
    3
}

fn default_hook_damage() -> u32 {
    4
}

fn default_cross_damage() -> u32 {
    5
}

fn default_uppercut_damage() -> u32 {
    8
}

fn default_max_damage_points() -> u32 {
    100
}

fn default_priority_hand() -> Hand {
    Hand::Right
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay between reconnection attempts in milliseconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Interval between connectivity checks in seconds
    #[serde(default = "default_reconnect_check_interval")]
    pub reconnect_check_interval_seconds: u64,
    /// Minimum interval between published volume snapshots in milliseconds
    #[serde(default = "default_emit_throttle")]
    pub emit_throttle_ms: u64,
    /// Interval on which the buy/sell volume accumulators reset in milliseconds
    #[serde(default = "default_volume_reset_interval")]
    pub volume_reset_interval_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            reconnect_delay_ms: default_reconnect_delay(),
            reconnect_check_interval_seconds: default_reconnect_check_interval(),
            emit_throttle_ms: default_emit_throttle(),
            volume_reset_interval_ms: default_volume_reset_interval(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reconnect_delay() -> u64 {
    5000
}

fn default_reconnect_check_interval() -> u64 {
    10
}

fn default_emit_throttle() -> u64 {
    100
}

fn default_volume_reset_interval() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}
