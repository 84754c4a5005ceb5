//! Fight engine: the decision and state-machine layer
//!
//! Turns continuously changing volume telemetry into a deterministic,
//! time-bounded sequence of fighter actions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 PER FIGHTER (one owning task)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VolumeSnapshot arrives (throttled)                         │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  directive::resolve() → Idle / Attack / Defend              │
//! │       │                                                     │
//! │       ▼ (cooldowns permitting)                              │
//! │  FighterMachine                                             │
//! │    - starts/completes animations on deadlines               │
//! │    - schedules the attack's impact check                    │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 CROSS-FIGHTER (messages only)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HitLanded ──► opponent judges block / defer / damage / KO  │
//! │  KoStarted ──► opponent freezes to Idle                     │
//! │  KoEnded   ──► opponent resumes                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`directive`]: pure resolver from volume percentages to a [`Directive`]
//! - [`cooldown`]: punch and defense-switch cooldown tracking
//! - [`clips`]: data-driven animation clip table
//! - [`damage`]: hit/defense/reaction lookup tables and damage accounting
//! - [`fighter`]: the per-fighter state machine
//! - [`arena`]: fighter tasks, cross-fighter messaging, snapshot publishing
//!
//! [`Directive`]: types::Directive

pub mod arena;
pub mod clips;
pub mod cooldown;
pub mod damage;
pub mod directive;
pub mod fighter;
pub mod types;

pub use arena::{Arena, FighterSnapshot};
pub use clips::{clip_for, AnimationTag, ClipSpec, Playback};
pub use cooldown::CooldownTracker;
pub use damage::{reaction_for, required_defense_for, DamageState, DeferredDamage};
pub use fighter::{FighterEvent, FighterMachine, FighterState, FighterStateKind};
pub use types::{DefenseType, Directive, FighterId, Hand, KoPhase, PunchType, ReactionType};
