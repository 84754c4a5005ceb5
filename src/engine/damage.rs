//! Hit resolution tables and per-fighter damage accounting
//!
//! The attack/defense pairings and reaction selections are fixed lookup
//! tables, not derived from volumes.

use serde::{Deserialize, Serialize};

use super::types::{DefenseType, Hand, PunchType, ReactionType};

/// The single defense type that fully nullifies a given attack.
///
/// Jabs and body shots are evaded by dodging away from the attacking hand;
/// hooks and crosses are absorbed by a body block; uppercuts by a head block.
pub fn required_defense_for(punch: PunchType, hand: Hand) -> DefenseType {
    match punch {
        PunchType::Jab | PunchType::Body => match hand {
            Hand::Left => DefenseType::DodgeRight,
            Hand::Right => DefenseType::DodgeLeft,
        },
        PunchType::Hook | PunchType::Cross => DefenseType::BodyBlock,
        PunchType::Uppercut => DefenseType::HeadBlock,
    }
}

/// The damage reaction clip shown when a given attack lands
pub fn reaction_for(punch: PunchType, hand: Hand) -> ReactionType {
    match punch {
        PunchType::Jab => ReactionType::SmallHead(hand),
        PunchType::Body => ReactionType::Body(hand.opposite()),
        PunchType::Hook | PunchType::Cross => ReactionType::Head(hand.opposite()),
        PunchType::Uppercut => ReactionType::Center,
    }
}

/// Damage queued while the target was holding the wrong defense; applied
/// when that defense animation completes, or discarded if KO intervenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredDamage {
    pub reaction: ReactionType,
    pub punch: PunchType,
}

/// Per-fighter damage accounting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageState {
    points: u32,
    #[serde(skip)]
    pending: Option<DeferredDamage>,
}

impl DamageState {
    /// Current damage points (0..=cap)
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Add damage points, clamped to the cap. Returns true when the cap was
    /// reached, which forces the KO sequence.
    pub fn absorb(&mut self, points: u32, cap: u32) -> bool {
        self.points = (self.points + points).min(cap);
        self.points >= cap
    }

    /// Queue damage to apply after the current (wrong) defense completes.
    /// A later hit overwrites the queued one; only the latest survives.
    pub fn defer(&mut self, deferred: DeferredDamage) {
        self.pending = Some(deferred);
    }

    /// Take the queued damage, if any; taking guarantees exactly-once
    /// application
    pub fn take_pending(&mut self) -> Option<DeferredDamage> {
        self.pending.take()
    }

    /// Discard any queued damage (KO supersedes it)
    pub fn discard_pending(&mut self) {
        self.pending = None;
    }

    /// Reset points to zero; only the completed KO Rise phase does this
    pub fn reset(&mut self) {
        self.points = 0;
        self.pending = None;
    }
}
