//! Core fight-domain types shared across the engine

use serde::{Deserialize, Serialize};

/// Fighter identifier
///
/// The hero's actions are driven by the buy-volume channel of both exchanges,
/// the villain's by the sell-volume channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FighterId {
    Hero,
    Villain,
}

impl FighterId {
    /// The other fighter
    pub fn opponent(&self) -> FighterId {
        match self {
            FighterId::Hero => FighterId::Villain,
            FighterId::Villain => FighterId::Hero,
        }
    }
}

impl std::fmt::Display for FighterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FighterId::Hero => write!(f, "hero"),
            FighterId::Villain => write!(f, "villain"),
        }
    }
}

/// Hand side for punches: the left hand is driven by Binance, the right by
/// Coinbase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn opposite(&self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

/// Punch attack types, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunchType {
    Jab,
    Body,
    Hook,
    Cross,
    Uppercut,
}

impl PunchType {
    /// All punch types, mildest first
    pub const ALL: [PunchType; 5] = [
        PunchType::Jab,
        PunchType::Body,
        PunchType::Hook,
        PunchType::Cross,
        PunchType::Uppercut,
    ];
}

/// Defense types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseType {
    HeadBlock,
    BodyBlock,
    DodgeLeft,
    DodgeRight,
}

impl DefenseType {
    pub const ALL: [DefenseType; 4] = [
        DefenseType::HeadBlock,
        DefenseType::BodyBlock,
        DefenseType::DodgeLeft,
        DefenseType::DodgeRight,
    ];
}

/// Damage reaction clip selector, derived from the punch and hand that landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    /// Small head flinch (jabs), on the attacking hand's side
    SmallHead(Hand),
    /// Full head reaction (hooks and crosses), opposite the attacking hand
    Head(Hand),
    /// Body reaction, opposite the attacking hand
    Body(Hand),
    /// Shared center reaction (uppercuts)
    Center,
}

/// KO sequence phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KoPhase {
    Fall,
    KnockedDown,
    Rise,
}

impl KoPhase {
    /// The phase that follows this one, or `None` after Rise
    pub fn next(&self) -> Option<KoPhase> {
        match self {
            KoPhase::Fall => Some(KoPhase::KnockedDown),
            KoPhase::KnockedDown => Some(KoPhase::Rise),
            KoPhase::Rise => None,
        }
    }
}

/// Per-tick decision computed purely from current market signals.
///
/// Directives carry no identity across ticks; a fresh one is produced on
/// every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// No action this tick
    Idle,
    /// Throw a punch with the given hand
    Attack { hand: Hand, punch: PunchType },
    /// Hold a defense
    Defend { defense: DefenseType },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involutive() {
        assert_eq!(FighterId::Hero.opponent(), FighterId::Villain);
        assert_eq!(FighterId::Villain.opponent().opponent(), FighterId::Villain);
        assert_eq!(Hand::Left.opposite(), Hand::Right);
        assert_eq!(Hand::Right.opposite().opposite(), Hand::Right);
    }

    #[test]
    fn test_ko_phase_ordering() {
        assert_eq!(KoPhase::Fall.next(), Some(KoPhase::KnockedDown));
        assert_eq!(KoPhase::KnockedDown.next(), Some(KoPhase::Rise));
        assert_eq!(KoPhase::Rise.next(), None);
    }
}
