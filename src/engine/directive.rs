//! Directive resolver
//!
//! Pure mapping from the current volume snapshot to a per-tick [`Directive`].
//! The resolver holds no state: everything is re-derivable from its inputs.
//!
//! The hero reads the buy side of both exchanges, the villain the sell side;
//! apart from the channel the two fighters run the identical function. The
//! Binance-driven signal always maps to the left hand and the Coinbase-driven
//! signal to the right.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::common::types::{Side, VolumeSnapshot};

use super::types::{DefenseType, Directive, Hand, PunchType};

/// Map a volume percentage to a punch type.
///
/// The five ranges partition [0.01, 1.00] with no gaps or overlaps, checked
/// from the most severe punch down; anything below 1% (or above 100%, which a
/// live maximum cannot produce) yields no punch.
pub fn punch_for_percent(percent: Decimal) -> Option<PunchType> {
    if percent >= dec!(0.81) && percent <= dec!(1.00) {
        Some(PunchType::Uppercut)
    } else if percent >= dec!(0.61) && percent <= dec!(0.80) {
        Some(PunchType::Cross)
    } else if percent >= dec!(0.41) && percent <= dec!(0.60) {
        Some(PunchType::Hook)
    } else if percent >= dec!(0.21) && percent <= dec!(0.40) {
        Some(PunchType::Body)
    } else if percent >= dec!(0.01) && percent <= dec!(0.20) {
        Some(PunchType::Jab)
    } else {
        None
    }
}

/// Punch for a raw volume against its historical maximum.
///
/// Missing, non-positive, or max-less volumes produce no punch; bad inputs
/// are expected during warm-up and disconnects, never an error.
pub fn punch_for_volume(volume: Option<Decimal>, max: Decimal) -> Option<PunchType> {
    let volume = volume?;
    if volume <= Decimal::ZERO || max <= Decimal::ZERO {
        return None;
    }
    punch_for_percent(volume / max)
}

/// Map both exchanges' volume percentages to a defense type.
///
/// Both percentages must be derivable or no defense is produced. Blocks are
/// chosen on the higher of the two percentages; dodges on the individual
/// exchange. When both dodge ranges match, DodgeLeft wins - the tie-break is
/// deliberate and pinned by a regression test.
pub fn defense_for_percents(
    binance_percent: Option<Decimal>,
    coinbase_percent: Option<Decimal>,
) -> Option<DefenseType> {
    let binance = binance_percent?;
    let coinbase = coinbase_percent?;

    let max_percent = binance.max(coinbase);

    let head_block = max_percent >= dec!(0.57) && max_percent <= dec!(1.00);
    let body_block = max_percent >= dec!(0.24) && max_percent <= dec!(0.56);
    let dodge_left = binance >= dec!(0.01) && binance <= dec!(0.23);
    let dodge_right = coinbase >= dec!(0.01) && coinbase <= dec!(0.23);

    if head_block {
        Some(DefenseType::HeadBlock)
    } else if body_block {
        Some(DefenseType::BodyBlock)
    } else if dodge_left {
        Some(DefenseType::DodgeLeft)
    } else if dodge_right {
        Some(DefenseType::DodgeRight)
    } else {
        None
    }
}

/// Resolve the per-tick directive for one fighter.
///
/// `channel` selects which volume side drives this fighter (buy for the hero,
/// sell for the villain); `defending` is the fighter's current combat mode.
pub fn resolve(
    snapshot: &VolumeSnapshot,
    channel: Side,
    defending: bool,
    priority_hand: Hand,
) -> Directive {
    if defending {
        match defense_for_percents(
            snapshot.binance.percent(channel),
            snapshot.coinbase.percent(channel),
        ) {
            Some(defense) => Directive::Defend { defense },
            None => Directive::Idle,
        }
    } else {
        let left = punch_for_volume(snapshot.binance.volume(channel), snapshot.binance.max(channel));
        let right = punch_for_volume(
            snapshot.coinbase.volume(channel),
            snapshot.coinbase.max(channel),
        );

        match (left, right) {
            (Some(left_punch), Some(right_punch)) => match priority_hand {
                Hand::Left => Directive::Attack {
                    hand: Hand::Left,
                    punch: left_punch,
                },
                Hand::Right => Directive::Attack {
                    hand: Hand::Right,
                    punch: right_punch,
                },
            },
            (Some(punch), None) => Directive::Attack {
                hand: Hand::Left,
                punch,
            },
            (None, Some(punch)) => Directive::Attack {
                hand: Hand::Right,
                punch,
            },
            (None, None) => Directive::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ExchangeVolumes;
    use pretty_assertions::assert_eq;

    fn volumes(buy: Option<Decimal>, buy_max: Decimal) -> ExchangeVolumes {
        ExchangeVolumes {
            buy,
            sell: None,
            buy_max,
            sell_max: Decimal::ZERO,
        }
    }

    #[test]
    fn test_punch_ranges_partition_without_gaps_or_overlaps() {
        // Walk [0.00, 1.00] in 0.01 steps: below 0.01 nothing, beyond nothing,
        // and adjacent ranges meet without overlap.
        let mut previous: Option<PunchType> = None;
        for hundredths in 0..=100u32 {
            let percent = Decimal::new(hundredths as i64, 2);
            let punch = punch_for_percent(percent);
            match hundredths {
                0 => assert_eq!(punch, None),
                1..=20 => assert_eq!(punch, Some(PunchType::Jab)),
                21..=40 => assert_eq!(punch, Some(PunchType::Body)),
                41..=60 => assert_eq!(punch, Some(PunchType::Hook)),
                61..=80 => assert_eq!(punch, Some(PunchType::Cross)),
                _ => assert_eq!(punch, Some(PunchType::Uppercut)),
            }
            if hundredths > 1 && punch != previous {
                // A boundary: the previous bucket must end exactly one step before
                assert!(punch.is_some());
            }
            previous = punch;
        }
        assert_eq!(punch_for_percent(dec!(1.01)), None);
        assert_eq!(punch_for_percent(dec!(-0.5)), None);
    }

    #[test]
    fn test_punch_for_volume_rejects_bad_inputs() {
        assert_eq!(punch_for_volume(None, dec!(100)), None);
        assert_eq!(punch_for_volume(Some(dec!(0)), dec!(100)), None);
        assert_eq!(punch_for_volume(Some(dec!(-1)), dec!(100)), None);
        assert_eq!(punch_for_volume(Some(dec!(50)), dec!(0)), None);
        assert_eq!(
            punch_for_volume(Some(dec!(50)), dec!(100)),
            Some(PunchType::Hook)
        );
    }

    #[test]
    fn test_defense_priority_order() {
        // Block ranges use the max of the two percentages
        assert_eq!(
            defense_for_percents(Some(dec!(0.10)), Some(dec!(0.60))),
            Some(DefenseType::HeadBlock)
        );
        assert_eq!(
            defense_for_percents(Some(dec!(0.30)), Some(dec!(0.10))),
            Some(DefenseType::BodyBlock)
        );
        // Dodge left keys off Binance, dodge right off Coinbase
        assert_eq!(
            defense_for_percents(Some(dec!(0.10)), Some(dec!(0.005))),
            Some(DefenseType::DodgeLeft)
        );
        assert_eq!(
            defense_for_percents(Some(dec!(0.005)), Some(dec!(0.10))),
            Some(DefenseType::DodgeRight)
        );
        // Nothing in range
        assert_eq!(defense_for_percents(Some(dec!(0.005)), Some(dec!(0.005))), None);
    }

    #[test]
    fn test_dodge_tie_break_is_dodge_left() {
        // Both dodge ranges match simultaneously; DodgeLeft must win.
        // Deliberate, not incidental - do not "fix" to random.
        assert_eq!(
            defense_for_percents(Some(dec!(0.10)), Some(dec!(0.10))),
            Some(DefenseType::DodgeLeft)
        );
    }

    #[test]
    fn test_defense_requires_both_percents() {
        assert_eq!(defense_for_percents(None, Some(dec!(0.50))), None);
        assert_eq!(defense_for_percents(Some(dec!(0.50)), None), None);
    }

    #[test]
    fn test_resolve_priority_hand_breaks_two_way_attacks() {
        let snapshot = VolumeSnapshot {
            binance: volumes(Some(dec!(10)), dec!(100)),
            coinbase: volumes(Some(dec!(90)), dec!(100)),
            hero_defending: false,
        };

        assert_eq!(
            resolve(&snapshot, Side::Buy, false, Hand::Right),
            Directive::Attack {
                hand: Hand::Right,
                punch: PunchType::Uppercut
            }
        );
        assert_eq!(
            resolve(&snapshot, Side::Buy, false, Hand::Left),
            Directive::Attack {
                hand: Hand::Left,
                punch: PunchType::Jab
            }
        );
    }

    #[test]
    fn test_resolve_single_hand_ignores_priority() {
        let snapshot = VolumeSnapshot {
            binance: volumes(None, dec!(100)),
            coinbase: volumes(Some(dec!(30)), dec!(100)),
            hero_defending: false,
        };

        assert_eq!(
            resolve(&snapshot, Side::Buy, false, Hand::Left),
            Directive::Attack {
                hand: Hand::Right,
                punch: PunchType::Body
            }
        );
    }

    #[test]
    fn test_resolve_defending_yields_defense_or_idle() {
        let snapshot = VolumeSnapshot {
            binance: volumes(Some(dec!(70)), dec!(100)),
            coinbase: volumes(Some(dec!(10)), dec!(100)),
            hero_defending: true,
        };
        assert_eq!(
            resolve(&snapshot, Side::Buy, true, Hand::Right),
            Directive::Defend {
                defense: DefenseType::HeadBlock
            }
        );

        let empty = VolumeSnapshot::default();
        assert_eq!(resolve(&empty, Side::Buy, true, Hand::Right), Directive::Idle);
        assert_eq!(resolve(&empty, Side::Buy, false, Hand::Right), Directive::Idle);
    }
}
