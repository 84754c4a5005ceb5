//! End-to-end match scenarios against the full arena
//!
//! These tests drive both fighter tasks through the same watch channel the
//! feed hub publishes on, with tokio's clock paused so every animation and
//! cooldown boundary is exact.

mod common;

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use btc_punchup::common::types::VolumeSnapshot;
use btc_punchup::config::types::FightConfig;
use btc_punchup::engine::{
    AnimationTag, Arena, DefenseType, FighterSnapshot, FighterStateKind, Hand, PunchType,
};
use common::{duel, hero_defense, hero_offense};
use rust_decimal_macros::dec;

struct Match {
    volumes: watch::Sender<VolumeSnapshot>,
    arena: Arena,
    hero: watch::Receiver<FighterSnapshot>,
    villain: watch::Receiver<FighterSnapshot>,
}

fn start_match(rules: FightConfig) -> Match {
    let (volumes, volumes_rx) = watch::channel(VolumeSnapshot::default());
    let arena = Arena::spawn(rules, volumes_rx);
    let hero = arena.hero_snapshots();
    let villain = arena.villain_snapshots();
    Match {
        volumes,
        arena,
        hero,
        villain,
    }
}

#[test_log::test(tokio::test(start_paused = true))]
async fn scenario_jab_through_wrong_block_lands_deferred() {
    // Hero jabs with the left hand (Binance buy at 10%); the villain holds a
    // head block (Coinbase sell at 70%), which does not counter a jab.
    let m = start_match(FightConfig::default());

    m.volumes.send_replace(duel(dec!(10), dec!(0), dec!(5), dec!(70)));
    sleep(Duration::from_millis(10)).await;

    assert_eq!(
        m.hero.borrow().animation,
        AnimationTag::Punch {
            punch: PunchType::Jab,
            hand: Hand::Left
        }
    );
    assert_eq!(
        m.villain.borrow().animation,
        AnimationTag::Defense {
            defense: DefenseType::HeadBlock
        }
    );

    // Impact fires at 80ms; the villain is defending with the wrong type, so
    // the damage is deferred - no points yet, defense clip uninterrupted
    sleep(Duration::from_millis(100)).await;
    assert_eq!(m.villain.borrow().state, FighterStateKind::Defending);
    assert_eq!(m.villain.borrow().damage_points, 0);

    // Defense completes at 240ms: the jab lands, damage += 1, and the
    // villain goes to Damaged - never straight to Idle
    sleep(Duration::from_millis(150)).await;
    assert_eq!(m.villain.borrow().state, FighterStateKind::Damaged);
    assert_eq!(m.villain.borrow().damage_points, 1);

    // The reaction clip plays out and only then does the villain idle,
    // with the damage bar still showing the point
    sleep(Duration::from_millis(300)).await;
    assert_eq!(m.villain.borrow().state, FighterStateKind::Idle);
    assert_eq!(m.villain.borrow().damage_points, 1);

    m.arena.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_correct_defense_nullifies_hit() {
    // Hero throws a left hook (Binance buy at 50%); the villain's body block
    // (Coinbase sell at 30%) is exactly the counter for hooks.
    let m = start_match(FightConfig::default());

    m.volumes.send_replace(duel(dec!(50), dec!(0), dec!(0.5), dec!(30)));
    sleep(Duration::from_millis(10)).await;

    assert_eq!(
        m.hero.borrow().animation,
        AnimationTag::Punch {
            punch: PunchType::Hook,
            hand: Hand::Left
        }
    );
    assert_eq!(
        m.villain.borrow().animation,
        AnimationTag::Defense {
            defense: DefenseType::BodyBlock
        }
    );

    // Through impact and past both clips: no damage, no reaction
    sleep(Duration::from_millis(600)).await;
    assert_eq!(m.villain.borrow().damage_points, 0);
    assert_ne!(m.villain.borrow().state, FighterStateKind::Damaged);

    m.arena.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_dodge_flicker_pinned_by_switch_cooldown() {
    // The resolver alternates between DodgeLeft and DodgeRight every tick;
    // the displayed defense must stay DodgeLeft until its 1s switch cooldown
    // has run.
    let m = start_match(FightConfig::default());

    let dodge_left = hero_defense(dec!(10), dec!(0.5));
    let dodge_right = hero_defense(dec!(0.5), dec!(10));

    for step in 0..10u64 {
        let snapshot = if step % 2 == 0 { dodge_left } else { dodge_right };
        m.volumes.send_replace(snapshot);
        sleep(Duration::from_millis(120)).await;

        let shown = m.hero.borrow().animation;
        assert_ne!(
            shown,
            AnimationTag::Defense {
                defense: DefenseType::DodgeRight
            },
            "DodgeRight displayed at step {step} while DodgeLeft cooldown active"
        );
    }

    // Stop requesting DodgeLeft: once the cooldown from its last adoption
    // expires, DodgeRight finally shows
    let mut dodged_right = false;
    for _ in 0..30u64 {
        m.volumes.send_replace(dodge_right);
        sleep(Duration::from_millis(120)).await;
        if m.hero.borrow().animation
            == (AnimationTag::Defense {
                defense: DefenseType::DodgeRight,
            })
        {
            dodged_right = true;
            break;
        }
    }
    assert!(dodged_right, "DodgeRight never displayed after cooldown expiry");

    m.arena.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_ko_freezes_opponent_until_rise_completes() {
    // A damage cap of 5 makes a single uppercut (8 points) an instant KO
    let rules = FightConfig {
        max_damage_points: 5,
        ..FightConfig::default()
    };
    let m = start_match(rules);

    // Hero uppercuts (Binance buy at 90%); villain has no defense in range
    m.volumes
        .send_replace(duel(dec!(90), dec!(0), dec!(0.5), dec!(0.5)));
    sleep(Duration::from_millis(10)).await;
    assert_eq!(
        m.hero.borrow().animation,
        AnimationTag::Punch {
            punch: PunchType::Uppercut,
            hand: Hand::Left
        }
    );

    // Impact at 160ms: points clamp to the cap and KO-Fall starts
    // immediately, bypassing the Damaged state
    sleep(Duration::from_millis(160)).await;
    assert_eq!(m.villain.borrow().state, FighterStateKind::KnockedOut);
    assert_eq!(m.villain.borrow().damage_points, 5);

    // The hero's own punch is allowed to finish its clip
    assert_eq!(m.hero.borrow().state, FighterStateKind::Punching);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(m.hero.borrow().state, FighterStateKind::Idle);

    // While any KO phase runs, hero directives resolve to nothing: a
    // jab-range snapshot leaves the hero idle
    m.volumes
        .send_replace(duel(dec!(10), dec!(0), dec!(0.5), dec!(0.5)));
    sleep(Duration::from_millis(50)).await;
    assert_eq!(m.hero.borrow().state, FighterStateKind::Idle);
    assert_eq!(m.villain.borrow().state, FighterStateKind::KnockedOut);

    // Fall (400ms) + knocked down (5s) + rise (4.6s) complete on the clock;
    // damage resets to zero with the return to idle
    sleep(Duration::from_millis(10_100)).await;
    assert_eq!(m.villain.borrow().state, FighterStateKind::Idle);
    assert_eq!(m.villain.borrow().damage_points, 0);

    // With the KO over, the hero fights again
    m.volumes
        .send_replace(duel(dec!(10), dec!(0), dec!(0.5), dec!(0.5)));
    sleep(Duration::from_millis(10)).await;
    assert_eq!(m.hero.borrow().state, FighterStateKind::Punching);

    m.arena.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_punch_cooldown_suppresses_second_jab() {
    // Two jab directives 500ms apart: the second is suppressed by the 1s jab
    // cooldown; a third after the cooldown is accepted.
    let m = start_match(FightConfig::default());
    let jab = hero_offense(dec!(10), dec!(0));

    m.volumes.send_replace(jab);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(m.hero.borrow().state, FighterStateKind::Punching);

    // Clip done at 240ms; at 500ms the next jab directive arrives on cooldown
    sleep(Duration::from_millis(490)).await;
    m.volumes.send_replace(jab);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(m.hero.borrow().state, FighterStateKind::Idle);

    // Past the 1s cooldown the jab goes through
    sleep(Duration::from_millis(510)).await;
    m.volumes.send_replace(jab);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(m.hero.borrow().state, FighterStateKind::Punching);

    m.arena.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_priority_hand_resolves_two_way_attack() {
    // Both hands eligible in the same tick: the configured priority hand
    // (right by default) executes, using the Coinbase-derived punch
    let m = start_match(FightConfig::default());

    m.volumes.send_replace(hero_offense(dec!(10), dec!(90)));
    sleep(Duration::from_millis(10)).await;

    assert_eq!(
        m.hero.borrow().animation,
        AnimationTag::Punch {
            punch: PunchType::Uppercut,
            hand: Hand::Right
        }
    );

    m.arena.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn scenario_erratic_input_never_interrupts_clips() {
    // Glitch-freedom under fast input: while a punch clip is in flight,
    // wildly different directives on every tick change nothing until the
    // clip completes.
    let m = start_match(FightConfig::default());

    m.volumes.send_replace(hero_offense(dec!(70), dec!(0)));
    sleep(Duration::from_millis(10)).await;
    let started = m.hero.borrow().animation;
    assert_eq!(
        started,
        AnimationTag::Punch {
            punch: PunchType::Cross,
            hand: Hand::Left
        }
    );

    for buy in [dec!(90), dec!(30), dec!(50), dec!(10)] {
        m.volumes.send_replace(hero_offense(buy, dec!(80)));
        sleep(Duration::from_millis(40)).await;
        let now_showing = m.hero.borrow().animation;
        if m.hero.borrow().state == FighterStateKind::Punching {
            assert_eq!(now_showing, started, "clip changed mid-flight");
        }
    }

    m.arena.shutdown().await;
}
