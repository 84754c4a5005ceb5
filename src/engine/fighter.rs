//! Fighter state machine
//!
//! Owns one fighter's animation state and arbitrates whether a directive may
//! start an animation now. All timing is deadline-based: the machine stores
//! the instants at which its current animation completes, its outgoing attack
//! checks for impact, and its damage reaction times out. Starting a new
//! animation overwrites those deadlines, which implicitly cancels the timers
//! of whatever was in flight. The owning task asks for [`next_deadline`] and
//! calls [`advance`] when it passes.
//!
//! Cross-fighter effects never mutate this machine directly; they arrive as
//! [`FighterEvent`] messages delivered by the arena, keeping a single writer
//! per fighter.
//!
//! [`next_deadline`]: FighterMachine::next_deadline
//! [`advance`]: FighterMachine::advance

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::types::FightConfig;

use super::clips::{clip_for, AnimationTag};
use super::cooldown::CooldownTracker;
use super::damage::{reaction_for, required_defense_for, DamageState, DeferredDamage};
use super::types::{DefenseType, Directive, FighterId, Hand, KoPhase, PunchType, ReactionType};

/// A defense clip never clears faster than this many frames, so a one-frame
/// directive flicker cannot produce a split-second dodge
const MIN_DEFENSE_FRAMES: u32 = 3;

/// Mutually exclusive fighter states; exactly one holds at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FighterState {
    Idle,
    Punching {
        punch: PunchType,
        hand: Hand,
        started: Instant,
    },
    Defending {
        defense: DefenseType,
        started: Instant,
    },
    Damaged {
        reaction: ReactionType,
        started: Instant,
    },
    KnockedOut {
        phase: KoPhase,
        entered: Instant,
    },
}

/// State variant without payload, for snapshots and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterStateKind {
    Idle,
    Punching,
    Defending,
    Damaged,
    KnockedOut,
}

impl FighterState {
    pub fn kind(&self) -> FighterStateKind {
        match self {
            FighterState::Idle => FighterStateKind::Idle,
            FighterState::Punching { .. } => FighterStateKind::Punching,
            FighterState::Defending { .. } => FighterStateKind::Defending,
            FighterState::Damaged { .. } => FighterStateKind::Damaged,
            FighterState::KnockedOut { .. } => FighterStateKind::KnockedOut,
        }
    }

    /// The clip this state displays
    pub fn animation(&self) -> AnimationTag {
        match *self {
            FighterState::Idle => AnimationTag::Idle,
            FighterState::Punching { punch, hand, .. } => AnimationTag::Punch { punch, hand },
            FighterState::Defending { defense, .. } => AnimationTag::Defense { defense },
            FighterState::Damaged { reaction, .. } => AnimationTag::Reaction { reaction },
            FighterState::KnockedOut { phase, .. } => AnimationTag::Ko { phase },
        }
    }
}

/// Cross-fighter effect emitted by one machine for delivery to the other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FighterEvent {
    /// This fighter's attack reached its impact frame
    HitLanded { punch: PunchType, hand: Hand },
    /// This fighter entered KO-Fall; the opponent must stop attacking
    KoStarted,
    /// This fighter finished the KO Rise phase and returned to Idle
    KoEnded,
}

/// Impact check scheduled against an outgoing attack. Fires once, shortly
/// before the attack's last frame; discarded if the attack was superseded.
#[derive(Debug, Clone, Copy)]
struct PendingImpact {
    punch: PunchType,
    hand: Hand,
    at: Instant,
}

/// One fighter's decision/state machine
#[derive(Debug)]
pub struct FighterMachine {
    id: FighterId,
    rules: FightConfig,
    state: FighterState,
    cooldowns: CooldownTracker,
    damage: DamageState,
    /// Opponent is somewhere in its KO sequence; all our directives read Idle
    opponent_ko: bool,
    /// Current animation's completion deadline
    completion_at: Option<Instant>,
    /// Outgoing attack's impact check
    impact: Option<PendingImpact>,
    /// Forces a stuck Damaged state back to Idle
    damage_safety_at: Option<Instant>,
}

impl FighterMachine {
    pub fn new(id: FighterId, rules: FightConfig) -> Self {
        Self {
            id,
            rules: rules.clone(),
            state: FighterState::Idle,
            cooldowns: CooldownTracker::new(rules),
            damage: DamageState::default(),
            opponent_ko: false,
            completion_at: None,
            impact: None,
            damage_safety_at: None,
        }
    }

    pub fn id(&self) -> FighterId {
        self.id
    }

    pub fn state(&self) -> &FighterState {
        &self.state
    }

    pub fn damage_points(&self) -> u32 {
        self.damage.points()
    }

    pub fn opponent_ko(&self) -> bool {
        self.opponent_ko
    }

    /// The next instant at which [`advance`](Self::advance) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.completion_at,
            self.impact.map(|impact| impact.at),
            self.damage_safety_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Feed one resolved directive into the machine.
    ///
    /// `defending` is the fighter's combat mode this tick; leaving defense
    /// mode clears the sticky defense-switch bookkeeping. Directives are
    /// silently dropped whenever the current state refuses them - contention,
    /// not failure.
    pub fn handle_directive(&mut self, directive: Directive, defending: bool, now: Instant) {
        if matches!(
            self.state,
            FighterState::KnockedOut { .. } | FighterState::Damaged { .. }
        ) {
            return;
        }

        if !defending {
            self.cooldowns.clear_defense_mode();
        }

        // A KO'd opponent freezes this fighter's directive processing
        let directive = if self.opponent_ko {
            Directive::Idle
        } else {
            directive
        };

        match directive {
            Directive::Defend { defense } => self.apply_defend(defense, now),
            Directive::Attack { hand, punch } => self.apply_attack(punch, hand, now),
            Directive::Idle => {}
        }
    }

    fn apply_defend(&mut self, requested: DefenseType, now: Instant) {
        match self.state {
            // An in-flight punch or defense clip finishes first; re-entering
            // the same effective type mid-clip must not restart it
            FighterState::Punching { .. } | FighterState::Defending { .. } => return,
            FighterState::Idle => {}
            _ => return,
        }

        if !self.cooldowns.may_start_defense(now) {
            return;
        }

        let effective = self.cooldowns.resolve_defense_switch(requested, now);
        if effective != requested {
            debug!(
                fighter = %self.id,
                requested = ?requested,
                kept = ?effective,
                "defense switch on cooldown"
            );
        }

        self.clear_animation_timers();
        self.state = FighterState::Defending {
            defense: effective,
            started: now,
        };
        self.completion_at = Some(now + self.defense_duration(effective));
        debug!(fighter = %self.id, defense = ?effective, "defense started");
    }

    fn apply_attack(&mut self, punch: PunchType, hand: Hand, now: Instant) {
        match self.state {
            // Defense has priority over resuming attacks; a busy punch clip
            // ignores directives until it completes
            FighterState::Defending { .. } | FighterState::Punching { .. } => return,
            FighterState::Idle => {}
            _ => return,
        }

        if self.cooldowns.is_punch_on_cooldown(punch, now) {
            if self.cooldowns.all_punches_on_cooldown(now) {
                debug!(fighter = %self.id, "all thrown punches cooling down");
            }
            return;
        }

        let clip = clip_for(AnimationTag::Punch { punch, hand });
        self.clear_animation_timers();
        self.state = FighterState::Punching {
            punch,
            hand,
            started: now,
        };
        self.completion_at = Some(now + clip.duration(self.rules.frame_duration()));
        // Hit detection runs once, two frames before the clip ends
        let impact_frames = clip.frame_count.saturating_sub(2);
        self.impact = Some(PendingImpact {
            punch,
            hand,
            at: now + self.rules.frame_duration() * impact_frames,
        });
        // Cooldown is stamped at launch, not completion
        self.cooldowns.record_punch(punch, now);
        debug!(fighter = %self.id, punch = ?punch, hand = ?hand, "punch started");
    }

    /// An opponent attack reached its impact frame against us.
    ///
    /// The outcome depends entirely on our current state: the one correct
    /// defense nullifies the hit, a wrong defense defers it until the defense
    /// clip completes, KO and an in-progress reaction ignore it, and anything
    /// else takes damage immediately.
    pub fn receive_hit(&mut self, punch: PunchType, hand: Hand, now: Instant) -> Vec<FighterEvent> {
        match self.state {
            FighterState::KnockedOut { .. } => return Vec::new(),
            FighterState::Damaged { .. } => return Vec::new(),
            FighterState::Defending { defense, .. } => {
                if defense == required_defense_for(punch, hand) {
                    debug!(fighter = %self.id, punch = ?punch, defense = ?defense, "hit blocked");
                    return Vec::new();
                }
                // Wrong defense: the clip plays out, the damage waits
                self.damage.defer(DeferredDamage {
                    reaction: reaction_for(punch, hand),
                    punch,
                });
                debug!(fighter = %self.id, punch = ?punch, "damage deferred behind defense");
                return Vec::new();
            }
            FighterState::Idle | FighterState::Punching { .. } => {}
        }

        self.apply_damage(punch, reaction_for(punch, hand), now)
    }

    /// Opponent entered or left its KO sequence. An in-flight punch is
    /// allowed to finish; only directive processing is frozen.
    pub fn set_opponent_ko(&mut self, ko: bool) {
        self.opponent_ko = ko;
    }

    /// Fire every deadline that is due at `now`, in chronological order,
    /// returning the cross-fighter events produced.
    pub fn advance(&mut self, now: Instant) -> Vec<FighterEvent> {
        let mut events = Vec::new();

        loop {
            let impact_due = self
                .impact
                .map(|impact| impact.at)
                .filter(|at| *at <= now);
            let completion_due = self.completion_at.filter(|at| *at <= now);
            let safety_due = self.damage_safety_at.filter(|at| *at <= now);

            // Earliest first so ordering guarantees hold (impact strictly
            // before the same attack's completion)
            let next = [
                impact_due.map(|at| (Timer::Impact, at)),
                completion_due.map(|at| (Timer::Completion, at)),
                safety_due.map(|at| (Timer::Safety, at)),
            ]
            .into_iter()
            .flatten()
            .min_by_key(|(_, at)| *at);

            let Some((timer, at)) = next else { break };
            match timer {
                Timer::Impact => self.fire_impact(&mut events),
                Timer::Completion => self.fire_completion(at, &mut events),
                Timer::Safety => self.fire_safety(),
            }
        }

        events
    }

    fn fire_impact(&mut self, events: &mut Vec<FighterEvent>) {
        let Some(pending) = self.impact.take() else {
            return;
        };
        // Discard if the attack this check was scheduled against is gone
        match self.state {
            FighterState::Punching { punch, hand, .. }
                if punch == pending.punch && hand == pending.hand =>
            {
                events.push(FighterEvent::HitLanded {
                    punch: pending.punch,
                    hand: pending.hand,
                });
            }
            _ => {
                debug!(fighter = %self.id, punch = ?pending.punch, "impact check discarded");
            }
        }
    }

    fn fire_completion(&mut self, at: Instant, events: &mut Vec<FighterEvent>) {
        self.completion_at = None;
        match self.state {
            FighterState::Punching { .. } => {
                self.state = FighterState::Idle;
            }
            FighterState::Defending { .. } => {
                self.cooldowns.record_defense_completed(at);
                // Deferred damage applies now, instead of going idle; it
                // happens-before the next directive is processed
                match self.damage.take_pending() {
                    Some(deferred) => {
                        events.extend(self.apply_damage(deferred.punch, deferred.reaction, at));
                    }
                    None => {
                        self.state = FighterState::Idle;
                    }
                }
            }
            FighterState::Damaged { .. } => {
                self.state = FighterState::Idle;
                self.damage_safety_at = None;
            }
            FighterState::KnockedOut { phase, .. } => match phase.next() {
                Some(next_phase) => {
                    self.state = FighterState::KnockedOut {
                        phase: next_phase,
                        entered: at,
                    };
                    self.completion_at = Some(at + self.rules.ko_duration(next_phase));
                    debug!(fighter = %self.id, phase = ?next_phase, "ko phase advanced");
                }
                None => {
                    // Rise finished: only here do damage points reset
                    self.damage.reset();
                    self.state = FighterState::Idle;
                    events.push(FighterEvent::KoEnded);
                    debug!(fighter = %self.id, "ko sequence complete");
                }
            },
            FighterState::Idle => {}
        }
    }

    fn fire_safety(&mut self) {
        self.damage_safety_at = None;
        if matches!(self.state, FighterState::Damaged { .. }) {
            warn!(fighter = %self.id, "damage completion lost; forcing idle");
            self.state = FighterState::Idle;
            self.completion_at = None;
        }
    }

    fn apply_damage(
        &mut self,
        punch: PunchType,
        reaction: ReactionType,
        now: Instant,
    ) -> Vec<FighterEvent> {
        let points = self.rules.damage_points(punch);
        let ko = self.damage.absorb(points, self.rules.max_damage_points);
        debug!(
            fighter = %self.id,
            punch = ?punch,
            points,
            total = self.damage.points(),
            "hit landed"
        );

        if ko {
            self.enter_ko(now);
            vec![FighterEvent::KoStarted]
        } else {
            // Reaction preempts whatever was in flight
            self.clear_animation_timers();
            let clip = clip_for(AnimationTag::Reaction { reaction });
            self.state = FighterState::Damaged {
                reaction,
                started: now,
            };
            self.completion_at = Some(now + clip.duration(self.rules.frame_duration()));
            self.damage_safety_at = Some(now + self.rules.damage_safety_timeout());
            Vec::new()
        }
    }

    fn enter_ko(&mut self, now: Instant) {
        self.clear_animation_timers();
        // KO supersedes any damage still queued behind a defense
        self.damage.discard_pending();
        self.state = FighterState::KnockedOut {
            phase: KoPhase::Fall,
            entered: now,
        };
        self.completion_at = Some(now + self.rules.ko_duration(KoPhase::Fall));
        debug!(fighter = %self.id, "knocked out");
    }

    fn clear_animation_timers(&mut self) {
        self.completion_at = None;
        self.impact = None;
        self.damage_safety_at = None;
    }

    fn defense_duration(&self, defense: DefenseType) -> Duration {
        let clip = clip_for(AnimationTag::Defense { defense });
        self.rules.frame_duration() * clip.frame_count.max(MIN_DEFENSE_FRAMES)
    }
}

#[derive(Debug, Clone, Copy)]
enum Timer {
    Impact,
    Completion,
    Safety,
}
