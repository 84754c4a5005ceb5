//! Arena: one owning task per fighter
//!
//! Each fighter's pipeline (resolver -> state machine -> hit resolution) runs
//! on its own task. The tasks never touch each other's state; a landed hit or
//! a KO boundary crosses over as a [`FighterEvent`] message, so every piece of
//! fighter state has exactly one writer.
//!
//! A task wakes up for three reasons: a new volume snapshot arrived, the
//! opponent sent an event, or one of its machine's deadlines passed. Expired
//! deadlines are always fired before the new directive is processed, which
//! gives the happens-before edges the engine relies on (deferred damage before
//! the next directive, impact before the same attack's completion).

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::common::types::{Side, VolumeSnapshot};
use crate::config::types::FightConfig;

use super::clips::{clip_for, AnimationTag, Playback};
use super::directive;
use super::fighter::{FighterEvent, FighterMachine, FighterStateKind};
use super::types::{FighterId, Hand};

/// Buffer for cross-fighter event messages
const EVENT_CHANNEL_SIZE: usize = 64;

/// Read-only view of one fighter, published for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub fighter: FighterId,
    pub state: FighterStateKind,
    /// Clip currently displayed
    pub animation: AnimationTag,
    pub frame_count: u32,
    /// Loop (idle) vs play-once semantics
    pub looped: bool,
    /// Damage bar value, 0..=cap
    pub damage_points: u32,
}

/// Which volume side drives a fighter's resolver
fn volume_channel(fighter: FighterId) -> Side {
    match fighter {
        FighterId::Hero => Side::Buy,
        FighterId::Villain => Side::Sell,
    }
}

/// Combat mode for a fighter given the shared snapshot; the villain always
/// holds the inverse of the hero's mode
fn is_defending(fighter: FighterId, snapshot: &VolumeSnapshot) -> bool {
    match fighter {
        FighterId::Hero => snapshot.hero_defending,
        FighterId::Villain => !snapshot.hero_defending,
    }
}

fn snapshot_of(machine: &FighterMachine) -> FighterSnapshot {
    let animation = machine.state().animation();
    let clip = clip_for(animation);
    FighterSnapshot {
        fighter: machine.id(),
        state: machine.state().kind(),
        animation,
        frame_count: clip.frame_count,
        looped: clip.playback == Playback::Loop,
        damage_points: machine.damage_points(),
    }
}

/// Handle to the running match: fighter snapshot streams plus shutdown
pub struct Arena {
    hero: watch::Receiver<FighterSnapshot>,
    villain: watch::Receiver<FighterSnapshot>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Arena {
    /// Spawn both fighter tasks against a stream of volume snapshots
    pub fn spawn(rules: FightConfig, volumes: watch::Receiver<VolumeSnapshot>) -> Self {
        let (to_hero_tx, to_hero_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (to_villain_tx, to_villain_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let hero_machine = FighterMachine::new(FighterId::Hero, rules.clone());
        let villain_machine = FighterMachine::new(FighterId::Villain, rules.clone());

        let (hero_tx, hero) = watch::channel(snapshot_of(&hero_machine));
        let (villain_tx, villain) = watch::channel(snapshot_of(&villain_machine));

        let priority_hand = rules.priority_hand;
        let tasks = vec![
            tokio::spawn(
                FighterTask {
                    machine: hero_machine,
                    volumes: volumes.clone(),
                    inbox: to_hero_rx,
                    outbox: to_villain_tx,
                    publish: hero_tx,
                    shutdown: shutdown_rx.clone(),
                    priority_hand,
                }
                .run(),
            ),
            tokio::spawn(
                FighterTask {
                    machine: villain_machine,
                    volumes,
                    inbox: to_villain_rx,
                    outbox: to_hero_tx,
                    publish: villain_tx,
                    shutdown: shutdown_rx,
                    priority_hand,
                }
                .run(),
            ),
        ];

        Self {
            hero,
            villain,
            shutdown: shutdown_tx,
            tasks,
        }
    }

    /// Snapshot stream for the hero
    pub fn hero_snapshots(&self) -> watch::Receiver<FighterSnapshot> {
        self.hero.clone()
    }

    /// Snapshot stream for the villain
    pub fn villain_snapshots(&self) -> watch::Receiver<FighterSnapshot> {
        self.villain.clone()
    }

    /// Stop both fighter tasks and wait for them to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

struct FighterTask {
    machine: FighterMachine,
    volumes: watch::Receiver<VolumeSnapshot>,
    inbox: mpsc::Receiver<FighterEvent>,
    outbox: mpsc::Sender<FighterEvent>,
    publish: watch::Sender<FighterSnapshot>,
    shutdown: watch::Receiver<bool>,
    priority_hand: Hand,
}

impl FighterTask {
    async fn run(mut self) {
        let fighter = self.machine.id();
        info!(%fighter, "fighter task started");

        loop {
            self.publish_snapshot();
            let deadline = self.machine.next_deadline();

            tokio::select! {
                changed = self.volumes.changed() => {
                    if changed.is_err() {
                        // Feed hub is gone; nothing left to drive us
                        break;
                    }
                    let snapshot = *self.volumes.borrow_and_update();
                    let now = Instant::now();
                    // Fire expired timers before the fresh directive so
                    // deferred damage lands first
                    let events = self.machine.advance(now);
                    self.dispatch(events).await;

                    let defending = is_defending(fighter, &snapshot);
                    let directive = directive::resolve(
                        &snapshot,
                        volume_channel(fighter),
                        defending,
                        self.priority_hand,
                    );
                    self.machine.handle_directive(directive, defending, now);
                }
                event = self.inbox.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event, Instant::now()).await;
                }
                _ = wait_until(deadline) => {
                    let events = self.machine.advance(Instant::now());
                    self.dispatch(events).await;
                }
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.publish_snapshot();
        info!(%fighter, "fighter task stopped");
    }

    async fn handle_event(&mut self, event: FighterEvent, now: Instant) {
        match event {
            FighterEvent::HitLanded { punch, hand } => {
                let events = self.machine.receive_hit(punch, hand, now);
                self.dispatch(events).await;
            }
            FighterEvent::KoStarted => self.machine.set_opponent_ko(true),
            FighterEvent::KoEnded => self.machine.set_opponent_ko(false),
        }
    }

    async fn dispatch(&self, events: Vec<FighterEvent>) {
        for event in events {
            if self.outbox.send(event).await.is_err() {
                debug!(fighter = %self.machine.id(), "opponent task gone; dropping event");
            }
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = snapshot_of(&self.machine);
        self.publish.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
