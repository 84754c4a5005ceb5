//! Cooldown tracking
//!
//! Damps directive flicker: each punch type has a per-type cooldown stamped
//! at launch, and an adopted defense resists switching to a different type
//! until its switch cooldown elapses.

use std::collections::HashMap;

use tokio::time::Instant;

use crate::config::types::FightConfig;

use super::types::{DefenseType, PunchType};

/// Per-fighter cooldown state
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    rules: FightConfig,
    /// Last-used timestamp per punch type; only punches actually thrown have
    /// an entry
    last_punch: HashMap<PunchType, Instant>,
    /// Currently adopted defense type, sticky across clip completions while
    /// the fighter stays in defense mode
    last_defense: Option<DefenseType>,
    last_defense_switch: Option<Instant>,
    last_defense_completed: Option<Instant>,
}

impl CooldownTracker {
    pub fn new(rules: FightConfig) -> Self {
        Self {
            rules,
            last_punch: HashMap::new(),
            last_defense: None,
            last_defense_switch: None,
            last_defense_completed: None,
        }
    }

    /// Stamp a punch as used; called at launch, not at completion
    pub fn record_punch(&mut self, punch: PunchType, now: Instant) {
        self.last_punch.insert(punch, now);
    }

    /// Whether this punch type is still cooling down
    pub fn is_punch_on_cooldown(&self, punch: PunchType, now: Instant) -> bool {
        match self.last_punch.get(&punch) {
            Some(last) => now.duration_since(*last) < self.rules.punch_cooldown(punch),
            None => false,
        }
    }

    /// Whether every previously thrown punch type is currently cooling down.
    ///
    /// Untried types do not count against "all on cooldown"; a fighter that
    /// has never thrown anything is never considered exhausted.
    pub fn all_punches_on_cooldown(&self, now: Instant) -> bool {
        if self.last_punch.is_empty() {
            return false;
        }
        self.last_punch
            .keys()
            .all(|punch| self.is_punch_on_cooldown(*punch, now))
    }

    /// Currently adopted defense type, if any
    pub fn current_defense(&self) -> Option<DefenseType> {
        self.last_defense
    }

    /// Apply the switch cooldown to a requested defense type.
    ///
    /// Switching to a *different* type is rejected while the current type's
    /// cooldown runs, in which case the previous type continues to display.
    /// Adopting the same type again, or any type when none is active, is
    /// never blocked. The accepted type is stamped as the new switch point.
    pub fn resolve_defense_switch(&mut self, requested: DefenseType, now: Instant) -> DefenseType {
        if let (Some(current), Some(switched)) = (self.last_defense, self.last_defense_switch) {
            if requested != current
                && now.duration_since(switched) < self.rules.defense_cooldown(current)
            {
                return current;
            }
        }

        self.last_defense = Some(requested);
        self.last_defense_switch = Some(now);
        requested
    }

    /// Stamp a defense animation as fully completed
    pub fn record_defense_completed(&mut self, now: Instant) {
        self.last_defense_completed = Some(now);
    }

    /// Whether the minimum idle interval since the last defense completion
    /// has elapsed, allowing a new defense to start
    pub fn may_start_defense(&self, now: Instant) -> bool {
        match self.last_defense_completed {
            Some(completed) => {
                now.duration_since(completed) >= self.rules.min_idle_after_defense()
            }
            None => true,
        }
    }

    /// Clear defense bookkeeping; called when the fighter leaves defense mode
    /// entirely (not on clip completion, so the switch cooldown survives
    /// re-entry while the mode holds)
    pub fn clear_defense_mode(&mut self) {
        self.last_defense = None;
        self.last_defense_switch = None;
        self.last_defense_completed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tracker() -> CooldownTracker {
        CooldownTracker::new(FightConfig::default())
    }

    #[test]
    fn test_punch_cooldown_expires_after_configured_duration() {
        let mut cooldowns = tracker();
        let start = Instant::now();

        assert!(!cooldowns.is_punch_on_cooldown(PunchType::Jab, start));
        cooldowns.record_punch(PunchType::Jab, start);

        assert!(cooldowns.is_punch_on_cooldown(PunchType::Jab, start + Duration::from_millis(500)));
        assert!(cooldowns.is_punch_on_cooldown(PunchType::Jab, start + Duration::from_millis(999)));
        assert!(!cooldowns.is_punch_on_cooldown(PunchType::Jab, start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_all_on_cooldown_ignores_untried_punches() {
        let mut cooldowns = tracker();
        let start = Instant::now();

        // Nothing thrown yet
        assert!(!cooldowns.all_punches_on_cooldown(start));

        // One punch thrown and cooling: "all thrown punches" are on cooldown
        // even though four types were never tried
        cooldowns.record_punch(PunchType::Hook, start);
        assert!(cooldowns.all_punches_on_cooldown(start + Duration::from_millis(100)));
        assert!(!cooldowns.all_punches_on_cooldown(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_defense_switch_blocked_during_cooldown() {
        let mut cooldowns = tracker();
        let start = Instant::now();

        assert_eq!(
            cooldowns.resolve_defense_switch(DefenseType::DodgeLeft, start),
            DefenseType::DodgeLeft
        );
        // A different type inside the window keeps the previous type
        assert_eq!(
            cooldowns
                .resolve_defense_switch(DefenseType::DodgeRight, start + Duration::from_millis(400)),
            DefenseType::DodgeLeft
        );
        // Same type is never blocked and re-stamps the switch point
        assert_eq!(
            cooldowns
                .resolve_defense_switch(DefenseType::DodgeLeft, start + Duration::from_millis(500)),
            DefenseType::DodgeLeft
        );
        // 1000ms after the re-stamp the switch is allowed
        assert_eq!(
            cooldowns
                .resolve_defense_switch(DefenseType::DodgeRight, start + Duration::from_millis(1500)),
            DefenseType::DodgeRight
        );
    }

    #[test]
    fn test_min_idle_after_defense_completion() {
        let mut cooldowns = tracker();
        let start = Instant::now();

        assert!(cooldowns.may_start_defense(start));
        cooldowns.record_defense_completed(start);
        assert!(!cooldowns.may_start_defense(start + Duration::from_millis(50)));
        assert!(cooldowns.may_start_defense(start + Duration::from_millis(100)));
    }

    #[test]
    fn test_clear_defense_mode_resets_switch_state() {
        let mut cooldowns = tracker();
        let start = Instant::now();

        cooldowns.resolve_defense_switch(DefenseType::HeadBlock, start);
        cooldowns.clear_defense_mode();

        // A fresh adoption right away is not blocked by the stale cooldown
        assert_eq!(
            cooldowns
                .resolve_defense_switch(DefenseType::BodyBlock, start + Duration::from_millis(10)),
            DefenseType::BodyBlock
        );
    }
}
