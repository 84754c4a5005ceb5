//! Animation clip descriptors
//!
//! The presentation layer owns the actual frame images; the engine only needs
//! to know how many frames a clip has (durations and the impact-check offset
//! derive from it) and whether it loops. Keeping this as one data-driven table
//! keeps the dispatch trivially testable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{DefenseType, Hand, KoPhase, PunchType, ReactionType};

/// Identifier of the clip a fighter is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationTag {
    Idle,
    Punch { punch: PunchType, hand: Hand },
    Defense { defense: DefenseType },
    Reaction { reaction: ReactionType },
    Ko { phase: KoPhase },
}

/// Play-once vs looping semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Playback {
    Loop,
    Once,
}

/// Clip descriptor: frame count plus playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSpec {
    pub frame_count: u32,
    pub playback: Playback,
}

impl ClipSpec {
    /// Wall-clock duration of one pass through the clip
    pub fn duration(&self, frame_duration: Duration) -> Duration {
        frame_duration * self.frame_count
    }
}

/// Total mapping from animation tag to clip descriptor
pub fn clip_for(tag: AnimationTag) -> ClipSpec {
    let (frame_count, playback) = match tag {
        AnimationTag::Idle => (6, Playback::Loop),
        AnimationTag::Punch { punch, .. } => match punch {
            PunchType::Jab | PunchType::Body | PunchType::Hook | PunchType::Cross => {
                (3, Playback::Once)
            }
            PunchType::Uppercut => (4, Playback::Once),
        },
        AnimationTag::Defense { .. } => (3, Playback::Once),
        AnimationTag::Reaction { reaction } => match reaction {
            ReactionType::Center => (4, Playback::Once),
            _ => (3, Playback::Once),
        },
        // Single held frame per KO phase; display time is duration-driven
        AnimationTag::Ko { .. } => (1, Playback::Once),
    };
    ClipSpec {
        frame_count,
        playback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_table_is_total_and_sane() {
        let mut tags = vec![AnimationTag::Idle];
        for punch in PunchType::ALL {
            for hand in [Hand::Left, Hand::Right] {
                tags.push(AnimationTag::Punch { punch, hand });
            }
        }
        for defense in DefenseType::ALL {
            tags.push(AnimationTag::Defense { defense });
        }
        for reaction in [
            ReactionType::SmallHead(Hand::Left),
            ReactionType::Head(Hand::Right),
            ReactionType::Body(Hand::Left),
            ReactionType::Center,
        ] {
            tags.push(AnimationTag::Reaction { reaction });
        }
        for phase in [KoPhase::Fall, KoPhase::KnockedDown, KoPhase::Rise] {
            tags.push(AnimationTag::Ko { phase });
        }

        for tag in tags {
            let clip = clip_for(tag);
            assert!(clip.frame_count >= 1, "{tag:?} has no frames");
            match tag {
                AnimationTag::Idle => assert_eq!(clip.playback, Playback::Loop),
                _ => assert_eq!(clip.playback, Playback::Once),
            }
        }
    }

    #[test]
    fn test_uppercut_and_center_reaction_are_longer() {
        let uppercut = clip_for(AnimationTag::Punch {
            punch: PunchType::Uppercut,
            hand: Hand::Right,
        });
        let jab = clip_for(AnimationTag::Punch {
            punch: PunchType::Jab,
            hand: Hand::Right,
        });
        assert!(uppercut.frame_count > jab.frame_count);

        let center = clip_for(AnimationTag::Reaction {
            reaction: ReactionType::Center,
        });
        assert_eq!(center.frame_count, 4);
    }

    #[test]
    fn test_clip_duration_scales_with_frame_count() {
        let clip = ClipSpec {
            frame_count: 3,
            playback: Playback::Once,
        };
        assert_eq!(
            clip.duration(Duration::from_millis(80)),
            Duration::from_millis(240)
        );
    }
}
