//! Reward notification models shown to the player

use crate::{Level, RewardId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Points granted for finishing a lesson
pub const LESSON_COMPLETION_POINTS: u32 = 25;

/// What a reward celebrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardKind {
    Lesson,
    Mission,
    LevelUp { from: Level, to: Level },
}

impl RewardKind {
    /// Whether a reward of this kind can carry claimable points
    pub fn grants_points(&self) -> bool {
        matches!(self, RewardKind::Lesson | RewardKind::Mission)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RewardKind::Lesson => "lesson",
            RewardKind::Mission => "mission",
            RewardKind::LevelUp { .. } => "level_up",
        }
    }
}

/// Input for enqueueing a reward (id and claim flag are assigned by the queue)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReward {
    pub kind: RewardKind,
    pub title: String,
    pub points: u32,
}

impl NewReward {
    pub fn lesson(title: impl Into<String>, points: u32) -> Self {
        Self {
            kind: RewardKind::Lesson,
            title: title.into(),
            points,
        }
    }

    pub fn mission(title: impl Into<String>, points: u32) -> Self {
        Self {
            kind: RewardKind::Mission,
            title: title.into(),
            points,
        }
    }

    pub fn level_up(from: Level, to: Level, title: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::LevelUp { from, to },
            title: title.into(),
            points: 0,
        }
    }
}

/// A queued reward notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEvent {
    pub id: RewardId,
    pub kind: RewardKind,
    pub title: String,
    pub points: u32,
    pub claimed: bool,
}

impl RewardEvent {
    pub fn from_new(id: RewardId, reward: NewReward) -> Self {
        Self {
            id,
            kind: reward.kind,
            title: reward.title,
            points: reward.points,
            claimed: false,
        }
    }

    pub fn new_level(&self) -> Option<Level> {
        match self.kind {
            RewardKind::LevelUp { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Lesson/mission rewards with points get a separate claim prompt
    pub fn needs_claim(&self) -> bool {
        self.points > 0 && self.kind.grants_points()
    }
}

/// Timer durations driving reward presentation and delayed emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTimings {
    /// Time a claimed reward stays queued before removal
    pub claim_grace_ms: u64,
    /// Lesson/mission overlay display time
    pub overlay_display_ms: u64,
    /// Exit animation after any auto-dismissing overlay
    pub overlay_exit_ms: u64,
    /// Level-up overlay display time
    pub level_up_display_ms: u64,
    /// Interval between visible level increments
    pub level_step_ms: u64,
    /// Delay between a lesson reward and its level-up reward
    pub level_up_delay_ms: u64,
}

impl RewardTimings {
    pub fn claim_grace(&self) -> Duration {
        Duration::from_millis(self.claim_grace_ms)
    }

    pub fn overlay_display(&self) -> Duration {
        Duration::from_millis(self.overlay_display_ms)
    }

    pub fn overlay_exit(&self) -> Duration {
        Duration::from_millis(self.overlay_exit_ms)
    }

    pub fn level_up_display(&self) -> Duration {
        Duration::from_millis(self.level_up_display_ms)
    }

    pub fn level_step(&self) -> Duration {
        Duration::from_millis(self.level_step_ms)
    }

    pub fn level_up_delay(&self) -> Duration {
        Duration::from_millis(self.level_up_delay_ms)
    }
}

impl Default for RewardTimings {
    fn default() -> Self {
        Self {
            claim_grace_ms: 2_000,
            overlay_display_ms: 3_000,
            overlay_exit_ms: 500,
            level_up_display_ms: 4_000,
            level_step_ms: 300,
            level_up_delay_ms: 3_500,
        }
    }
}
