//! Lesson-completion reward workflow
//!
//! `LessonCompleted -> PointsApplied -> LevelCheck -> Emit`. Each step only
//! starts once the previous one produced its value, so the level-up is always
//! queued after the lesson reward.

use gamegreeneco_core::{EcoPoints, Level, LESSON_COMPLETION_POINTS};

/// Fallback title when the lesson title cannot be resolved
pub const LESSON_FALLBACK_TITLE: &str = "Lesson";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStep {
    /// Lesson marked complete; its reward is due
    LessonCompleted,
    /// Lesson reward queued; waiting for the profile points that include it
    PointsApplied,
    /// Points known; compare levels before and after the award
    LevelCheck { points: EcoPoints },
    /// Level boundary crossed; level-up due
    Emit { from: Level, to: Level },
    Done,
}

/// Levels before and after the lesson award, when a boundary was crossed
pub fn level_crossing(points: EcoPoints) -> Option<(Level, Level)> {
    let before = points.before_award(LESSON_COMPLETION_POINTS).level();
    let after = points.level();
    (after > before).then_some((before, after))
}

/// Title of the level-up reward that follows a lesson
pub fn level_up_title(level: Level) -> String {
    format!("Level {}", level)
}

impl CompletionStep {
    /// Step after `LevelCheck`
    pub fn after_level_check(points: EcoPoints) -> Self {
        match level_crossing(points) {
            Some((from, to)) => CompletionStep::Emit { from, to },
            None => CompletionStep::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, CompletionStep::Done)
    }
}
