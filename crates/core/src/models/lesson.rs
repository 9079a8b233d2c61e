//! Lesson and lesson-progress models

use crate::{LessonId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Published lesson from the `lessons` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_published: bool,
}

/// Per-user progress row keyed by (user, lesson)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// Upsert payload for `lesson_progress`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgressUpdate {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
}

impl LessonProgressUpdate {
    /// A lesson counts as completed when flagged or when progress reaches 100%
    pub fn new(
        user_id: UserId,
        lesson_id: LessonId,
        progress_percentage: f64,
        is_completed: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let progress_percentage = progress_percentage.clamp(0.0, 100.0);
        let completed = is_completed || progress_percentage >= 100.0;
        Self {
            user_id,
            lesson_id,
            progress_percentage,
            is_completed: completed,
            completed_at: completed.then_some(now),
            last_accessed_at: now,
        }
    }
}

/// Display status of a lesson for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    pub fn from_progress(progress: Option<&LessonProgress>) -> Self {
        match progress {
            Some(p) if p.is_completed => LessonStatus::Completed,
            Some(p) if p.progress_percentage > 0.0 => LessonStatus::InProgress,
            _ => LessonStatus::NotStarted,
        }
    }
}

/// Lesson joined with the caller's progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonWithProgress {
    pub lesson: Lesson,
    pub progress: Option<LessonProgress>,
    pub status: LessonStatus,
}

impl LessonWithProgress {
    /// Join lessons with progress rows; lessons keep their given order
    pub fn join(lessons: Vec<Lesson>, progress: &[LessonProgress]) -> Vec<Self> {
        lessons
            .into_iter()
            .map(|lesson| {
                let progress = progress.iter().find(|p| p.lesson_id == lesson.id).cloned();
                let status = LessonStatus::from_progress(progress.as_ref());
                LessonWithProgress {
                    lesson,
                    progress,
                    status,
                }
            })
            .collect()
    }
}
