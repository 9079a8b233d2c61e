//! Ports to the services the app does not own
//!
//! `EcoStore` is the managed backend (auth-scoped tables, procedures and
//! file storage). `SnapshotStore` is client-local persistent storage for the
//! last-seen profile snapshot. Both are injected so the engine never touches
//! an ambient singleton.

use crate::{
    Lesson, LessonId, LessonProgress, LessonProgressUpdate, LeaderboardEntry, LeaderboardScope,
    Mission, MissionId, MissionSubmission, OrganizationStanding, Profile, ProfileSnapshot,
    ProfileUpdate, RegionLevel, Result, SubmissionId, SubmissionReview, SubmissionUpsert,
    UserBadge, UserId,
};
use async_trait::async_trait;
use std::time::Duration;

/// Read/write access to the backend tables, procedures and storage
#[async_trait]
pub trait EcoStore: Send + Sync {
    /// Profile aggregate for a user, if the row exists
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>>;

    /// Apply a partial update to the user's own profile
    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate) -> Result<Profile>;

    /// Published lessons in display order
    async fn list_lessons(&self) -> Result<Vec<Lesson>>;

    /// Title of a lesson, `None` when the lesson does not exist
    async fn lesson_title(&self, lesson_id: &LessonId) -> Result<Option<String>>;

    /// All lesson progress rows of a user
    async fn list_lesson_progress(&self, user_id: &UserId) -> Result<Vec<LessonProgress>>;

    /// Upsert progress keyed by (user, lesson) and return the stored row
    async fn upsert_lesson_progress(&self, update: &LessonProgressUpdate) -> Result<LessonProgress>;

    /// Active missions, optionally limited to one lesson
    async fn list_missions(&self, lesson_id: Option<&LessonId>) -> Result<Vec<Mission>>;

    /// Title of a mission, `None` when the mission does not exist
    async fn mission_title(&self, mission_id: &MissionId) -> Result<Option<String>>;

    /// Submissions of a user with their mission title/points embedded
    async fn list_submissions(&self, user_id: &UserId) -> Result<Vec<MissionSubmission>>;

    /// Upsert a submission keyed by (user, mission) and return the stored row
    async fn upsert_submission(&self, upsert: &SubmissionUpsert) -> Result<MissionSubmission>;

    /// Record an organization review of a submission
    async fn review_submission(&self, submission_id: &SubmissionId, review: &SubmissionReview) -> Result<()>;

    /// Ranked-by-points students visible to the caller within `scope`
    async fn student_leaderboard(&self, scope: LeaderboardScope) -> Result<Vec<LeaderboardEntry>>;

    /// Organizations in one region, most students first then most points
    async fn organization_leaderboard(&self, level: RegionLevel, region: &str) -> Result<Vec<OrganizationStanding>>;

    /// Students belonging to an organization
    async fn organization_students(&self, organization_name: &str) -> Result<Vec<Profile>>;

    /// Badges earned by a user, newest first
    async fn user_badges(&self, user_id: &UserId) -> Result<Vec<UserBadge>>;

    /// Time-limited URL for a stored proof video
    async fn sign_proof_url(&self, key: &str, ttl: Duration) -> Result<String>;
}

/// Client-local storage of the last-seen snapshot per user
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_snapshot(&self, user_id: &UserId) -> Result<Option<ProfileSnapshot>>;

    async fn save_snapshot(&self, user_id: &UserId, snapshot: &ProfileSnapshot) -> Result<()>;
}
