//! Completion-triggered rewards
//!
//! `ProgressTracker` performs the user's own progress writes (lesson
//! progress, mission start and submission) and queues the matching rewards.
//! The write is the operation; rewards are best-effort and a failure while
//! building them is logged, never returned.

pub mod workflow;

pub use workflow::{CompletionStep, LESSON_FALLBACK_TITLE};

use crate::quiz::LessonGate;
use crate::{RewardQueueService, Scheduler};
use chrono::Utc;
use gamegreeneco_core::{
    EcoStore, LessonId, LessonMission, LessonProgress, LessonProgressUpdate, LessonWithProgress,
    MissionId, MissionStats, MissionSubmission, NewReward, Result, RewardTimings, SubmissionStatus,
    SubmissionUpsert, UserId, LESSON_COMPLETION_POINTS,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fallback title when the mission title cannot be resolved
pub const MISSION_FALLBACK_TITLE: &str = "Mission";

/// Watched share of a lesson video that completes the lesson
pub const VIDEO_COMPLETION_PERCENT: f64 = 90.0;

pub struct ProgressTracker {
    store: Arc<dyn EcoStore>,
    rewards: RewardQueueService,
    scheduler: Scheduler,
    level_up_delay: Duration,
}

impl ProgressTracker {
    pub fn new(
        store: Arc<dyn EcoStore>,
        rewards: RewardQueueService,
        scheduler: Scheduler,
        timings: &RewardTimings,
    ) -> Self {
        Self {
            store,
            rewards,
            scheduler,
            level_up_delay: timings.level_up_delay(),
        }
    }

    /// Published lessons joined with the user's progress
    pub async fn lessons(&self, user_id: &UserId) -> Result<Vec<LessonWithProgress>> {
        let lessons = self.store.list_lessons().await?;
        let progress = self.store.list_lesson_progress(user_id).await?;
        Ok(LessonWithProgress::join(lessons, &progress))
    }

    /// Quiz / mission gate of one lesson
    pub async fn lesson_gate(&self, user_id: &UserId, lesson_id: &LessonId) -> Result<LessonGate> {
        let progress = self.store.list_lesson_progress(user_id).await?;
        let row = progress.iter().find(|p| &p.lesson_id == lesson_id);
        Ok(LessonGate::new(lesson_id.clone(), row))
    }

    /// Upsert lesson progress. A completing update (flagged, or at 100%)
    /// queues the lesson reward and, when the award crossed a level
    /// boundary, a delayed level-up.
    pub async fn update_lesson_progress(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        progress_percentage: f64,
        is_completed: bool,
    ) -> Result<LessonProgress> {
        let update = LessonProgressUpdate::new(
            user_id.clone(),
            lesson_id.clone(),
            progress_percentage,
            is_completed,
            Utc::now(),
        );
        let row = self.store.upsert_lesson_progress(&update).await?;
        debug!("Lesson {} progress {:.0}%", lesson_id, row.progress_percentage);

        if row.is_completed {
            self.run_completion(user_id, lesson_id).await;
        }
        Ok(row)
    }

    /// Progress report from the video player; 90% watched completes the lesson
    pub async fn record_video_progress(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        watched_percent: f64,
    ) -> Result<LessonProgress> {
        let completed = watched_percent >= VIDEO_COMPLETION_PERCENT;
        self.update_lesson_progress(user_id, lesson_id, watched_percent, completed)
            .await
    }

    async fn run_completion(&self, user_id: &UserId, lesson_id: &LessonId) {
        let mut step = CompletionStep::LessonCompleted;

        while !step.is_done() {
            step = match step {
                CompletionStep::LessonCompleted => {
                    let title = self.lesson_title(lesson_id).await;
                    info!("Lesson completed: \"{}\"", title);
                    self.rewards
                        .add_reward(NewReward::lesson(title, LESSON_COMPLETION_POINTS));
                    CompletionStep::PointsApplied
                }
                CompletionStep::PointsApplied => match self.store.fetch_profile(user_id).await {
                    Ok(Some(profile)) => CompletionStep::LevelCheck {
                        points: profile.points(),
                    },
                    Ok(None) => {
                        warn!("No profile for {}, skipping level check", user_id);
                        CompletionStep::Done
                    }
                    Err(e) => {
                        warn!("Profile fetch failed for {}, skipping level check: {}", user_id, e);
                        CompletionStep::Done
                    }
                },
                CompletionStep::LevelCheck { points } => CompletionStep::after_level_check(points),
                CompletionStep::Emit { from, to } => {
                    info!("Level {} -> {} queued in {:?}", from, to, self.level_up_delay);
                    let rewards = self.rewards.clone();
                    self.scheduler.schedule(self.level_up_delay, async move {
                        rewards.add_reward(NewReward::level_up(from, to, workflow::level_up_title(to)));
                    });
                    CompletionStep::Done
                }
                CompletionStep::Done => CompletionStep::Done,
            };
        }
    }

    async fn lesson_title(&self, lesson_id: &LessonId) -> String {
        match self.store.lesson_title(lesson_id).await {
            Ok(Some(title)) => title,
            Ok(None) => LESSON_FALLBACK_TITLE.to_string(),
            Err(e) => {
                warn!("Title lookup failed for lesson {}: {}", lesson_id, e);
                LESSON_FALLBACK_TITLE.to_string()
            }
        }
    }

    async fn mission_title(&self, mission_id: &MissionId) -> String {
        match self.store.mission_title(mission_id).await {
            Ok(Some(title)) => title,
            Ok(None) => MISSION_FALLBACK_TITLE.to_string(),
            Err(e) => {
                warn!("Title lookup failed for mission {}: {}", mission_id, e);
                MISSION_FALLBACK_TITLE.to_string()
            }
        }
    }

    async fn existing_submission(
        &self,
        user_id: &UserId,
        mission_id: &MissionId,
    ) -> Result<Option<MissionSubmission>> {
        let submissions = self.store.list_submissions(user_id).await?;
        Ok(submissions.into_iter().find(|s| &s.mission_id == mission_id))
    }

    async fn check_transition(&self, user_id: &UserId, mission_id: &MissionId, next: SubmissionStatus) -> Result<()> {
        if let Some(existing) = self.existing_submission(user_id, mission_id).await? {
            existing.status.check_transition(next)?;
        }
        Ok(())
    }

    /// Missions tied to a lesson stay locked until that lesson is completed
    async fn check_mission_gate(&self, user_id: &UserId, mission_id: &MissionId) -> Result<()> {
        let missions = self.store.list_missions(None).await?;
        let lesson_id = missions
            .into_iter()
            .find(|m| &m.id == mission_id)
            .and_then(|m| m.lesson_id);
        match lesson_id {
            Some(lesson_id) => self.lesson_gate(user_id, &lesson_id).await?.check_missions(),
            None => Ok(()),
        }
    }

    /// Missions of a completed lesson with the user's submission status
    pub async fn lesson_missions(&self, user_id: &UserId, lesson_id: &LessonId) -> Result<Vec<LessonMission>> {
        self.lesson_gate(user_id, lesson_id).await?.check_missions()?;
        let missions = self.store.list_missions(Some(lesson_id)).await?;
        let submissions = self.store.list_submissions(user_id).await?;
        Ok(LessonMission::join(missions, &submissions))
    }

    /// Mark a mission as in progress
    pub async fn start_mission(&self, user_id: &UserId, mission_id: &MissionId) -> Result<MissionSubmission> {
        self.check_mission_gate(user_id, mission_id).await?;
        self.check_transition(user_id, mission_id, SubmissionStatus::InProgress)
            .await?;
        let row = self
            .store
            .upsert_submission(&SubmissionUpsert::start(user_id.clone(), mission_id.clone()))
            .await?;
        info!("Mission {} started", mission_id);
        Ok(row)
    }

    /// Submit a mission for review and queue a 0-point mission reward.
    /// Points arrive later through approval and the next snapshot diff.
    pub async fn submit_mission(
        &self,
        user_id: &UserId,
        mission_id: &MissionId,
        submission_data: serde_json::Value,
        video_url: Option<String>,
    ) -> Result<MissionSubmission> {
        self.check_mission_gate(user_id, mission_id).await?;
        self.check_transition(user_id, mission_id, SubmissionStatus::Submitted)
            .await?;
        let upsert = SubmissionUpsert::submit(
            user_id.clone(),
            mission_id.clone(),
            submission_data,
            video_url,
            Utc::now(),
        );
        let row = self.store.upsert_submission(&upsert).await?;

        let title = self.mission_title(mission_id).await;
        info!("Mission submitted: \"{}\"", title);
        self.rewards.add_reward(NewReward::mission(title, 0));
        Ok(row)
    }

    /// Submission counts and approved points of a user
    pub async fn mission_stats(&self, user_id: &UserId) -> Result<MissionStats> {
        let missions = self.store.list_missions(None).await?;
        let submissions = self.store.list_submissions(user_id).await?;
        Ok(MissionStats::from_submissions(missions.len(), &submissions))
    }
}
