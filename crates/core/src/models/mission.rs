//! Mission and mission-submission models

use crate::{Error, LessonId, MissionId, Result, SubmissionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage bucket holding mission proof videos
pub const PROOF_BUCKET: &str = "mission-videos";

/// Active mission from the `missions` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub lesson_id: Option<LessonId>,
    #[serde(default)]
    pub is_active: bool,
}

/// Submission status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    InProgress,
    Submitted,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::InProgress => "in_progress",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Approved submissions are final; rejected ones may be resubmitted
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, next),
            (InProgress, InProgress)
                | (InProgress, Submitted)
                | (Submitted, Submitted)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Rejected, InProgress)
                | (Rejected, Submitted)
        )
    }

    pub fn check_transition(&self, next: SubmissionStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mission columns embedded in a submission query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSummary {
    pub title: String,
    #[serde(default)]
    pub points: u32,
}

/// Row of `mission_submissions` keyed by (user, mission)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSubmission {
    pub id: SubmissionId,
    pub user_id: UserId,
    pub mission_id: MissionId,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submission_data: serde_json::Value,
    #[serde(default)]
    pub points_awarded: Option<u32>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
    #[serde(default, rename = "missions")]
    pub mission: Option<MissionSummary>,
}

impl MissionSubmission {
    pub fn has_video_proof(&self) -> bool {
        self.video_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Upsert payload for starting or submitting a mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionUpsert {
    pub user_id: UserId,
    pub mission_id: MissionId,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl SubmissionUpsert {
    pub fn start(user_id: UserId, mission_id: MissionId) -> Self {
        Self {
            user_id,
            mission_id,
            status: SubmissionStatus::InProgress,
            submission_data: None,
            video_url: None,
            submitted_at: None,
        }
    }

    pub fn submit(
        user_id: UserId,
        mission_id: MissionId,
        submission_data: serde_json::Value,
        video_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            mission_id,
            status: SubmissionStatus::Submitted,
            submission_data: Some(submission_data),
            video_url: video_url.filter(|u| !u.trim().is_empty()),
            submitted_at: Some(now),
        }
    }
}

/// Organization decision on a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            ReviewDecision::Approve => SubmissionStatus::Approved,
            ReviewDecision::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// Update applied to a submission when it is reviewed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReview {
    pub status: SubmissionStatus,
    pub reviewer_notes: String,
    pub points_awarded: u32,
    pub reviewed_at: DateTime<Utc>,
}

/// Aggregate counts over a user's submissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionStats {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub total_points_earned: u32,
    pub submitted_tasks: u32,
    pub in_progress_tasks: u32,
}

impl MissionStats {
    pub fn from_submissions(total_tasks: usize, submissions: &[MissionSubmission]) -> Self {
        let count = |status: SubmissionStatus| {
            submissions.iter().filter(|s| s.status == status).count() as u32
        };
        MissionStats {
            total_tasks: total_tasks as u32,
            completed_tasks: count(SubmissionStatus::Approved),
            total_points_earned: submissions
                .iter()
                .filter(|s| s.status == SubmissionStatus::Approved)
                .map(|s| s.points_awarded.unwrap_or(0))
                .sum(),
            submitted_tasks: count(SubmissionStatus::Submitted),
            in_progress_tasks: count(SubmissionStatus::InProgress),
        }
    }
}

/// Mission of a lesson with the user's submission, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonMission {
    pub mission: Mission,
    pub submission: Option<MissionSubmission>,
}

impl LessonMission {
    /// Join missions with submissions; missions keep their given order
    pub fn join(missions: Vec<Mission>, submissions: &[MissionSubmission]) -> Vec<Self> {
        missions
            .into_iter()
            .map(|mission| {
                let submission = submissions.iter().find(|s| s.mission_id == mission.id).cloned();
                LessonMission { mission, submission }
            })
            .collect()
    }

    /// `None` until the user starts the mission
    pub fn status(&self) -> Option<SubmissionStatus> {
        self.submission.as_ref().map(|s| s.status)
    }
}

/// Where a stored proof video lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofLocation {
    /// Object key in the proof bucket that needs signing
    BucketKey(String),
    /// Public bucket URL; re-signed with its key, the URL is the fallback
    PublicUrl { key: String, url: String },
    /// Any other absolute URL, used as-is
    External(String),
}

impl ProofLocation {
    pub fn parse(video_url: &str) -> Self {
        let video_url = video_url.trim();
        if !video_url.starts_with("http") {
            return ProofLocation::BucketKey(video_url.trim_start_matches('/').to_string());
        }

        let marker = format!("/object/public/{}/", PROOF_BUCKET);
        match video_url.find(&marker) {
            Some(idx) => {
                let key = &video_url[idx + marker.len()..];
                if key.is_empty() {
                    ProofLocation::External(video_url.to_string())
                } else {
                    ProofLocation::PublicUrl {
                        key: key.to_string(),
                        url: video_url.to_string(),
                    }
                }
            }
            None => ProofLocation::External(video_url.to_string()),
        }
    }
}
