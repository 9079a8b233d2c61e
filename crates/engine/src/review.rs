//! Organization review of mission submissions

use chrono::Utc;
use gamegreeneco_core::{
    EcoStore, Error, MissionSubmission, ProofLocation, Result, ReviewDecision, SubmissionReview,
    SubmissionStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Lifetime of signed proof URLs
pub const PROOF_URL_TTL: Duration = Duration::from_secs(3600);

/// Approves or rejects submissions on behalf of an organization
pub struct SubmissionReviewer {
    store: Arc<dyn EcoStore>,
}

impl SubmissionReviewer {
    pub fn new(store: Arc<dyn EcoStore>) -> Self {
        Self { store }
    }

    /// Record a decision. Approval needs a video proof and awards the
    /// mission's points; rejection awards none. Returns the points awarded.
    pub async fn review(
        &self,
        submission: &MissionSubmission,
        decision: ReviewDecision,
        notes: &str,
    ) -> Result<u32> {
        if decision == ReviewDecision::Approve && !submission.has_video_proof() {
            warn!("Refusing to approve {} without video proof", submission.id);
            return Err(Error::ProofRequired(submission.id.to_string()));
        }

        let status = decision.status();
        submission.status.check_transition(status)?;

        let points_awarded = match decision {
            ReviewDecision::Approve => submission.mission.as_ref().map_or(0, |m| m.points),
            ReviewDecision::Reject => 0,
        };

        let review = SubmissionReview {
            status,
            reviewer_notes: notes.trim().to_string(),
            points_awarded,
            reviewed_at: Utc::now(),
        };
        self.store.review_submission(&submission.id, &review).await?;

        info!("Submission {} {} (+{} pts)", submission.id, status, points_awarded);
        Ok(points_awarded)
    }

    /// Submissions of an organization's students that await a decision
    pub async fn pending_reviews(&self, organization_name: &str) -> Result<Vec<MissionSubmission>> {
        let students = self.store.organization_students(organization_name).await?;
        let mut pending = Vec::new();
        for student in &students {
            let submissions = self.store.list_submissions(&student.user_id).await?;
            pending.extend(
                submissions
                    .into_iter()
                    .filter(|s| s.status == SubmissionStatus::Submitted),
            );
        }
        pending.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(pending)
    }

    /// Playable URL for a submission's proof video
    pub async fn proof_url(&self, submission: &MissionSubmission) -> Option<String> {
        let video_url = submission.video_url.as_deref()?;
        resolve_proof_url(self.store.as_ref(), video_url).await
    }
}

/// Turn a stored video reference into a URL the reviewer can open.
///
/// Bucket keys are signed for an hour. Public bucket URLs are re-signed by
/// key and fall back to the stored URL. Other absolute URLs are used as-is.
/// Returns `None` when a bare key cannot be signed.
pub async fn resolve_proof_url(store: &dyn EcoStore, video_url: &str) -> Option<String> {
    match ProofLocation::parse(video_url) {
        ProofLocation::External(url) => Some(url),
        ProofLocation::PublicUrl { key, url } => match store.sign_proof_url(&key, PROOF_URL_TTL).await {
            Ok(signed) => Some(signed),
            Err(e) => {
                warn!("Re-signing {} failed, using public URL: {}", key, e);
                Some(url)
            }
        },
        ProofLocation::BucketKey(key) => match store.sign_proof_url(&key, PROOF_URL_TTL).await {
            Ok(signed) => Some(signed),
            Err(e) => {
                warn!("Signing {} failed: {}", key, e);
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;
    use gamegreeneco_core::{MissionId, MissionSummary, SubmissionId, SubmissionStatus, UserId};

    fn submission(video_url: Option<&str>, status: SubmissionStatus) -> MissionSubmission {
        MissionSubmission {
            id: SubmissionId::new("s-1"),
            user_id: UserId::new("u-1"),
            mission_id: MissionId::new("m-1"),
            status,
            submission_data: serde_json::json!({"notes": "planted an oak"}),
            points_awarded: None,
            video_url: video_url.map(str::to_string),
            submitted_at: None,
            reviewed_at: None,
            reviewer_notes: None,
            mission: Some(MissionSummary {
                title: "Plant a Tree".to_string(),
                points: 100,
            }),
        }
    }

    fn reviewer() -> (SubmissionReviewer, Arc<FakeStore>) {
        let store = Arc::new(FakeStore::new());
        (SubmissionReviewer::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_pending_reviews_cover_only_own_students() {
        let store = FakeStore::new();
        {
            let mut state = store.state();
            let mut ours = crate::testing::profile("u-1", 0);
            ours.organization_name = Some("Green School".to_string());
            let mut other = crate::testing::profile("u-2", 0);
            other.organization_name = Some("Blue School".to_string());
            state.students = vec![ours, other];

            let mut approved = submission(Some("u-1/a.mp4"), SubmissionStatus::Approved);
            approved.id = SubmissionId::new("s-0");
            let mut foreign = submission(Some("u-2/b.mp4"), SubmissionStatus::Submitted);
            foreign.id = SubmissionId::new("s-2");
            foreign.user_id = UserId::new("u-2");
            state.submissions = vec![
                approved,
                submission(Some("u-1/c.mp4"), SubmissionStatus::Submitted),
                foreign,
            ];
        }
        let reviewer = SubmissionReviewer::new(Arc::new(store));

        let pending = reviewer.pending_reviews("Green School").await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_str(), "s-1");
    }

    #[tokio::test]
    async fn test_approval_without_video_never_reaches_store() {
        let (reviewer, store) = reviewer();

        for url in [None, Some("  ")] {
            let result = reviewer
                .review(&submission(url, SubmissionStatus::Submitted), ReviewDecision::Approve, "")
                .await;
            assert!(matches!(result, Err(Error::ProofRequired(_))));
        }
        assert!(store.state().reviews.is_empty());
    }

    #[tokio::test]
    async fn test_approval_awards_mission_points() {
        let (reviewer, store) = reviewer();

        let points = reviewer
            .review(
                &submission(Some("u-1/oak.mp4"), SubmissionStatus::Submitted),
                ReviewDecision::Approve,
                " Great work ",
            )
            .await
            .unwrap();

        assert_eq!(points, 100);
        let reviews = &store.state().reviews;
        assert_eq!(reviews[0].0, SubmissionId::new("s-1"));
        assert_eq!(reviews[0].1.status, SubmissionStatus::Approved);
        assert_eq!(reviews[0].1.reviewer_notes, "Great work");
    }

    #[tokio::test]
    async fn test_rejection_needs_no_proof_and_awards_nothing() {
        let (reviewer, store) = reviewer();

        let points = reviewer
            .review(&submission(None, SubmissionStatus::Submitted), ReviewDecision::Reject, "blurry")
            .await
            .unwrap();

        assert_eq!(points, 0);
        assert_eq!(store.state().reviews[0].1.status, SubmissionStatus::Rejected);
    }

    #[tokio::test]
    async fn test_approved_submission_cannot_be_reviewed_again() {
        let (reviewer, store) = reviewer();

        let result = reviewer
            .review(&submission(Some("u-1/oak.mp4"), SubmissionStatus::Approved), ReviewDecision::Reject, "")
            .await;

        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        assert!(store.state().reviews.is_empty());
    }

    #[tokio::test]
    async fn test_proof_url_resolution() {
        let store = FakeStore::new();

        let signed = resolve_proof_url(&store, "u-1/oak.mp4").await.unwrap();
        assert_eq!(signed, "https://signed.example/u-1/oak.mp4?ttl=3600");

        let public = "https://x.example/storage/v1/object/public/mission-videos/u-1/oak.mp4";
        assert_eq!(
            resolve_proof_url(&store, public).await.unwrap(),
            "https://signed.example/u-1/oak.mp4?ttl=3600"
        );

        let external = "https://videos.example.org/oak.mp4";
        assert_eq!(resolve_proof_url(&store, external).await.unwrap(), external);
        assert_eq!(store.state().signed_keys.len(), 2);
    }

    #[tokio::test]
    async fn test_signing_failure_degrades() {
        let store = FakeStore::new();
        store.state().fail_signing = true;

        let public = "https://x.example/storage/v1/object/public/mission-videos/u-1/oak.mp4";
        assert_eq!(resolve_proof_url(&store, public).await.unwrap(), public);
        assert!(resolve_proof_url(&store, "u-1/oak.mp4").await.is_none());
    }
}
