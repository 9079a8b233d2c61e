//! In-memory fakes of the service ports for engine tests

use async_trait::async_trait;
use gamegreeneco_core::{
    EcoStore, Error, Lesson, LessonId, LessonProgress, LessonProgressUpdate, LeaderboardEntry,
    LeaderboardScope, Mission, MissionId, MissionSubmission, OrganizationStanding, Profile,
    ProfileSnapshot, ProfileUpdate, RegionLevel, Result, SnapshotStore, SubmissionId,
    SubmissionReview, SubmissionUpsert, UserBadge, UserId,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn profile(user_id: &str, eco_points: u32) -> Profile {
    serde_json::from_value(serde_json::json!({
        "user_id": user_id,
        "eco_points": eco_points,
        "level": gamegreeneco_core::Level::for_points(eco_points).as_u32(),
    }))
    .expect("valid profile fixture")
}

#[derive(Default)]
pub struct FakeState {
    pub profiles: HashMap<UserId, Profile>,
    pub lesson_titles: HashMap<LessonId, String>,
    pub mission_titles: HashMap<MissionId, String>,
    pub missions: Vec<Mission>,
    pub badges: HashMap<UserId, Vec<UserBadge>>,
    pub progress: Vec<LessonProgress>,
    pub submissions: Vec<MissionSubmission>,
    pub reviews: Vec<(SubmissionId, SubmissionReview)>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub standings: Vec<OrganizationStanding>,
    pub students: Vec<Profile>,
    pub fail_titles: bool,
    pub fail_writes: bool,
    pub fail_signing: bool,
    pub signed_keys: Vec<String>,
    pub next_submission: u32,
}

/// `EcoStore` over plain collections
#[derive(Default)]
pub struct FakeStore {
    pub state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.state().profiles.insert(profile.user_id.clone(), profile);
        self
    }

    pub fn with_lesson(self, id: &str, title: &str) -> Self {
        self.state().lesson_titles.insert(LessonId::new(id), title.to_string());
        self
    }

    pub fn with_mission(self, id: &str, title: &str) -> Self {
        self.add_mission(id, title, None);
        self
    }

    /// Mission that belongs to a lesson and is gated by it
    pub fn with_lesson_mission(self, id: &str, title: &str, lesson_id: &str) -> Self {
        self.add_mission(id, title, Some(LessonId::new(lesson_id)));
        self
    }

    fn add_mission(&self, id: &str, title: &str, lesson_id: Option<LessonId>) {
        let mut state = self.state();
        state.mission_titles.insert(MissionId::new(id), title.to_string());
        state.missions.push(Mission {
            id: MissionId::new(id),
            title: title.to_string(),
            description: String::new(),
            instructions: String::new(),
            points: 100,
            difficulty: "easy".to_string(),
            category: "nature".to_string(),
            lesson_id,
            is_active: true,
        });
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake store lock")
    }

    pub fn set_points(&self, user_id: &str, points: u32) {
        if let Some(p) = self.state().profiles.get_mut(&UserId::new(user_id)) {
            p.eco_points = points;
            p.level = gamegreeneco_core::Level::for_points(points).as_u32();
        }
    }
}

#[async_trait]
impl EcoStore for FakeStore {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>> {
        Ok(self.state().profiles.get(user_id).cloned())
    }

    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate) -> Result<Profile> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(Error::ApiError("write rejected".to_string()));
        }
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(user_id.to_string()))?;
        if let Some(name) = &update.display_name {
            profile.display_name = Some(name.clone());
        }
        if let Some(country) = &update.region_country {
            profile.region_country = Some(country.clone());
        }
        if let Some(org) = &update.organization_name {
            profile.organization_name = Some(org.clone());
        }
        Ok(profile.clone())
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>> {
        Ok(Vec::new())
    }

    async fn lesson_title(&self, lesson_id: &LessonId) -> Result<Option<String>> {
        let state = self.state();
        if state.fail_titles {
            return Err(Error::NetworkError("offline".to_string()));
        }
        Ok(state.lesson_titles.get(lesson_id).cloned())
    }

    async fn list_lesson_progress(&self, user_id: &UserId) -> Result<Vec<LessonProgress>> {
        Ok(self
            .state()
            .progress
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_lesson_progress(&self, update: &LessonProgressUpdate) -> Result<LessonProgress> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(Error::ApiError("write rejected".to_string()));
        }
        let row = LessonProgress {
            user_id: update.user_id.clone(),
            lesson_id: update.lesson_id.clone(),
            progress_percentage: update.progress_percentage,
            is_completed: update.is_completed,
            completed_at: update.completed_at,
            last_accessed_at: Some(update.last_accessed_at),
        };
        state
            .progress
            .retain(|p| !(p.user_id == row.user_id && p.lesson_id == row.lesson_id));
        state.progress.push(row.clone());
        Ok(row)
    }

    async fn list_missions(&self, lesson_id: Option<&LessonId>) -> Result<Vec<Mission>> {
        Ok(self
            .state()
            .missions
            .iter()
            .filter(|m| lesson_id.is_none() || m.lesson_id.as_ref() == lesson_id)
            .cloned()
            .collect())
    }

    async fn mission_title(&self, mission_id: &MissionId) -> Result<Option<String>> {
        let state = self.state();
        if state.fail_titles {
            return Err(Error::NetworkError("offline".to_string()));
        }
        Ok(state.mission_titles.get(mission_id).cloned())
    }

    async fn list_submissions(&self, user_id: &UserId) -> Result<Vec<MissionSubmission>> {
        Ok(self
            .state()
            .submissions
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_submission(&self, upsert: &SubmissionUpsert) -> Result<MissionSubmission> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(Error::ApiError("write rejected".to_string()));
        }
        state.next_submission += 1;
        let existing = state
            .submissions
            .iter()
            .position(|s| s.user_id == upsert.user_id && s.mission_id == upsert.mission_id);
        let id = match existing {
            Some(idx) => state.submissions.remove(idx).id,
            None => SubmissionId::new(format!("s-{}", state.next_submission)),
        };
        let row = MissionSubmission {
            id,
            user_id: upsert.user_id.clone(),
            mission_id: upsert.mission_id.clone(),
            status: upsert.status,
            submission_data: upsert.submission_data.clone().unwrap_or_default(),
            points_awarded: None,
            video_url: upsert.video_url.clone(),
            submitted_at: upsert.submitted_at,
            reviewed_at: None,
            reviewer_notes: None,
            mission: None,
        };
        state.submissions.push(row.clone());
        Ok(row)
    }

    async fn review_submission(&self, submission_id: &SubmissionId, review: &SubmissionReview) -> Result<()> {
        self.state().reviews.push((submission_id.clone(), review.clone()));
        Ok(())
    }

    async fn student_leaderboard(&self, _scope: LeaderboardScope) -> Result<Vec<LeaderboardEntry>> {
        Ok(self.state().leaderboard.clone())
    }

    async fn organization_leaderboard(&self, _level: RegionLevel, region: &str) -> Result<Vec<OrganizationStanding>> {
        Ok(self
            .state()
            .standings
            .iter()
            .filter(|s| s.region_country.as_deref() == Some(region))
            .cloned()
            .collect())
    }

    async fn organization_students(&self, organization_name: &str) -> Result<Vec<Profile>> {
        Ok(self
            .state()
            .students
            .iter()
            .filter(|p| p.organization_name.as_deref() == Some(organization_name))
            .cloned()
            .collect())
    }

    async fn user_badges(&self, user_id: &UserId) -> Result<Vec<UserBadge>> {
        Ok(self.state().badges.get(user_id).cloned().unwrap_or_default())
    }

    async fn sign_proof_url(&self, key: &str, ttl: Duration) -> Result<String> {
        let mut state = self.state();
        if state.fail_signing {
            return Err(Error::ApiError("bucket unavailable".to_string()));
        }
        state.signed_keys.push(key.to_string());
        Ok(format!("https://signed.example/{}?ttl={}", key, ttl.as_secs()))
    }
}

/// `SnapshotStore` over a map, with an injectable load failure
#[derive(Default)]
pub struct MemorySnapshotStore {
    pub snapshots: Mutex<HashMap<UserId, ProfileSnapshot>>,
    pub fail_load: Mutex<bool>,
    pub saves: Mutex<u32>,
}

impl MemorySnapshotStore {
    pub fn with(user_id: &str, snapshot: ProfileSnapshot) -> Self {
        let store = Self::default();
        store
            .snapshots
            .lock()
            .expect("snapshot lock")
            .insert(UserId::new(user_id), snapshot);
        store
    }

    pub fn get(&self, user_id: &str) -> Option<ProfileSnapshot> {
        self.snapshots.lock().expect("snapshot lock").get(&UserId::new(user_id)).copied()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.lock().expect("saves lock")
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load_snapshot(&self, user_id: &UserId) -> Result<Option<ProfileSnapshot>> {
        if *self.fail_load.lock().expect("flag lock") {
            return Err(Error::InvalidData("expected value at line 1 column 2".to_string()));
        }
        Ok(self.snapshots.lock().expect("snapshot lock").get(user_id).copied())
    }

    async fn save_snapshot(&self, user_id: &UserId, snapshot: &ProfileSnapshot) -> Result<()> {
        *self.saves.lock().expect("saves lock") += 1;
        self.snapshots
            .lock()
            .expect("snapshot lock")
            .insert(user_id.clone(), *snapshot);
        Ok(())
    }
}
