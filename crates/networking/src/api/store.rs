//! `EcoStore` over the backend REST tables, procedures and storage

use crate::BackendClient;
use async_trait::async_trait;
use gamegreeneco_core::{
    EcoStore, Error, Lesson, LessonId, LessonProgress, LessonProgressUpdate, LeaderboardEntry,
    LeaderboardScope, Mission, MissionId, MissionSubmission, OrganizationStanding, Profile,
    ProfileUpdate, RegionLevel, Result, SubmissionId, SubmissionReview, SubmissionUpsert,
    UserBadge, UserId, PROOF_BUCKET,
};
use reqwest::Method;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=representation";
const RETURN_ROWS: &str = "return=representation";

#[derive(Deserialize)]
struct TitleRow {
    title: String,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn first_row<T>(rows: Vec<T>, what: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(what.to_string()))
}

impl BackendClient {
    fn invalidate_profile(&self, user_id: &UserId) {
        if let Some(cache) = self.cache() {
            cache.invalidate(user_id);
        }
    }
}

#[async_trait]
impl EcoStore for BackendClient {
    #[instrument(skip(self))]
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>> {
        if let Some(cache) = self.cache() {
            if let Some(cached) = cache.get(user_id) {
                debug!("Cache hit for profile {}", user_id);
                return Ok(Some(cached));
            }
        }

        let rows: Vec<Profile> = self
            .select(
                "profiles",
                &[("select", "*".to_string()), ("user_id", eq(user_id.as_str()))],
            )
            .await?;

        let profile = rows.into_iter().next();
        if let (Some(cache), Some(p)) = (self.cache(), profile.as_ref()) {
            cache.insert(p.clone());
        }
        Ok(profile)
    }

    #[instrument(skip(self, update))]
    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate) -> Result<Profile> {
        if update.is_empty() {
            return Err(Error::InvalidData("Profile update has no fields".to_string()));
        }

        let rows: Vec<Profile> = self
            .write(
                Method::PATCH,
                "profiles",
                &[("user_id", eq(user_id.as_str()))],
                update,
                RETURN_ROWS,
            )
            .await?;

        let profile = first_row(rows, &format!("profile for user {}", user_id))?;
        if let Some(cache) = self.cache() {
            cache.insert(profile.clone());
        }
        Ok(profile)
    }

    #[instrument(skip(self))]
    async fn list_lessons(&self) -> Result<Vec<Lesson>> {
        self.select(
            "lessons",
            &[
                ("select", "*".to_string()),
                ("is_published", "eq.true".to_string()),
                ("order", "order_index.asc".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn lesson_title(&self, lesson_id: &LessonId) -> Result<Option<String>> {
        let rows: Vec<TitleRow> = self
            .select(
                "lessons",
                &[("select", "title".to_string()), ("id", eq(lesson_id.as_str()))],
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.title))
    }

    #[instrument(skip(self))]
    async fn list_lesson_progress(&self, user_id: &UserId) -> Result<Vec<LessonProgress>> {
        self.select(
            "lesson_progress",
            &[("select", "*".to_string()), ("user_id", eq(user_id.as_str()))],
        )
        .await
    }

    #[instrument(skip(self, update), fields(lesson = %update.lesson_id))]
    async fn upsert_lesson_progress(&self, update: &LessonProgressUpdate) -> Result<LessonProgress> {
        let rows: Vec<LessonProgress> = self
            .write(
                Method::POST,
                "lesson_progress",
                &[("on_conflict", "user_id,lesson_id".to_string())],
                update,
                UPSERT_PREFER,
            )
            .await?;

        // Completion bumps the profile aggregates server-side
        self.invalidate_profile(&update.user_id);
        first_row(rows, "lesson progress")
    }

    #[instrument(skip(self))]
    async fn list_missions(&self, lesson_id: Option<&LessonId>) -> Result<Vec<Mission>> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("is_active", "eq.true".to_string()),
        ];
        match lesson_id {
            Some(id) => {
                query.push(("lesson_id", eq(id.as_str())));
                query.push(("order", "title.asc".to_string()));
            }
            None => query.push(("order", "created_at.asc".to_string())),
        }
        self.select("missions", &query).await
    }

    #[instrument(skip(self))]
    async fn mission_title(&self, mission_id: &MissionId) -> Result<Option<String>> {
        let rows: Vec<TitleRow> = self
            .select(
                "missions",
                &[("select", "title".to_string()), ("id", eq(mission_id.as_str()))],
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.title))
    }

    #[instrument(skip(self))]
    async fn list_submissions(&self, user_id: &UserId) -> Result<Vec<MissionSubmission>> {
        self.select(
            "mission_submissions",
            &[
                ("select", "*,missions(title,points)".to_string()),
                ("user_id", eq(user_id.as_str())),
                ("order", "submitted_at.desc.nullslast".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self, upsert), fields(mission = %upsert.mission_id, status = %upsert.status))]
    async fn upsert_submission(&self, upsert: &SubmissionUpsert) -> Result<MissionSubmission> {
        let rows: Vec<MissionSubmission> = self
            .write(
                Method::POST,
                "mission_submissions",
                &[("on_conflict", "user_id,mission_id".to_string())],
                upsert,
                UPSERT_PREFER,
            )
            .await?;

        self.invalidate_profile(&upsert.user_id);
        first_row(rows, "mission submission")
    }

    #[instrument(skip(self, review), fields(status = %review.status))]
    async fn review_submission(&self, submission_id: &SubmissionId, review: &SubmissionReview) -> Result<()> {
        self.write_minimal(
            Method::PATCH,
            "mission_submissions",
            &[("id", eq(submission_id.as_str()))],
            review,
        )
        .await?;

        // Approval changes the student's points; we don't know whose here
        if let Some(cache) = self.cache() {
            cache.clear();
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn student_leaderboard(&self, scope: LeaderboardScope) -> Result<Vec<LeaderboardEntry>> {
        self.rpc(
            "get_student_leaderboard_by_scope",
            &serde_json::json!({ "scope": scope.as_str() }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn organization_leaderboard(&self, level: RegionLevel, region: &str) -> Result<Vec<OrganizationStanding>> {
        self.select(
            "organization_leaderboard",
            &[
                ("select", "*".to_string()),
                (level.column(), eq(region)),
                ("order", "student_count.desc,total_eco_points.desc".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn organization_students(&self, organization_name: &str) -> Result<Vec<Profile>> {
        self.select(
            "profiles",
            &[
                ("select", "*".to_string()),
                ("role", "eq.student".to_string()),
                ("organization_name", eq(organization_name)),
                ("order", "eco_points.desc".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn user_badges(&self, user_id: &UserId) -> Result<Vec<UserBadge>> {
        self.select(
            "user_badges",
            &[
                ("select", "id,earned_at,badge:badges(*)".to_string()),
                ("user_id", eq(user_id.as_str())),
                ("order", "earned_at.desc".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn sign_proof_url(&self, key: &str, ttl: Duration) -> Result<String> {
        let path = format!("object/sign/{}/{}", PROOF_BUCKET, key.trim_start_matches('/'));
        let signed: SignedUrlResponse = self
            .storage_post(&path, &serde_json::json!({ "expiresIn": ttl.as_secs() }))
            .await?;

        Ok(format!(
            "{}/storage/v1/{}",
            self.base_url(),
            signed.signed_url.trim_start_matches('/')
        ))
    }
}
