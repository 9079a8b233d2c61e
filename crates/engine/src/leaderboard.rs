//! Student and organization leaderboards

use gamegreeneco_core::{
    EcoStore, LeaderboardEntry, LeaderboardPosition, LeaderboardScope, OrganizationStanding,
    Profile, RegionLevel, Result, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Order by eco points (highest first, ties keep their order) and number
/// the entries from 1
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.eco_points.cmp(&a.eco_points));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    entries
}

/// Where `user_id` sits on a ranked board
pub fn user_position(entries: &[LeaderboardEntry], user_id: &UserId) -> Option<LeaderboardPosition> {
    entries
        .iter()
        .find(|e| &e.user_id == user_id)
        .map(|e| LeaderboardPosition {
            rank: e.rank,
            total: entries.len() as u32,
        })
}

/// Ranked students visible to the caller in `scope`
pub async fn fetch_student_leaderboard(
    store: &dyn EcoStore,
    scope: LeaderboardScope,
) -> Result<Vec<LeaderboardEntry>> {
    let entries = store.student_leaderboard(scope).await?;
    debug!("{} leaderboard: {} students", scope.as_str(), entries.len());
    Ok(rank_entries(entries))
}

/// Organizations of one region, most students first. A blank region yields
/// an empty board without a query.
pub async fn fetch_organization_leaderboard(
    store: &dyn EcoStore,
    level: RegionLevel,
    region: &str,
) -> Result<Vec<OrganizationStanding>> {
    let region = region.trim();
    if region.is_empty() {
        return Ok(Vec::new());
    }
    store.organization_leaderboard(level, region).await
}

/// Totals shown on an organization dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStats {
    pub total_students: u32,
    pub total_eco_points: u64,
    pub total_lessons: u64,
    pub total_missions: u64,
    /// Rounded mean, 0 without students
    pub avg_eco_points: u64,
}

impl OrganizationStats {
    pub fn from_students(students: &[Profile]) -> Self {
        let total_students = students.len() as u32;
        let total_eco_points: u64 = students.iter().map(|s| u64::from(s.eco_points)).sum();
        let avg_eco_points = if total_students == 0 {
            0
        } else {
            (total_eco_points as f64 / f64::from(total_students)).round() as u64
        };

        OrganizationStats {
            total_students,
            total_eco_points,
            total_lessons: students.iter().map(|s| u64::from(s.completed_lessons)).sum(),
            total_missions: students.iter().map(|s| u64::from(s.completed_missions)).sum(),
            avg_eco_points,
        }
    }

    pub async fn fetch(store: &dyn EcoStore, organization_name: &str) -> Result<Self> {
        let students = store.organization_students(organization_name).await?;
        Ok(Self::from_students(&students))
    }
}
