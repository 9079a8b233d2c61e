//! Leaderboard-related models

use crate::UserId;
use serde::{Deserialize, Serialize};

/// Scope argument of the `get_student_leaderboard_by_scope` procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    District,
    State,
    #[default]
    Country,
    Organization,
}

impl LeaderboardScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardScope::District => "district",
            LeaderboardScope::State => "state",
            LeaderboardScope::Country => "country",
            LeaderboardScope::Organization => "organization",
        }
    }
}

/// Region granularity for organization standings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    District,
    State,
    Country,
}

impl RegionLevel {
    /// Profile / view column holding this region
    pub fn column(&self) -> &'static str {
        match self {
            RegionLevel::District => "region_district",
            RegionLevel::State => "region_state",
            RegionLevel::Country => "region_country",
        }
    }
}

/// Student row returned by the leaderboard procedure; `rank` is assigned locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub eco_points: u32,
    #[serde(default)]
    pub completed_missions: u32,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub region_district: Option<String>,
    #[serde(default)]
    pub region_state: Option<String>,
    #[serde(default)]
    pub region_country: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
}

/// Row of the `organization_leaderboard` view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationStanding {
    pub organization_name: String,
    #[serde(default)]
    pub student_count: u32,
    #[serde(default)]
    pub total_eco_points: u64,
    #[serde(default)]
    pub avg_eco_points: f64,
    #[serde(default)]
    pub total_lessons_completed: u64,
    #[serde(default)]
    pub total_missions_completed: u64,
    #[serde(default)]
    pub region_district: Option<String>,
    #[serde(default)]
    pub region_state: Option<String>,
    #[serde(default)]
    pub region_country: Option<String>,
}

/// A user's place on a leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPosition {
    pub rank: u32,
    pub total: u32,
}
