//! Profile aggregate models

use crate::{EcoPoints, Level, UserId};
use serde::{Deserialize, Serialize};

/// Account role stored on the profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    #[default]
    Student,
    Organization,
}

/// Profile aggregate record from the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub eco_points: u32,
    #[serde(default)]
    pub completed_lessons: u32,
    #[serde(default)]
    pub completed_missions: u32,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub region_district: Option<String>,
    #[serde(default)]
    pub region_state: Option<String>,
    #[serde(default)]
    pub region_country: Option<String>,
    #[serde(default)]
    pub role: ProfileRole,
    #[serde(default)]
    pub organization_name: Option<String>,
}

fn default_level() -> u32 {
    1
}

impl Profile {
    /// The fields the reward detector compares between visits
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            eco_points: self.eco_points,
            level: self.level.max(1),
            completed_lessons: self.completed_lessons,
            completed_missions: self.completed_missions,
        }
    }

    pub fn points(&self) -> EcoPoints {
        EcoPoints(self.eco_points)
    }

    /// Level derived from lifetime points (the stored level should agree)
    pub fn derived_level(&self) -> Level {
        Level::for_points(self.eco_points)
    }

    pub fn is_organization(&self) -> bool {
        self.role == ProfileRole::Organization
    }

    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Eco Warrior")
    }
}

/// Point-in-time copy of the aggregate fields, persisted per user as the
/// "last seen" record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub eco_points: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub completed_lessons: u32,
    #[serde(default)]
    pub completed_missions: u32,
}

impl ProfileSnapshot {
    pub fn new(eco_points: u32, level: u32, completed_lessons: u32, completed_missions: u32) -> Self {
        Self {
            eco_points,
            level,
            completed_lessons,
            completed_missions,
        }
    }

    pub fn level(&self) -> Level {
        Level::new(self.level)
    }
}

impl Default for ProfileSnapshot {
    fn default() -> Self {
        Self::new(0, 1, 0, 0)
    }
}

/// Partial update of the caller's own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.avatar_url.is_none()
            && self.region_district.is_none()
            && self.region_state.is_none()
            && self.region_country.is_none()
            && self.organization_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_from_sparse_row() {
        let profile: Profile = serde_json::from_str(r#"{"user_id":"u-1","eco_points":420}"#).unwrap();
        assert_eq!(profile.level, 1);
        assert_eq!(profile.role, ProfileRole::Student);
        assert_eq!(profile.derived_level(), Level(3));
        assert_eq!(profile.snapshot(), ProfileSnapshot::new(420, 1, 0, 0));
    }

    #[test]
    fn test_snapshot_record_shape() {
        let json = serde_json::to_value(ProfileSnapshot::new(100, 1, 2, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "eco_points": 100,
                "level": 1,
                "completed_lessons": 2,
                "completed_missions": 1
            })
        );
    }

    #[test]
    fn test_empty_update_serializes_to_empty_object() {
        let update = ProfileUpdate::default();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }
}
