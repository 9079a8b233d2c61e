//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Eco points needed per level
pub const POINTS_PER_LEVEL: u32 = 200;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of an authenticated user (auth provider id)
    UserId
);
string_id!(
    /// Identifier of a lesson
    LessonId
);
string_id!(
    /// Identifier of a mission
    MissionId
);
string_id!(
    /// Identifier of a mission submission row
    SubmissionId
);
string_id!(
    /// Opaque unique token of an in-memory reward event
    RewardId
);

/// Eco point amount (for clarity in function signatures)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EcoPoints(pub u32);

impl EcoPoints {
    pub fn new(points: u32) -> Self {
        EcoPoints(points)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Points before `amount` was awarded, floored at zero
    pub fn before_award(&self, amount: u32) -> Self {
        EcoPoints(self.0.saturating_sub(amount))
    }

    pub fn level(&self) -> Level {
        Level::for_points(self.0)
    }
}

/// Player level, always >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub u32);

impl Level {
    pub const MIN: Level = Level(1);

    pub fn new(level: u32) -> Self {
        Level(level.max(1))
    }

    /// `max(1, floor(points / 200) + 1)`
    pub fn for_points(points: u32) -> Self {
        Level((points / POINTS_PER_LEVEL + 1).max(1))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Levels strictly after `self` up to and including `to`
    pub fn steps_to(&self, to: Level) -> impl Iterator<Item = Level> {
        (self.0 + 1..=to.0).map(Level)
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::MIN
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
