//! GameGreenEco Engine - Progress & rewards orchestration
//!
//! Turns learning and mission events into an ordered queue of reward
//! notifications, and drives their timed presentation.

pub mod detector;
pub mod leaderboard;
pub mod presentation;
pub mod profile;
pub mod progress;
pub mod quiz;
pub mod review;
pub mod rewards;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use detector::SnapshotDiffDetector;
pub use presentation::{OverlayRenderer, RewardPresenter};
pub use profile::ProfileService;
pub use progress::ProgressTracker;
pub use review::SubmissionReviewer;
pub use rewards::RewardQueueService;
pub use scheduler::Scheduler;
