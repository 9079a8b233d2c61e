//! Snapshot-diff reward detection
//!
//! On every profile load the current aggregate fields are compared with the
//! last-seen snapshot stored on this device. Whatever grew in between
//! (approved missions, completed lessons, levels, points) is turned into
//! reward notifications, and the current snapshot becomes the new last-seen
//! record.

use crate::RewardQueueService;
use gamegreeneco_core::{NewReward, ProfileSnapshot, RewardId, SnapshotStore, UserId};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

fn plural(count: u32, noun: &str) -> String {
    if count > 1 {
        format!("{} {}s", count, noun)
    } else {
        format!("{} {}", count, noun)
    }
}

/// Rewards implied by the change from `last` to `now`, in emission order.
///
/// The rules are independent: a single diff can yield a mission reward, a
/// lesson reward and a level-up at once.
pub fn diff_snapshots(last: &ProfileSnapshot, now: &ProfileSnapshot) -> Vec<NewReward> {
    let delta_points = i64::from(now.eco_points) - i64::from(last.eco_points);
    let delta_lessons = i64::from(now.completed_lessons) - i64::from(last.completed_lessons);
    let delta_missions = i64::from(now.completed_missions) - i64::from(last.completed_missions);

    let mut rewards = Vec::new();

    if delta_missions > 0 {
        rewards.push(NewReward::mission(
            format!("{} approved while you were away", plural(delta_missions as u32, "mission")),
            delta_points.max(0) as u32,
        ));
    }

    if delta_lessons > 0 {
        rewards.push(NewReward::lesson(
            format!("{} completed while you were away", plural(delta_lessons as u32, "lesson")),
            0,
        ));
    }

    if now.level() > last.level() {
        rewards.push(NewReward::level_up(last.level(), now.level(), "Level Up!"));
    }

    // Point gains with no mission delta are attributed to missions
    if delta_points > 0 && delta_missions == 0 {
        rewards.push(NewReward::mission(
            format!("You earned {} eco points while you were away", delta_points),
            delta_points as u32,
        ));
    }

    rewards
}

/// Emits "while you were away" rewards when a profile is loaded
pub struct SnapshotDiffDetector {
    snapshots: Arc<dyn SnapshotStore>,
    rewards: RewardQueueService,
    /// Last (user, snapshot) pair processed in this session
    processed: Mutex<Option<(UserId, ProfileSnapshot)>>,
}

impl SnapshotDiffDetector {
    pub fn new(snapshots: Arc<dyn SnapshotStore>, rewards: RewardQueueService) -> Self {
        Self {
            snapshots,
            rewards,
            processed: Mutex::new(None),
        }
    }

    fn already_processed(&self, user_id: &UserId, snapshot: &ProfileSnapshot) -> bool {
        let mut processed = self.processed.lock().unwrap_or_else(|p| p.into_inner());
        let current = (user_id.clone(), *snapshot);
        if processed.as_ref() == Some(&current) {
            return true;
        }
        *processed = Some(current);
        false
    }

    /// Compare `snapshot` with the stored last-seen record, enqueue the
    /// resulting rewards and store `snapshot` as the new record.
    ///
    /// Re-loading the same profile with unchanged fields does nothing. A
    /// stored record that cannot be read counts as a first visit.
    pub async fn on_profile_loaded(&self, user_id: &UserId, snapshot: ProfileSnapshot) -> Vec<RewardId> {
        if self.already_processed(user_id, &snapshot) {
            debug!("Snapshot for {} unchanged, skipping diff", user_id);
            return Vec::new();
        }

        let last = match self.snapshots.load_snapshot(user_id).await {
            Ok(last) => last,
            Err(e) => {
                warn!("Ignoring unreadable snapshot for {}: {}", user_id, e);
                None
            }
        };

        let ids: Vec<RewardId> = match last {
            Some(last) => {
                let rewards = diff_snapshots(&last, &snapshot);
                if !rewards.is_empty() {
                    info!("{} reward(s) since last visit of {}", rewards.len(), user_id);
                }
                rewards.into_iter().map(|r| self.rewards.add_reward(r)).collect()
            }
            None => {
                debug!("First visit for {}, nothing to compare", user_id);
                Vec::new()
            }
        };

        if let Err(e) = self.snapshots.save_snapshot(user_id, &snapshot).await {
            warn!("Failed to persist snapshot for {}: {}", user_id, e);
        }

        ids
    }

    /// Forget the processed pair (sign-out)
    pub fn reset(&self) {
        *self.processed.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySnapshotStore;
    use crate::Scheduler;
    use gamegreeneco_core::{Level, RewardKind, RewardTimings};

    fn detector(store: Arc<MemorySnapshotStore>) -> (SnapshotDiffDetector, RewardQueueService) {
        let rewards = RewardQueueService::new(Scheduler::new(), &RewardTimings::default());
        (SnapshotDiffDetector::new(store, rewards.clone()), rewards)
    }

    #[test]
    fn test_one_mission_approved() {
        let rewards = diff_snapshots(&ProfileSnapshot::new(100, 1, 2, 1), &ProfileSnapshot::new(150, 1, 2, 2));

        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].kind, RewardKind::Mission);
        assert_eq!(rewards[0].points, 50);
        assert!(rewards[0].title.contains("1 mission"));
        assert!(!rewards[0].title.contains("missions"));
    }

    #[test]
    fn test_level_crossing_emits_single_level_up() {
        let rewards = diff_snapshots(&ProfileSnapshot::new(180, 1, 0, 0), &ProfileSnapshot::new(220, 2, 0, 1));

        let level_ups: Vec<_> = rewards
            .iter()
            .filter(|r| matches!(r.kind, RewardKind::LevelUp { .. }))
            .collect();
        assert_eq!(level_ups.len(), 1);
        assert_eq!(
            level_ups[0].kind,
            RewardKind::LevelUp {
                from: Level(1),
                to: Level(2)
            }
        );
    }

    #[test]
    fn test_rules_combine_in_order() {
        let rewards = diff_snapshots(&ProfileSnapshot::new(180, 1, 1, 0), &ProfileSnapshot::new(230, 2, 3, 0));

        let kinds: Vec<&str> = rewards.iter().map(|r| r.kind.label()).collect();
        assert_eq!(kinds, vec!["lesson", "level_up", "mission"]);
        assert_eq!(rewards[0].title, "2 lessons completed while you were away");
        assert_eq!(rewards[0].points, 0);
        assert_eq!(rewards[2].title, "You earned 50 eco points while you were away");
        assert_eq!(rewards[2].points, 50);
    }

    #[test]
    fn test_point_loss_never_yields_negative_points() {
        let rewards = diff_snapshots(&ProfileSnapshot::new(300, 2, 0, 1), &ProfileSnapshot::new(250, 2, 0, 3));

        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].points, 0);
        assert_eq!(rewards[0].title, "2 missions approved while you were away");
    }

    #[test]
    fn test_unchanged_snapshot_emits_nothing() {
        let snapshot = ProfileSnapshot::new(420, 3, 4, 2);
        assert!(diff_snapshots(&snapshot, &snapshot).is_empty());
    }

    #[tokio::test]
    async fn test_first_visit_persists_without_emitting() {
        let store = Arc::new(MemorySnapshotStore::default());
        let (detector, rewards) = detector(store.clone());
        let now = ProfileSnapshot::new(40, 1, 1, 0);

        let ids = detector.on_profile_loaded(&UserId::new("u-1"), now).await;

        assert!(ids.is_empty());
        assert!(rewards.is_empty());
        assert_eq!(store.get("u-1"), Some(now));
    }

    #[tokio::test]
    async fn test_diff_enqueues_and_overwrites_record() {
        let store = Arc::new(MemorySnapshotStore::with("u-1", ProfileSnapshot::new(100, 1, 2, 1)));
        let (detector, rewards) = detector(store.clone());
        let now = ProfileSnapshot::new(150, 1, 2, 2);

        let ids = detector.on_profile_loaded(&UserId::new("u-1"), now).await;

        assert_eq!(ids.len(), 1);
        assert_eq!(rewards.rewards()[0].points, 50);
        assert_eq!(store.get("u-1"), Some(now));
    }

    #[tokio::test]
    async fn test_unreadable_record_counts_as_first_visit() {
        let store = Arc::new(MemorySnapshotStore::with("u-1", ProfileSnapshot::new(0, 1, 0, 0)));
        *store.fail_load.lock().unwrap() = true;
        let (detector, rewards) = detector(store.clone());

        detector
            .on_profile_loaded(&UserId::new("u-1"), ProfileSnapshot::new(500, 3, 5, 5))
            .await;

        assert!(rewards.is_empty());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_same_profile_reload_is_skipped() {
        let store = Arc::new(MemorySnapshotStore::with("u-1", ProfileSnapshot::new(100, 1, 2, 1)));
        let (detector, rewards) = detector(store.clone());
        let user = UserId::new("u-1");
        let now = ProfileSnapshot::new(150, 1, 2, 2);

        detector.on_profile_loaded(&user, now).await;
        detector.on_profile_loaded(&user, now).await;

        assert_eq!(rewards.len(), 1);
        assert_eq!(store.save_count(), 1);

        detector.reset();
        detector.on_profile_loaded(&user, now).await;
        assert_eq!(rewards.len(), 1);
        assert_eq!(store.save_count(), 2);
    }
}
