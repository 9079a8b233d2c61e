//! Shared reward queue handle with change notification

use super::RewardQueue;
use crate::Scheduler;
use gamegreeneco_core::{NewReward, RewardEvent, RewardId, RewardTimings};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

/// Process-wide reward queue for one session.
///
/// Cheap to clone; every clone sees the same queue. Each mutation publishes
/// the full queue to `subscribe()` receivers.
#[derive(Clone)]
pub struct RewardQueueService {
    queue: Arc<Mutex<RewardQueue>>,
    notify: Arc<watch::Sender<Vec<RewardEvent>>>,
    scheduler: Scheduler,
    claim_grace: Duration,
}

impl RewardQueueService {
    pub fn new(scheduler: Scheduler, timings: &RewardTimings) -> Self {
        let (notify, _) = watch::channel(Vec::new());
        Self {
            queue: Arc::new(Mutex::new(RewardQueue::new())),
            notify: Arc::new(notify),
            scheduler,
            claim_grace: timings.claim_grace(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RewardQueue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, queue: &RewardQueue) {
        self.notify.send_replace(queue.to_vec());
    }

    /// Append a reward with a fresh id, unclaimed
    pub fn add_reward(&self, reward: NewReward) -> RewardId {
        let id = RewardId::new(Uuid::new_v4().to_string());
        let mut queue = self.lock();
        let event = queue.push(id.clone(), reward);
        info!(
            "Reward queued: {} \"{}\" (+{} pts)",
            event.kind.label(),
            event.title,
            event.points
        );
        self.publish(&queue);
        id
    }

    /// Mark a reward claimed and remove it after the claim grace period.
    /// No-op (returns false) for unknown or already-claimed ids.
    pub fn claim_reward(&self, id: &RewardId) -> bool {
        {
            let mut queue = self.lock();
            if !queue.claim(id) {
                debug!("Claim ignored for {}", id);
                return false;
            }
            self.publish(&queue);
        }

        let service = self.clone();
        let id = id.clone();
        self.scheduler.schedule(self.claim_grace, async move {
            service.remove_reward(&id);
        });
        true
    }

    /// Remove a reward immediately. Returns false when it was not queued.
    pub fn remove_reward(&self, id: &RewardId) -> bool {
        let mut queue = self.lock();
        match queue.remove(id) {
            Some(removed) => {
                debug!("Reward removed: {} \"{}\"", removed.kind.label(), removed.title);
                self.publish(&queue);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the queue in insertion order
    pub fn rewards(&self) -> Vec<RewardEvent> {
        self.lock().to_vec()
    }

    pub fn get(&self, id: &RewardId) -> Option<RewardEvent> {
        self.lock().get(id).cloned()
    }

    pub fn position(&self, id: &RewardId) -> Option<usize> {
        self.lock().position(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Receiver notified with the full queue after every mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<RewardEvent>> {
        self.notify.subscribe()
    }

    /// Drop all rewards (sign-out)
    pub fn clear(&self) {
        let mut queue = self.lock();
        if !queue.is_empty() {
            queue.clear();
            self.publish(&queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamegreeneco_core::{Level, RewardKind};

    fn service() -> RewardQueueService {
        RewardQueueService::new(Scheduler::new(), &RewardTimings::default())
    }

    #[tokio::test]
    async fn test_add_assigns_unique_ids_and_appends() {
        let rewards = service();
        let a = rewards.add_reward(NewReward::lesson("Water", 25));
        let b = rewards.add_reward(NewReward::lesson("Water", 25));

        assert_ne!(a, b);
        let queued = rewards.rewards();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].id, a);
        assert!(!queued[0].claimed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_removes_after_grace_never_before() {
        let rewards = service();
        let id = rewards.add_reward(NewReward::mission("Plant", 50));

        assert!(rewards.claim_reward(&id));
        assert!(rewards.get(&id).unwrap().claimed);

        tokio::time::sleep(Duration::from_millis(1_999)).await;
        assert!(rewards.get(&id).is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(rewards.get(&id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_unknown_or_twice_is_noop() {
        let rewards = service();
        let id = rewards.add_reward(NewReward::mission("Plant", 50));

        assert!(!rewards.claim_reward(&RewardId::new("missing")));
        assert!(rewards.claim_reward(&id));
        assert!(!rewards.claim_reward(&id));
        assert_eq!(rewards.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_keeps_length() {
        let rewards = service();
        rewards.add_reward(NewReward::lesson("Water", 25));

        assert!(!rewards.remove_reward(&RewardId::new("missing")));
        assert_eq!(rewards.len(), 1);
    }

    #[tokio::test]
    async fn test_earlier_reward_stays_ahead() {
        let rewards = service();
        let a = rewards.add_reward(NewReward::level_up(Level(1), Level(2), "Level 2"));
        let b = rewards.add_reward(NewReward::lesson("Water", 25));
        rewards.add_reward(NewReward::mission("Plant", 0));

        assert!(rewards.position(&a).unwrap() <= rewards.position(&b).unwrap());
        rewards.remove_reward(&rewards.rewards()[2].id.clone());
        assert!(rewards.position(&a).unwrap() <= rewards.position(&b).unwrap());
        assert!(matches!(rewards.rewards()[0].kind, RewardKind::LevelUp { .. }));
    }

    #[tokio::test]
    async fn test_subscribers_see_every_mutation() {
        let rewards = service();
        let mut rx = rewards.subscribe();

        let id = rewards.add_reward(NewReward::lesson("Water", 25));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        rewards.remove_reward(&id);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_claim_removal() {
        let scheduler = Scheduler::new();
        let rewards = RewardQueueService::new(scheduler.clone(), &RewardTimings::default());
        let id = rewards.add_reward(NewReward::mission("Plant", 50));
        rewards.claim_reward(&id);

        scheduler.shutdown();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rewards.get(&id).is_some());
    }
}
