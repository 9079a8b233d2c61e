//! Ordered reward queue (plain data, no timers)

use gamegreeneco_core::{NewReward, RewardEvent, RewardId};

/// Rewards in insertion order
#[derive(Debug, Clone, Default)]
pub struct RewardQueue {
    rewards: Vec<RewardEvent>,
}

impl RewardQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reward; the queue never reorders by kind
    pub fn push(&mut self, id: RewardId, reward: NewReward) -> RewardEvent {
        let event = RewardEvent::from_new(id, reward);
        self.rewards.push(event.clone());
        event
    }

    /// Mark a reward claimed. Returns false when missing or already claimed.
    pub fn claim(&mut self, id: &RewardId) -> bool {
        match self.rewards.iter_mut().find(|r| &r.id == id) {
            Some(reward) if !reward.claimed => {
                reward.claimed = true;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &RewardId) -> Option<RewardEvent> {
        let pos = self.position(id)?;
        Some(self.rewards.remove(pos))
    }

    pub fn get(&self, id: &RewardId) -> Option<&RewardEvent> {
        self.rewards.iter().find(|r| &r.id == id)
    }

    pub fn position(&self, id: &RewardId) -> Option<usize> {
        self.rewards.iter().position(|r| &r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewardEvent> {
        self.rewards.iter()
    }

    pub fn to_vec(&self) -> Vec<RewardEvent> {
        self.rewards.clone()
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn clear(&mut self) {
        self.rewards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept_across_kinds() {
        let mut queue = RewardQueue::new();
        queue.push(RewardId::new("a"), NewReward::mission("Plant", 0));
        queue.push(RewardId::new("b"), NewReward::lesson("Water", 25));
        queue.push(RewardId::new("c"), NewReward::mission("Recycle", 10));

        let ids: Vec<&str> = queue.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_push_returns_the_stored_event() {
        let mut queue = RewardQueue::new();
        let event = queue.push(RewardId::new("a"), NewReward::lesson("Water", 25));

        assert_eq!(event.id.as_str(), "a");
        assert!(!event.claimed);
        assert_eq!(queue.get(&RewardId::new("a")).unwrap().title, event.title);
    }

    #[test]
    fn test_claim_is_one_way_and_once() {
        let mut queue = RewardQueue::new();
        queue.push(RewardId::new("a"), NewReward::lesson("Water", 25));

        assert!(queue.claim(&RewardId::new("a")));
        assert!(!queue.claim(&RewardId::new("a")));
        assert!(queue.get(&RewardId::new("a")).unwrap().claimed);
        assert!(!queue.claim(&RewardId::new("missing")));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut queue = RewardQueue::new();
        queue.push(RewardId::new("a"), NewReward::lesson("Water", 25));

        assert!(queue.remove(&RewardId::new("zzz")).is_none());
        assert_eq!(queue.len(), 1);
        assert!(queue.remove(&RewardId::new("a")).is_some());
        assert!(queue.is_empty());
    }
}
