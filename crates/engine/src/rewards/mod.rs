//! Reward queue store

mod queue;
mod service;

pub use queue::RewardQueue;
pub use service::RewardQueueService;
