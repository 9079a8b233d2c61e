//! Headless overlay renderer
//!
//! Logs every overlay transition and answers claim prompts on its own after
//! a short pause, standing in for the user pressing "Claim".

use gamegreeneco_core::{Level, RewardEvent, RewardKind};
use gamegreeneco_engine::presentation::{Overlay, OverlayRenderer};
use gamegreeneco_engine::{RewardQueueService, Scheduler};
use std::time::Duration;
use tracing::{debug, info};

pub const AUTO_CLAIM_DELAY: Duration = Duration::from_millis(1_500);

pub struct ConsoleRenderer {
    rewards: RewardQueueService,
    scheduler: Scheduler,
    claim_delay: Duration,
}

impl ConsoleRenderer {
    pub fn new(rewards: RewardQueueService, scheduler: Scheduler) -> Self {
        Self {
            rewards,
            scheduler,
            claim_delay: AUTO_CLAIM_DELAY,
        }
    }
}

impl OverlayRenderer for ConsoleRenderer {
    fn show(&self, reward: &RewardEvent, overlay: Overlay) {
        match overlay {
            Overlay::LessonComplete => info!("Lesson complete: {}", reward.title),
            Overlay::MissionComplete => info!("Mission: {}", reward.title),
            Overlay::LevelUp => match reward.kind {
                RewardKind::LevelUp { from, to } => {
                    info!("{} (level {} -> {})", reward.title, from, to)
                }
                _ => info!("{}", reward.title),
            },
            Overlay::ClaimPoints => {
                info!("+{} eco points ready to claim ({})", reward.points, reward.title);
                let rewards = self.rewards.clone();
                let id = reward.id.clone();
                self.scheduler.schedule(self.claim_delay, async move {
                    if rewards.claim_reward(&id) {
                        debug!("Auto-claimed {}", id);
                    }
                });
            }
        }
    }

    fn level_tick(&self, _reward: &RewardEvent, level: Level) {
        info!("  Level {}", level);
    }

    fn hide(&self, reward: &RewardEvent, overlay: Overlay) {
        debug!("Overlay {} closed for \"{}\"", overlay.label(), reward.title);
    }
}
