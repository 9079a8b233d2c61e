//! Reward overlay presentation
//!
//! `RewardPresenter` follows the reward queue and keeps one set of overlays
//! mounted per queued reward:
//!
//! - a celebration overlay chosen by reward kind, which hides itself after
//!   its display time and removes the reward once the exit animation ends
//! - for lesson/mission rewards with points, a claim prompt that stays until
//!   the reward is claimed
//!
//! Each mounted reward owns a `ScheduleScope`. When the reward leaves the
//! queue its overlays are hidden and its pending timers are cancelled.

use crate::scheduler::ScheduleScope;
use crate::{RewardQueueService, Scheduler};
use gamegreeneco_core::{Level, RewardEvent, RewardId, RewardKind, RewardTimings};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    LessonComplete,
    MissionComplete,
    LevelUp,
    ClaimPoints,
}

impl Overlay {
    pub fn label(&self) -> &'static str {
        match self {
            Overlay::LessonComplete => "lesson_complete",
            Overlay::MissionComplete => "mission_complete",
            Overlay::LevelUp => "level_up",
            Overlay::ClaimPoints => "claim_points",
        }
    }
}

/// How one reward is presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayPlan {
    /// Auto-dismissing celebration overlay
    pub overlay: Overlay,
    pub display: Duration,
    pub exit: Duration,
    /// Levels shown one per `step` after the overlay appears
    pub level_steps: Vec<Level>,
    pub step: Duration,
    /// Whether a claim prompt is mounted alongside
    pub claim: bool,
}

pub fn plan_overlays(reward: &RewardEvent, timings: &RewardTimings) -> OverlayPlan {
    let (overlay, display, level_steps) = match reward.kind {
        RewardKind::Lesson => (Overlay::LessonComplete, timings.overlay_display(), Vec::new()),
        RewardKind::Mission => (Overlay::MissionComplete, timings.overlay_display(), Vec::new()),
        RewardKind::LevelUp { from, to } => (
            Overlay::LevelUp,
            timings.level_up_display(),
            from.steps_to(to).collect(),
        ),
    };

    OverlayPlan {
        overlay,
        display,
        exit: timings.overlay_exit(),
        level_steps,
        step: timings.level_step(),
        claim: reward.needs_claim(),
    }
}

/// Draws overlays. Calls arrive from the presenter task and from timers.
pub trait OverlayRenderer: Send + Sync {
    fn show(&self, reward: &RewardEvent, overlay: Overlay);

    /// Level-up overlay advanced to `level`
    fn level_tick(&self, reward: &RewardEvent, level: Level);

    fn hide(&self, reward: &RewardEvent, overlay: Overlay);
}

struct Mounted {
    reward: RewardEvent,
    overlay: Overlay,
    overlay_visible: Arc<AtomicBool>,
    claim_visible: bool,
    _timers: ScheduleScope,
}

/// Drives an `OverlayRenderer` from the reward queue
#[derive(Clone)]
pub struct RewardPresenter {
    rewards: RewardQueueService,
    renderer: Arc<dyn OverlayRenderer>,
    scheduler: Scheduler,
    timings: RewardTimings,
}

impl RewardPresenter {
    pub fn new(
        rewards: RewardQueueService,
        renderer: Arc<dyn OverlayRenderer>,
        scheduler: Scheduler,
        timings: RewardTimings,
    ) -> Self {
        Self {
            rewards,
            renderer,
            scheduler,
            timings,
        }
    }

    /// User acknowledged a claim prompt
    pub fn claim(&self, id: &RewardId) -> bool {
        self.rewards.claim_reward(id)
    }

    /// Run the presenter until the scheduler shuts down
    pub fn spawn(&self) -> JoinHandle<()> {
        let presenter = self.clone();
        tokio::spawn(async move { presenter.run().await })
    }

    pub async fn run(&self) {
        let mut queue_rx = self.rewards.subscribe();
        let shutdown = self.scheduler.token();
        let mut mounted: HashMap<RewardId, Mounted> = HashMap::new();

        loop {
            let queue = queue_rx.borrow_and_update().clone();
            self.reconcile(&mut mounted, &queue);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = queue_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        for (_, entry) in mounted.drain() {
            self.unmount(entry);
        }
        debug!("Reward presenter stopped");
    }

    fn reconcile(&self, mounted: &mut HashMap<RewardId, Mounted>, queue: &[RewardEvent]) {
        let live: HashSet<&RewardId> = queue.iter().map(|r| &r.id).collect();
        let gone: Vec<RewardId> = mounted
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();
        for id in gone {
            if let Some(entry) = mounted.remove(&id) {
                self.unmount(entry);
            }
        }

        for reward in queue {
            match mounted.get_mut(&reward.id) {
                Some(entry) => {
                    if reward.claimed && entry.claim_visible {
                        entry.claim_visible = false;
                        self.renderer.hide(&entry.reward, Overlay::ClaimPoints);
                    }
                }
                None => {
                    let entry = self.mount(reward);
                    mounted.insert(reward.id.clone(), entry);
                }
            }
        }
    }

    fn mount(&self, reward: &RewardEvent) -> Mounted {
        let plan = plan_overlays(reward, &self.timings);
        let timers = self.scheduler.scope();
        let overlay_visible = Arc::new(AtomicBool::new(true));

        debug!("Mounting {} for \"{}\"", plan.overlay.label(), reward.title);
        self.renderer.show(reward, plan.overlay);

        let claim_visible = plan.claim && !reward.claimed;
        if claim_visible {
            self.renderer.show(reward, Overlay::ClaimPoints);
        }

        if !plan.level_steps.is_empty() {
            let renderer = self.renderer.clone();
            let visible = overlay_visible.clone();
            let reward = reward.clone();
            let (steps, step) = (plan.level_steps.clone(), plan.step);
            timers.schedule(Duration::ZERO, async move {
                for level in steps {
                    tokio::time::sleep(step).await;
                    if !visible.load(Ordering::SeqCst) {
                        break;
                    }
                    renderer.level_tick(&reward, level);
                }
            });
        }

        {
            let renderer = self.renderer.clone();
            let rewards = self.rewards.clone();
            let visible = overlay_visible.clone();
            let reward = reward.clone();
            let (overlay, exit) = (plan.overlay, plan.exit);
            timers.schedule(plan.display, async move {
                if visible.swap(false, Ordering::SeqCst) {
                    renderer.hide(&reward, overlay);
                }
                tokio::time::sleep(exit).await;
                rewards.remove_reward(&reward.id);
            });
        }

        Mounted {
            reward: reward.clone(),
            overlay: plan.overlay,
            overlay_visible,
            claim_visible,
            _timers: timers,
        }
    }

    fn unmount(&self, entry: Mounted) {
        debug!("Unmounting \"{}\"", entry.reward.title);
        if entry.overlay_visible.swap(false, Ordering::SeqCst) {
            self.renderer.hide(&entry.reward, entry.overlay);
        }
        if entry.claim_visible {
            self.renderer.hide(&entry.reward, Overlay::ClaimPoints);
        }
    }
}
