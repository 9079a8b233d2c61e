//! Application state management

use crate::console::ConsoleRenderer;
use crate::AppConfig;
use gamegreeneco_core::{EcoStore, Result};
use gamegreeneco_engine::{
    ProfileService, ProgressTracker, RewardPresenter, RewardQueueService, Scheduler, SnapshotDiffDetector,
    SubmissionReviewer,
};
use gamegreeneco_networking::BackendClient;
use gamegreeneco_persistence::sqlite;
use gamegreeneco_persistence::{Database, ProfileCache, SqliteSnapshotStore};
use std::sync::Arc;
use tracing::info;

/// Everything one signed-in session needs, wired once at startup
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<BackendClient>,
    pub scheduler: Scheduler,
    pub rewards: RewardQueueService,
    pub detector: Arc<SnapshotDiffDetector>,
    pub tracker: Arc<ProgressTracker>,
    pub reviewer: Arc<SubmissionReviewer>,
    pub profiles: Arc<ProfileService>,
    pub presenter: RewardPresenter,
}

impl AppState {
    /// Open local storage and build the service graph
    pub async fn init(config: &AppConfig) -> Result<Self> {
        let db = Database::connect(&config.database_path()).await?;
        let timings = sqlite::load_reward_timings(db.pool()).await;
        info!("Local database ready at {}", config.database_path().display());

        let cache = Arc::new(ProfileCache::default());
        let client = Arc::new(BackendClient::new_with_cache(
            &config.backend_url,
            &config.api_key,
            cache,
        )?);
        let store: Arc<dyn EcoStore> = client.clone();

        let scheduler = Scheduler::new();
        let rewards = RewardQueueService::new(scheduler.clone(), &timings);
        let detector = SnapshotDiffDetector::new(
            Arc::new(SqliteSnapshotStore::new(db)),
            rewards.clone(),
        );
        let tracker = ProgressTracker::new(store.clone(), rewards.clone(), scheduler.clone(), &timings);
        let renderer = Arc::new(ConsoleRenderer::new(rewards.clone(), scheduler.clone()));
        let presenter = RewardPresenter::new(rewards.clone(), renderer, scheduler.clone(), timings);

        Ok(Self {
            client,
            scheduler,
            rewards,
            detector: Arc::new(detector),
            tracker: Arc::new(tracker),
            reviewer: Arc::new(SubmissionReviewer::new(store.clone())),
            profiles: Arc::new(ProfileService::new(store)),
            presenter,
        })
    }

    pub fn store(&self) -> Arc<dyn EcoStore> {
        self.client.clone()
    }
}
