//! One headless session: sign in, surface rewards, sign out

use crate::{AppConfig, AppState};
use anyhow::Context;
use gamegreeneco_core::{LeaderboardScope, LessonStatus, Profile, UserId};
use gamegreeneco_engine::leaderboard::{self, OrganizationStats};
use gamegreeneco_networking::api::fetch_current_profile;
use std::future::Future;
use tracing::{info, warn};

/// Run the session until the reward queue drains or Ctrl-C.
/// Once signed in, teardown and sign-out run whatever happens next.
pub async fn run(state: &AppState, config: &AppConfig) -> anyhow::Result<()> {
    let session = state
        .client
        .sign_in_with_password(&config.email, &config.password)
        .await
        .context("sign-in failed")?;

    let teardown = async {
        state.scheduler.shutdown();
        state.rewards.clear();
        state.detector.reset();
        state.client.sign_out().await.context("sign-out failed")
    };
    then_always(run_signed_in(state, &session.user_id), teardown).await
}

/// Await `work`, then `teardown` regardless of its result; the first error wins
async fn then_always<W, T>(work: W, teardown: T) -> anyhow::Result<()>
where
    W: Future<Output = anyhow::Result<()>>,
    T: Future<Output = anyhow::Result<()>>,
{
    let outcome = work.await;
    let cleaned = teardown.await;
    outcome.and(cleaned)
}

async fn run_signed_in(state: &AppState, user_id: &UserId) -> anyhow::Result<()> {
    let profile = fetch_current_profile(&state.client)
        .await
        .context("could not load profile")?;
    info!(
        "Welcome {}: {} eco points, level {}",
        profile.display_label(),
        profile.eco_points,
        profile.derived_level()
    );

    let presenter = state.presenter.spawn();
    state.detector.on_profile_loaded(user_id, profile.snapshot()).await;

    log_overview(state, &profile).await;
    wait_for_rewards(state).await;

    state.scheduler.shutdown();
    if let Err(e) = presenter.await {
        warn!("Reward presenter ended abnormally: {}", e);
    }
    Ok(())
}

async fn wait_for_rewards(state: &AppState) {
    let mut queue_rx = state.rewards.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let pending = queue_rx.borrow_and_update().len();
        if pending == 0 {
            info!("No rewards left to show");
            break;
        }

        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted with {} reward(s) pending", pending);
                break;
            }
            changed = queue_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

/// Best-effort summary; failures are logged and skipped
async fn log_overview(state: &AppState, profile: &Profile) {
    let store = state.store();
    let user_id = &profile.user_id;

    if profile.is_organization() {
        if let Some(name) = profile.organization_name.as_deref() {
            match OrganizationStats::fetch(store.as_ref(), name).await {
                Ok(stats) => info!(
                    "{}: {} students, {} eco points (avg {})",
                    name, stats.total_students, stats.total_eco_points, stats.avg_eco_points
                ),
                Err(e) => warn!("Organization stats unavailable: {}", e),
            }
            match state.reviewer.pending_reviews(name).await {
                Ok(pending) => info!("{} submission(s) awaiting review", pending.len()),
                Err(e) => warn!("Pending reviews unavailable: {}", e),
            }
        }
        return;
    }

    match state.tracker.lessons(user_id).await {
        Ok(lessons) => {
            let completed = lessons
                .iter()
                .filter(|l| l.status == LessonStatus::Completed)
                .count();
            info!("Lessons: {}/{} completed", completed, lessons.len());
        }
        Err(e) => warn!("Lessons unavailable: {}", e),
    }

    match state.tracker.mission_stats(user_id).await {
        Ok(stats) => info!(
            "Missions: {} approved, {} awaiting review, {} in progress",
            stats.completed_tasks, stats.submitted_tasks, stats.in_progress_tasks
        ),
        Err(e) => warn!("Mission stats unavailable: {}", e),
    }

    match state.profiles.badges(user_id).await {
        Ok(badges) => info!("Badges earned: {}", badges.len()),
        Err(e) => warn!("Badges unavailable: {}", e),
    }

    match leaderboard::fetch_student_leaderboard(store.as_ref(), LeaderboardScope::default()).await {
        Ok(board) => match leaderboard::user_position(&board, user_id) {
            Some(position) => info!("Leaderboard: #{} of {}", position.rank, position.total),
            None => info!("Leaderboard: not ranked yet"),
        },
        Err(e) => warn!("Leaderboard unavailable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamegreeneco_engine::Scheduler;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_teardown_runs_when_work_fails() {
        let scheduler = Scheduler::new();
        let torn_down = AtomicBool::new(false);

        let result = then_always(
            async { Err(anyhow::anyhow!("could not load profile")) },
            async {
                scheduler.shutdown();
                torn_down.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert_eq!(result.unwrap_err().to_string(), "could not load profile");
        assert!(torn_down.load(Ordering::SeqCst));
        assert!(scheduler.is_shut_down());
    }

    #[tokio::test]
    async fn test_teardown_error_surfaces_after_clean_run() {
        let result = then_always(async { Ok(()) }, async { Err(anyhow::anyhow!("sign-out failed")) }).await;
        assert_eq!(result.unwrap_err().to_string(), "sign-out failed");
    }

    #[tokio::test]
    async fn test_work_error_wins_over_teardown_error() {
        let result = then_always(
            async { Err(anyhow::anyhow!("could not load profile")) },
            async { Err(anyhow::anyhow!("sign-out failed")) },
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "could not load profile");
    }
}
