//! Cancellable delayed tasks
//!
//! Every timer in the reward flow (claim grace, overlay display, delayed
//! level-up) goes through a `Scheduler`. Cancelling a scheduler cancels every
//! task scheduled on it and on its scopes; a `ScheduleScope` cancels its own
//! tasks when dropped, which ties timers to whatever owns the scope.

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Spawns delayed tasks that share one cancellation tree
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }

    /// Run `task` after `delay` unless cancelled first.
    /// Cancellation also interrupts a task that has already started.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.cancel.child_token();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tokio::select! {
                        _ = task_token.cancelled() => {}
                        _ = task => {}
                    }
                }
            }
        });

        ScheduledTask { cancel: token, handle }
    }

    /// Child scheduler whose tasks are cancelled when the scope is dropped
    pub fn scope(&self) -> ScheduleScope {
        let scheduler = Scheduler {
            cancel: self.cancel.child_token(),
        };
        ScheduleScope {
            _guard: scheduler.cancel.clone().drop_guard(),
            scheduler,
        }
    }

    /// Cancel every pending and running task (session teardown)
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that fires on shutdown, for long-running loops
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Handle to one scheduled task; dropping it leaves the task running
#[derive(Debug)]
pub struct ScheduledTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the task ran or was cancelled
    pub async fn finished(self) {
        let _ = self.handle.await;
    }
}

/// Scheduler scope cancelled on drop
#[derive(Debug)]
pub struct ScheduleScope {
    scheduler: Scheduler,
    _guard: DropGuard,
}

impl Deref for ScheduleScope {
    type Target = Scheduler;

    fn deref(&self) -> &Scheduler {
        &self.scheduler
    }
}
