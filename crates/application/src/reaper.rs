use std::sync::Arc;
use std::time::Duration;

use domain::{Message, MessageId, RepositoryError, LEFT_NOTICE};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    clock::Clock,
    repository::{MessageRepository, ParticipantRepository},
};

#[derive(Debug, Clone, Copy)]
pub struct ReaperSettings {
    /// How often an eviction cycle runs.
    pub interval: Duration,
    /// Idle gap beyond which a participant is evicted.
    pub idle_after: Duration,
}

impl Default for ReaperSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            idle_after: Duration::from_secs(10),
        }
    }
}

pub struct IdleReaperDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Periodic eviction of idle participants. Each eviction deletes the
/// presence record and appends a broadcast "left" status notice; failures are
/// logged per participant and never stop the cycle or the schedule.
pub struct IdleReaper {
    deps: IdleReaperDependencies,
    settings: ReaperSettings,
}

impl IdleReaper {
    pub fn new(deps: IdleReaperDependencies, settings: ReaperSettings) -> Self {
        Self { deps, settings }
    }

    /// Run one eviction pass over a snapshot of the registry. Returns how
    /// many participants were evicted. Callable directly so tests drive the
    /// schedule themselves.
    pub async fn run_cycle(&self) -> usize {
        let snapshot = match self.deps.participant_repository.list().await {
            Ok(list) => list,
            Err(err) => {
                tracing::error!(error = %err, "failed to snapshot participants, skipping cycle");
                return 0;
            }
        };

        let now = self.deps.clock.now();
        let mut evicted = 0;

        for participant in snapshot {
            if !participant.is_idle(now, self.settings.idle_after) {
                continue;
            }

            match self.deps.participant_repository.delete(participant.id).await {
                Ok(()) => {}
                Err(RepositoryError::NotFound) => {
                    // Already gone; someone else removed it. No notice.
                    tracing::debug!(participant = %participant.name, "stale participant already removed");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(
                        participant = %participant.name,
                        error = %err,
                        "failed to evict idle participant"
                    );
                    continue;
                }
            }

            let notice = Message::status(
                MessageId::from(Uuid::new_v4()),
                participant.name.clone(),
                LEFT_NOTICE,
                now,
            );
            if let Err(err) = self.deps.message_repository.insert(notice).await {
                tracing::warn!(
                    participant = %participant.name,
                    error = %err,
                    "failed to append departure notice"
                );
            }

            evicted += 1;
            tracing::info!(participant = %participant.name, "evicted idle participant");
        }

        evicted
    }

    /// Start the periodic schedule. The first cycle runs one full interval
    /// after startup.
    pub fn spawn(self: Arc<Self>) -> ReaperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.settings.interval);
            // the first tick of a tokio interval completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        ReaperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Stop the schedule and wait for the task to wind down.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
