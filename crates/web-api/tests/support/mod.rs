use std::sync::Arc;
use std::time::Duration;

use application::{
    repository::memory::{MemoryMessageRepository, MemoryParticipantRepository},
    IdleReaper, IdleReaperDependencies, ManualClock, MessageService, MessageServiceDependencies,
    ParticipantService, ParticipantServiceDependencies, ReaperSettings,
};
use axum::Router;
use tokio::{net::TcpListener, sync::oneshot};
use web_api::{router, AppState};

/// Everything a test needs: the router plus direct handles on the clock and
/// the reaper so presence tests can drive time and eviction cycles
/// synchronously instead of sleeping on wall-clock schedules.
pub struct TestApp {
    pub router: Router,
    pub reaper: IdleReaper,
    pub clock: Arc<ManualClock>,
}

pub fn build_app() -> TestApp {
    let participants = Arc::new(MemoryParticipantRepository::new());
    let messages = Arc::new(MemoryMessageRepository::new());
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));

    let participant_service = ParticipantService::new(ParticipantServiceDependencies {
        participant_repository: participants.clone(),
        message_repository: messages.clone(),
        clock: clock.clone(),
    });
    let message_service = MessageService::new(MessageServiceDependencies {
        participant_repository: participants.clone(),
        message_repository: messages.clone(),
        clock: clock.clone(),
    });
    let reaper = IdleReaper::new(
        IdleReaperDependencies {
            participant_repository: participants,
            message_repository: messages,
            clock: clock.clone(),
        },
        ReaperSettings {
            interval: Duration::from_secs(15),
            idle_after: Duration::from_secs(10),
        },
    );

    let state = AppState::new(Arc::new(participant_service), Arc::new(message_service));

    TestApp {
        router: router(state),
        reaper,
        clock,
    }
}

/// Bind an ephemeral port and serve the router in the background. Dropping
/// the returned sender shuts the server down.
pub async fn serve(router: Router) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    (format!("http://{}", addr), shutdown_tx)
}
