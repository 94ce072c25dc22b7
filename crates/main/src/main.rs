//! 主应用程序入口
//!
//! 启动 Axum Web API 服务和后台闲置清理任务。

use std::{sync::Arc, time::Duration};

use application::{
    Clock, IdleReaper, IdleReaperDependencies, MessageService, MessageServiceDependencies,
    ParticipantService, ParticipantServiceDependencies, ReaperSettings, SystemClock,
};
use config::AppConfig;
use infrastructure::{create_pg_pool, PgMessageRepository, PgParticipantRepository};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();
    config.validate()?;

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );

    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    let participant_repository = Arc::new(PgParticipantRepository::new(pg_pool.clone()));
    let message_repository = Arc::new(PgMessageRepository::new(pg_pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let participant_service = ParticipantService::new(ParticipantServiceDependencies {
        participant_repository: participant_repository.clone(),
        message_repository: message_repository.clone(),
        clock: clock.clone(),
    });
    let message_service = MessageService::new(MessageServiceDependencies {
        participant_repository: participant_repository.clone(),
        message_repository: message_repository.clone(),
        clock: clock.clone(),
    });

    // 后台闲置清理任务
    let reaper = Arc::new(IdleReaper::new(
        IdleReaperDependencies {
            participant_repository,
            message_repository,
            clock,
        },
        ReaperSettings {
            interval: Duration::from_secs(config.reaper.interval_secs),
            idle_after: Duration::from_secs(config.reaper.idle_after_secs),
        },
    ));
    let reaper_handle = reaper.spawn();

    let state = AppState::new(Arc::new(participant_service), Arc::new(message_service));
    let app = router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(
        "聊天服务器启动在 http://{}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // 有序收尾：先停清理任务，再关闭连接池
    reaper_handle.shutdown().await;
    pg_pool.close().await;

    Ok(())
}
