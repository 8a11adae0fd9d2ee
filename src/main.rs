use habit_tracker::{
    router, sync::CalendarPublisher, AppConfig, AppState, HabitRepository, JsonFileRepository,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    let repository = JsonFileRepository::new(config.data_path.clone());
    let habits = repository.load().await?;
    info!(
        path = %config.data_path.display(),
        habits = habits.len(),
        "habit data loaded"
    );

    let publisher = CalendarPublisher::new(
        config.calendar_path.clone(),
        config.sync_url.clone(),
        config.sync_timeout,
    )?;
    let state = AppState::new(habits, Arc::new(repository), publisher);
    let app = router(state);

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
