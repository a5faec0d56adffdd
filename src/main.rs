use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchparty::{
    build_app, config::DEFAULT_LOG_FILTER, AppState, InMemoryConnectionManager,
    InMemoryRoomRepository, ServerConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting watch party sync server");

    let config = ServerConfig::from_env();

    // Rooms live only as long as this process
    let room_repository = Arc::new(InMemoryRoomRepository::new());
    let connection_manager = Arc::new(InMemoryConnectionManager::new());
    let app_state = AppState::new(room_repository, connection_manager);

    let app = build_app(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await
}
