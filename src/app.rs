use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{room, shared::AppState, websockets};

/// Builds the HTTP + WebSocket router
pub fn build_app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "watchparty" }))
        .route("/ws", get(websockets::websocket_handler))
        .route("/room", post(room::create_room))
        .route("/room/:room_key", get(room::get_room))
        .route("/rooms", get(room::list_rooms))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
