use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::shared::AppState;

use super::socket::{Connection, MessageHandler};

/// WebSocket upgrade handler
///
/// GET /ws
/// Each upgraded socket gets a fresh connection id; rooms are joined over
/// the socket with `join-room`.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "WebSocket connection requested");

    ws.on_upgrade(move |socket| handle_websocket_connection(socket, connection_id, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    connection_id: String,
    app_state: AppState,
) {
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let message_handler: Arc<dyn MessageHandler> = app_state.event_router.clone();

    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        Arc::clone(&message_handler),
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: stop routing frames to this connection, then leave its room
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;

    message_handler.handle_disconnect(&connection_id).await;

    info!(connection_id = %connection_id, "WebSocket disconnect handled");
}
