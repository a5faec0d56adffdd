use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument, warn};

use super::{
    key::{generate_room_key, normalize_room_key},
    types::{CreateRoomResponse, RoomResponse},
};
use crate::shared::{AppError, AppState};

/// Attempts at finding a key no live room uses before giving up
const MAX_KEY_ATTEMPTS: usize = 16;

/// HTTP handler for reserving a fresh room key
///
/// POST /room
/// The room itself only comes into existence when the first client joins it.
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    for _ in 0..MAX_KEY_ATTEMPTS {
        let room_key = generate_room_key();
        if state.room_repository.get_room(&room_key).await?.is_none() {
            info!(room_key = %room_key, "Generated room key");
            return Ok(Json(CreateRoomResponse { room_key }));
        }
    }

    warn!("Could not find an unused room key");
    Err(AppError::Internal(
        "Could not generate an unused room key".to_string(),
    ))
}

/// HTTP handler for inspecting a live room
///
/// GET /room/{room_key}
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_key): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room_key =
        normalize_room_key(&room_key).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let room = state
        .room_repository
        .get_room(&room_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_key)))?;

    Ok(Json(RoomResponse::from(&room)))
}

/// HTTP handler for listing all live rooms
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = state.room_repository.list_rooms().await?;

    info!(room_count = rooms.len(), "Rooms listed");

    Ok(Json(rooms.iter().map(RoomResponse::from).collect()))
}
