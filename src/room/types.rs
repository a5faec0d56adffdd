use serde::{Deserialize, Serialize};

use super::models::{RoomModel, RoomPhase, RosterEntry};

/// Response for POST /room
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_key: String,
}

/// Snapshot of a live room for the HTTP API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_key: String,
    pub phase: RoomPhase,
    pub video_id: String,
    pub playback: bool,
    pub playhead: f64,
    pub host_id: Option<String>,
    pub roster: Vec<RosterEntry>,
}

impl From<&RoomModel> for RoomResponse {
    fn from(room: &RoomModel) -> Self {
        Self {
            room_key: room.key.clone(),
            phase: room.phase(),
            video_id: room.video_id.clone(),
            playback: room.is_playing,
            playhead: room.playhead,
            host_id: room.host_id.clone(),
            roster: room.roster(),
        }
    }
}
