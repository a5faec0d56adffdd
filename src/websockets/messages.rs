use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::room::{normalize_room_key, RosterEntry};

/// Longest accepted video identifier
pub const MAX_VIDEO_ID_LENGTH: usize = 64;

/// Every inbound `type` tag the server understands
pub const CLIENT_MESSAGE_TYPES: &[&str] = &[
    "join-room",
    "leave-room",
    "change-video",
    "sync-play",
    "pause",
    "seek",
    "force-resync",
];

/// Why an inbound frame was dropped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("unrecognized message type: {0}")]
    UnknownType(String),

    #[error("malformed {message_type} payload: {reason}")]
    MalformedPayload {
        message_type: String,
        reason: String,
    },
}

/// Client -> Server messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(JoinRoomPayload),
    LeaveRoom(LeaveRoomPayload),
    ChangeVideo(ChangeVideoPayload),
    SyncPlay(SyncPlayPayload),
    Pause(PlayheadPayload),
    Seek(PlayheadPayload),
    ForceResync(ForceResyncPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomPayload {
    pub room_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVideoPayload {
    pub room_key: String,
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlayPayload {
    pub room_key: String,
    /// Wall-clock instant (ms since epoch) chosen by the initiating client
    pub target_time: f64,
}

/// Shared by `pause` and `seek`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayheadPayload {
    pub room_key: String,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceResyncPayload {
    pub room_key: String,
    pub current_time: f64,
    pub should_play: bool,
    /// When present the sender gets an `ack` back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<String>,
}

impl ClientMessage {
    /// Decodes and validates one inbound text frame.
    ///
    /// The room key comes back normalized. Unknown tags are rejected before
    /// payload decoding so they are logged distinctly from bad payloads.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

        let message_type = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(ProtocolError::MissingType)?
            .to_string();

        if !CLIENT_MESSAGE_TYPES.contains(&message_type.as_str()) {
            return Err(ProtocolError::UnknownType(message_type));
        }

        let mut message: ClientMessage =
            serde_json::from_value(value).map_err(|e| ProtocolError::MalformedPayload {
                message_type: message_type.clone(),
                reason: e.to_string(),
            })?;

        let malformed = |reason: String| ProtocolError::MalformedPayload {
            message_type: message_type.clone(),
            reason,
        };

        let room_key = message.room_key_mut();
        *room_key = normalize_room_key(room_key).map_err(|e| malformed(e.to_string()))?;

        if let ClientMessage::ChangeVideo(payload) = &message {
            validate_video_id(&payload.video_id).map_err(malformed)?;
        }

        Ok(message)
    }

    pub fn room_key(&self) -> &str {
        match self {
            ClientMessage::JoinRoom(p) => &p.room_key,
            ClientMessage::LeaveRoom(p) => &p.room_key,
            ClientMessage::ChangeVideo(p) => &p.room_key,
            ClientMessage::SyncPlay(p) => &p.room_key,
            ClientMessage::Pause(p) => &p.room_key,
            ClientMessage::Seek(p) => &p.room_key,
            ClientMessage::ForceResync(p) => &p.room_key,
        }
    }

    fn room_key_mut(&mut self) -> &mut String {
        match self {
            ClientMessage::JoinRoom(p) => &mut p.room_key,
            ClientMessage::LeaveRoom(p) => &mut p.room_key,
            ClientMessage::ChangeVideo(p) => &mut p.room_key,
            ClientMessage::SyncPlay(p) => &mut p.room_key,
            ClientMessage::Pause(p) => &mut p.room_key,
            ClientMessage::Seek(p) => &mut p.room_key,
            ClientMessage::ForceResync(p) => &mut p.room_key,
        }
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::JoinRoom(_) => "join-room",
            ClientMessage::LeaveRoom(_) => "leave-room",
            ClientMessage::ChangeVideo(_) => "change-video",
            ClientMessage::SyncPlay(_) => "sync-play",
            ClientMessage::Pause(_) => "pause",
            ClientMessage::Seek(_) => "seek",
            ClientMessage::ForceResync(_) => "force-resync",
        }
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Empty unloads the room; otherwise a short id of URL-safe characters
pub fn validate_video_id(video_id: &str) -> Result<(), String> {
    if video_id.len() > MAX_VIDEO_ID_LENGTH {
        return Err(format!(
            "video id longer than {} characters",
            MAX_VIDEO_ID_LENGTH
        ));
    }
    if !video_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!("video id has invalid characters: {}", video_id));
    }
    Ok(())
}

/// Server -> Client messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    RoomState(RoomStatePayload),
    UserJoined(UserJoinedPayload),
    UserLeft(UserLeftPayload),
    VideoChanged(VideoChangedPayload),
    PlaySynced(PlaySyncedPayload),
    Paused(PlayheadUpdatePayload),
    Seeked(PlayheadUpdatePayload),
    SyncedToTime(SyncedToTimePayload),
    Ack(AckPayload),
}

/// Full snapshot sent to a joining client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatePayload {
    pub video_id: String,
    pub playback: bool,
    pub playhead: f64,
    pub host_id: Option<String>,
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedPayload {
    pub joined_name: String,
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftPayload {
    pub left_name: String,
    /// Host after the departure, which may have been reassigned
    pub host_id: Option<String>,
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoChangedPayload {
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySyncedPayload {
    pub target_time: f64,
}

/// Shared by `paused` and `seeked`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayheadUpdatePayload {
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedToTimePayload {
    pub current_time: f64,
    pub should_play: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckPayload {
    pub ack_id: String,
    pub accepted: bool,
}

/// Metadata attached to every outbound frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMeta {
    pub timestamp: DateTime<Utc>,
}

impl ServerMessage {
    /// Serializes as `{type, payload, meta}`
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut value {
            let meta = FrameMeta {
                timestamp: Utc::now(),
            };
            map.insert("meta".to_string(), serde_json::to_value(meta)?);
        }
        serde_json::to_string(&value)
    }

    /// Decodes an outbound frame, ignoring its metadata
    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        let mut value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
        let message_type = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(ProtocolError::MissingType)?
            .to_string();
        if let serde_json::Value::Object(map) = &mut value {
            map.remove("meta");
        }
        serde_json::from_value(value).map_err(|e| ProtocolError::MalformedPayload {
            message_type,
            reason: e.to_string(),
        })
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::RoomState(_) => "room-state",
            ServerMessage::UserJoined(_) => "user-joined",
            ServerMessage::UserLeft(_) => "user-left",
            ServerMessage::VideoChanged(_) => "video-changed",
            ServerMessage::PlaySynced(_) => "play-synced",
            ServerMessage::Paused(_) => "paused",
            ServerMessage::Seeked(_) => "seeked",
            ServerMessage::SyncedToTime(_) => "synced-to-time",
            ServerMessage::Ack(_) => "ack",
        }
    }
}
