use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::{
    models::{Participant, RoomModel, RosterEntry},
    repository::RoomRepository,
};
use crate::shared::AppError;

/// Result of adding a connection to a room
#[derive(Debug, Clone)]
pub enum JoinRoomResult {
    /// Appended to the roster; returns the updated room
    Joined {
        room: RoomModel,
        participant: RosterEntry,
    },
    /// The connection was already on this room's roster
    AlreadyJoined {
        room: RoomModel,
        participant: RosterEntry,
    },
}

/// Result of removing a connection from a room
#[derive(Debug, Clone)]
pub enum LeaveRoomResult {
    /// Removed; the room still has participants
    Left {
        room: RoomModel,
        participant: Participant,
        /// Set when the departing participant was host
        new_host: Option<String>,
    },
    /// Removed the last participant, so the room was deleted
    RoomDeleted { participant: Participant },
    PlayerNotInRoom,
    RoomNotFound,
}

/// Display name used when a client joins without one
pub fn display_name_or_default(display_name: Option<&str>, connection_id: &str) -> String {
    match display_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let prefix: String = connection_id.chars().take(4).collect();
            format!("User-{}", prefix)
        }
    }
}

/// Adds and removes participants and tracks which room each connection is in
pub struct MembershipManager {
    room_repository: Arc<dyn RoomRepository>,
    // connection id -> room key
    memberships: RwLock<HashMap<String, String>>,
}

impl MembershipManager {
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self {
            room_repository,
            memberships: RwLock::new(HashMap::new()),
        }
    }

    /// Room the connection currently belongs to, if any
    pub async fn current_room(&self, connection_id: &str) -> Option<String> {
        self.memberships.read().await.get(connection_id).cloned()
    }

    #[instrument(skip(self))]
    pub async fn join(
        &self,
        room_key: &str,
        connection_id: &str,
        display_name: &str,
    ) -> Result<JoinRoomResult, AppError> {
        let mut room = self.room_repository.get_or_create(room_key).await?;

        if let Some(participant) = room.roster_entry(connection_id) {
            debug!(
                room_key = %room_key,
                connection_id = %connection_id,
                "Connection already in room"
            );
            return Ok(JoinRoomResult::AlreadyJoined { room, participant });
        }

        room.add_participant(Participant {
            connection_id: connection_id.to_string(),
            display_name: display_name.to_string(),
        });
        self.room_repository.save_room(&room).await?;

        self.memberships
            .write()
            .await
            .insert(connection_id.to_string(), room_key.to_string());

        let participant = room
            .roster_entry(connection_id)
            .ok_or_else(|| AppError::Internal("participant missing after join".to_string()))?;

        info!(
            room_key = %room_key,
            connection_id = %connection_id,
            display_name = %display_name,
            is_host = participant.is_host,
            participants = room.participant_count(),
            "Participant joined room"
        );

        Ok(JoinRoomResult::Joined { room, participant })
    }

    #[instrument(skip(self))]
    pub async fn leave(
        &self,
        room_key: &str,
        connection_id: &str,
    ) -> Result<LeaveRoomResult, AppError> {
        self.forget(room_key, connection_id).await;

        let mut room = match self.room_repository.get_room(room_key).await? {
            Some(room) => room,
            None => {
                debug!(room_key = %room_key, "Room not found");
                return Ok(LeaveRoomResult::RoomNotFound);
            }
        };

        let was_host = room.is_host(connection_id);
        let participant = match room.remove_participant(connection_id) {
            Some(participant) => participant,
            None => {
                debug!(
                    room_key = %room_key,
                    connection_id = %connection_id,
                    "Connection not in room"
                );
                return Ok(LeaveRoomResult::PlayerNotInRoom);
            }
        };

        if room.is_empty() {
            self.room_repository.delete_room(room_key).await?;
            info!(
                room_key = %room_key,
                connection_id = %connection_id,
                "Last participant left, room deleted"
            );
            return Ok(LeaveRoomResult::RoomDeleted { participant });
        }

        self.room_repository.save_room(&room).await?;

        let new_host = if was_host { room.host_id.clone() } else { None };
        if let Some(new_host) = &new_host {
            info!(
                room_key = %room_key,
                old_host = %connection_id,
                new_host = %new_host,
                "Host left, promoted earliest remaining participant"
            );
        }

        info!(
            room_key = %room_key,
            connection_id = %connection_id,
            participants = room.participant_count(),
            "Participant left room"
        );

        Ok(LeaveRoomResult::Left {
            room,
            participant,
            new_host,
        })
    }

    async fn forget(&self, room_key: &str, connection_id: &str) {
        let mut memberships = self.memberships.write().await;
        if memberships.get(connection_id).map(String::as_str) == Some(room_key) {
            memberships.remove(connection_id);
        }
    }
}
