use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::models::RoomModel;
use crate::shared::AppError;

/// Process-wide store of live rooms, keyed by normalized room key
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Returns the existing room or inserts a new empty one
    async fn get_or_create(&self, room_key: &str) -> Result<RoomModel, AppError>;

    async fn get_room(&self, room_key: &str) -> Result<Option<RoomModel>, AppError>;

    /// Writes back a room obtained from this repository
    async fn save_room(&self, room: &RoomModel) -> Result<(), AppError>;

    /// Removes a room, returning whether it existed
    async fn delete_room(&self, room_key: &str) -> Result<bool, AppError>;

    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;
}

/// In-memory implementation of RoomRepository; rooms never outlive the process
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self))]
    async fn get_or_create(&self, room_key: &str) -> Result<RoomModel, AppError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_key.to_string()).or_insert_with(|| {
            info!(room_key = %room_key, "Creating room");
            RoomModel::new(room_key)
        });
        Ok(room.clone())
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_key: &str) -> Result<Option<RoomModel>, AppError> {
        let rooms = self.rooms.read().await;
        let room = rooms.get(room_key).cloned();

        if room.is_none() {
            debug!(room_key = %room_key, "Room not found in memory");
        }

        Ok(room)
    }

    #[instrument(skip(self, room), fields(room_key = %room.key))]
    async fn save_room(&self, room: &RoomModel) -> Result<(), AppError> {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room.key.clone(), room.clone());
        debug!(
            participants = room.participant_count(),
            phase = ?room.phase(),
            "Room saved"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_key: &str) -> Result<bool, AppError> {
        let mut rooms = self.rooms.write().await;
        let existed = rooms.remove(room_key).is_some();
        if existed {
            info!(room_key = %room_key, "Room deleted");
        }
        Ok(existed)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rooms = self.rooms.read().await;
        Ok(rooms.values().cloned().collect())
    }
}
