use std::sync::Arc;
use tracing::debug;

use crate::{
    room::RoomModel,
    websockets::{
        connection_manager::ConnectionManager, event_handlers::RoomEventError,
        messages::ServerMessage,
    },
};

/// Who in a room receives a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only the connection that sent the event
    Sender,
    /// Everyone in the room except the sender
    RoomExceptSender,
    /// Everyone in the room, the sender included
    WholeRoom,
}

impl Audience {
    pub fn resolve(self, room: &RoomModel, sender: &str) -> Vec<String> {
        match self {
            Audience::Sender => vec![sender.to_string()],
            Audience::RoomExceptSender => room
                .connection_ids()
                .into_iter()
                .filter(|id| id != sender)
                .collect(),
            Audience::WholeRoom => room.connection_ids(),
        }
    }
}

pub struct MessageBroadcaster;

impl MessageBroadcaster {
    pub async fn send_to_connection(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection_id: &str,
        message: &ServerMessage,
    ) -> Result<(), RoomEventError> {
        let frame = Self::encode(message)?;
        connection_manager
            .send_to_connection(connection_id, &frame)
            .await;
        Ok(())
    }

    pub async fn broadcast(
        connection_manager: &Arc<dyn ConnectionManager>,
        room: &RoomModel,
        sender: &str,
        audience: Audience,
        message: &ServerMessage,
    ) -> Result<(), RoomEventError> {
        let recipients = audience.resolve(room, sender);
        if recipients.is_empty() {
            return Ok(());
        }

        let frame = Self::encode(message)?;
        connection_manager
            .send_to_connections(&recipients, &frame)
            .await;

        debug!(
            room_key = %room.key,
            message_type = message.message_type(),
            recipients = recipients.len(),
            "Broadcast sent"
        );
        Ok(())
    }

    fn encode(message: &ServerMessage) -> Result<String, RoomEventError> {
        message.to_frame().map_err(|e| {
            RoomEventError::HandlerError(format!("Failed to serialize message: {}", e))
        })
    }
}
