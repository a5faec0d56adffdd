use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    room::{
        membership::display_name_or_default, JoinRoomResult, LeaveRoomResult, MembershipManager,
        RoomModel,
    },
    websockets::{
        connection_manager::ConnectionManager,
        messages::{RoomStatePayload, ServerMessage, UserJoinedPayload, UserLeftPayload},
    },
};

use super::{
    shared::{Audience, MessageBroadcaster},
    RoomEventError,
};

/// join-room, leave-room and disconnect
pub struct MembershipEventHandlers {
    membership: Arc<MembershipManager>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl MembershipEventHandlers {
    pub fn new(
        membership: Arc<MembershipManager>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            membership,
            connection_manager,
        }
    }

    pub async fn handle_join(
        &self,
        connection_id: &str,
        room_key: &str,
        display_name: Option<&str>,
    ) -> Result<(), RoomEventError> {
        // A connection is in at most one room
        if let Some(current) = self.membership.current_room(connection_id).await {
            if current != room_key {
                info!(
                    connection_id = %connection_id,
                    from_room = %current,
                    to_room = %room_key,
                    "Switching rooms, leaving current room first"
                );
                self.handle_leave(connection_id, &current).await?;
            }
        }

        let display_name = display_name_or_default(display_name, connection_id);

        match self
            .membership
            .join(room_key, connection_id, &display_name)
            .await?
        {
            JoinRoomResult::Joined { room, participant } => {
                MessageBroadcaster::send_to_connection(
                    &self.connection_manager,
                    connection_id,
                    &room_state(&room),
                )
                .await?;

                let joined = ServerMessage::UserJoined(UserJoinedPayload {
                    joined_name: participant.display_name,
                    roster: room.roster(),
                });
                MessageBroadcaster::broadcast(
                    &self.connection_manager,
                    &room,
                    connection_id,
                    Audience::RoomExceptSender,
                    &joined,
                )
                .await?;
            }
            JoinRoomResult::AlreadyJoined { room, .. } => {
                debug!(
                    room_key = %room_key,
                    connection_id = %connection_id,
                    "Repeated join, resending room state only"
                );
                MessageBroadcaster::send_to_connection(
                    &self.connection_manager,
                    connection_id,
                    &room_state(&room),
                )
                .await?;
            }
        }

        Ok(())
    }

    pub async fn handle_leave(
        &self,
        connection_id: &str,
        room_key: &str,
    ) -> Result<(), RoomEventError> {
        match self.membership.leave(room_key, connection_id).await? {
            LeaveRoomResult::Left {
                room, participant, ..
            } => {
                let left = ServerMessage::UserLeft(UserLeftPayload {
                    left_name: participant.display_name,
                    host_id: room.host_id.clone(),
                    roster: room.roster(),
                });
                // The leaver is already off the roster
                MessageBroadcaster::broadcast(
                    &self.connection_manager,
                    &room,
                    connection_id,
                    Audience::WholeRoom,
                    &left,
                )
                .await?;
            }
            LeaveRoomResult::RoomDeleted { .. } => {
                debug!(room_key = %room_key, "Room deleted, nobody to notify");
            }
            LeaveRoomResult::PlayerNotInRoom | LeaveRoomResult::RoomNotFound => {
                debug!(
                    room_key = %room_key,
                    connection_id = %connection_id,
                    "Leave for a room the connection is not in, dropping"
                );
            }
        }

        Ok(())
    }

    pub async fn handle_disconnect(&self, connection_id: &str) -> Result<(), RoomEventError> {
        match self.membership.current_room(connection_id).await {
            Some(room_key) => self.handle_leave(connection_id, &room_key).await,
            None => {
                debug!(connection_id = %connection_id, "Disconnected without joining a room");
                Ok(())
            }
        }
    }
}

fn room_state(room: &RoomModel) -> ServerMessage {
    ServerMessage::RoomState(RoomStatePayload {
        video_id: room.video_id.clone(),
        playback: room.is_playing,
        playhead: room.playhead,
        host_id: room.host_id.clone(),
        roster: room.roster(),
    })
}
