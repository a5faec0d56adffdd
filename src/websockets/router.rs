use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::room::{MembershipManager, RoomRepository};

use super::{
    connection_manager::ConnectionManager,
    event_handlers::{MembershipEventHandlers, PlaybackEventHandlers},
    messages::{ClientMessage, ProtocolError},
    socket::MessageHandler,
};

/// Routes inbound control events to the membership and playback handlers.
///
/// Events are handled one at a time: the dispatch lock is held from
/// validation through mutation to enqueueing the broadcasts, so every client
/// sees broadcasts in the order the room state changed.
pub struct SyncEventRouter {
    membership_events: MembershipEventHandlers,
    playback_events: PlaybackEventHandlers,
    dispatch_lock: Mutex<()>,
}

impl SyncEventRouter {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        membership: Arc<MembershipManager>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            membership_events: MembershipEventHandlers::new(
                membership,
                Arc::clone(&connection_manager),
            ),
            playback_events: PlaybackEventHandlers::new(room_repository, connection_manager),
            dispatch_lock: Mutex::new(()),
        }
    }

    /// Handles one decoded event from `connection_id`
    pub async fn route(&self, connection_id: &str, message: ClientMessage) {
        let _guard = self.dispatch_lock.lock().await;

        let message_type = message.message_type();
        let room_key = message.room_key().to_string();

        let result = match message {
            ClientMessage::JoinRoom(p) => {
                self.membership_events
                    .handle_join(connection_id, &p.room_key, p.display_name.as_deref())
                    .await
            }
            ClientMessage::LeaveRoom(p) => {
                self.membership_events
                    .handle_leave(connection_id, &p.room_key)
                    .await
            }
            ClientMessage::ChangeVideo(p) => {
                self.playback_events
                    .handle_change_video(connection_id, &p.room_key, &p.video_id)
                    .await
            }
            ClientMessage::SyncPlay(p) => {
                self.playback_events
                    .handle_sync_play(connection_id, &p.room_key, p.target_time)
                    .await
            }
            ClientMessage::Pause(p) => {
                self.playback_events
                    .handle_pause(connection_id, &p.room_key, p.current_time)
                    .await
            }
            ClientMessage::Seek(p) => {
                self.playback_events
                    .handle_seek(connection_id, &p.room_key, p.current_time)
                    .await
            }
            ClientMessage::ForceResync(p) => {
                self.playback_events
                    .handle_force_resync(
                        connection_id,
                        &p.room_key,
                        p.current_time,
                        p.should_play,
                        p.ack_id.as_deref(),
                    )
                    .await
            }
        };

        if let Err(e) = result {
            error!(
                connection_id = %connection_id,
                room_key = %room_key,
                message_type = message_type,
                error = %e,
                "Event handling failed"
            );
        }
    }

    /// Treats a closed connection as leaving its room
    pub async fn disconnect(&self, connection_id: &str) {
        let _guard = self.dispatch_lock.lock().await;

        if let Err(e) = self
            .membership_events
            .handle_disconnect(connection_id)
            .await
        {
            error!(
                connection_id = %connection_id,
                error = %e,
                "Disconnect handling failed"
            );
        }
    }
}

#[async_trait]
impl MessageHandler for SyncEventRouter {
    async fn handle_message(&self, connection_id: &str, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        match ClientMessage::parse(&message) {
            Ok(message) => self.route(connection_id, message).await,
            Err(ProtocolError::UnknownType(message_type)) => {
                warn!(
                    connection_id = %connection_id,
                    message_type = %message_type,
                    "Unrecognized message type, dropping"
                );
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Malformed message, dropping"
                );
            }
        }
    }

    async fn handle_disconnect(&self, connection_id: &str) {
        self.disconnect(connection_id).await;
    }
}
