use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    room::{RoomModel, RoomPhase, RoomRepository},
    websockets::{
        connection_manager::ConnectionManager,
        messages::{
            AckPayload, PlaySyncedPayload, PlayheadUpdatePayload, ServerMessage,
            SyncedToTimePayload, VideoChangedPayload,
        },
    },
};

use super::{
    shared::{Audience, MessageBroadcaster},
    RoomEventError,
};

/// change-video, sync-play, pause, seek and force-resync
pub struct PlaybackEventHandlers {
    room_repository: Arc<dyn RoomRepository>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl PlaybackEventHandlers {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_repository,
            connection_manager,
        }
    }

    /// The room named by the event, if it exists and the sender is in it
    async fn sender_room(
        &self,
        connection_id: &str,
        room_key: &str,
    ) -> Result<Option<RoomModel>, RoomEventError> {
        let room = match self.room_repository.get_room(room_key).await? {
            Some(room) => room,
            None => {
                info!(
                    room_key = %room_key,
                    connection_id = %connection_id,
                    "Event for unknown room, dropping"
                );
                return Ok(None);
            }
        };

        if !room.has_participant(connection_id) {
            info!(
                room_key = %room_key,
                connection_id = %connection_id,
                "Event from a connection outside the room, dropping"
            );
            return Ok(None);
        }

        Ok(Some(room))
    }

    /// Like `sender_room`, but also requires a loaded video
    async fn loaded_room(
        &self,
        connection_id: &str,
        room_key: &str,
        message_type: &str,
    ) -> Result<Option<RoomModel>, RoomEventError> {
        let room = self.sender_room(connection_id, room_key).await?;
        match room {
            Some(room) if room.phase() == RoomPhase::Idle => {
                debug!(
                    room_key = %room_key,
                    message_type = message_type,
                    "No video loaded, dropping playback command"
                );
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub async fn handle_change_video(
        &self,
        connection_id: &str,
        room_key: &str,
        video_id: &str,
    ) -> Result<(), RoomEventError> {
        let Some(mut room) = self.sender_room(connection_id, room_key).await? else {
            return Ok(());
        };

        room.load_video(video_id);
        self.room_repository.save_room(&room).await?;

        info!(room_key = %room_key, video_id = %video_id, "Video changed");

        let message = ServerMessage::VideoChanged(VideoChangedPayload {
            video_id: video_id.to_string(),
        });
        MessageBroadcaster::broadcast(
            &self.connection_manager,
            &room,
            connection_id,
            Audience::WholeRoom,
            &message,
        )
        .await
    }

    pub async fn handle_sync_play(
        &self,
        connection_id: &str,
        room_key: &str,
        target_time: f64,
    ) -> Result<(), RoomEventError> {
        let Some(mut room) = self.loaded_room(connection_id, room_key, "sync-play").await? else {
            return Ok(());
        };

        room.start_playback();
        self.room_repository.save_room(&room).await?;

        // The target is relayed untouched; clock skew between clients is accepted
        info!(room_key = %room_key, target_time = target_time, "Sync play");

        let message = ServerMessage::PlaySynced(PlaySyncedPayload { target_time });
        MessageBroadcaster::broadcast(
            &self.connection_manager,
            &room,
            connection_id,
            Audience::WholeRoom,
            &message,
        )
        .await
    }

    pub async fn handle_pause(
        &self,
        connection_id: &str,
        room_key: &str,
        current_time: f64,
    ) -> Result<(), RoomEventError> {
        let Some(mut room) = self.loaded_room(connection_id, room_key, "pause").await? else {
            return Ok(());
        };

        room.pause_at(current_time);
        self.room_repository.save_room(&room).await?;

        info!(room_key = %room_key, current_time = current_time, "Paused");

        let message = ServerMessage::Paused(PlayheadUpdatePayload { current_time });
        MessageBroadcaster::broadcast(
            &self.connection_manager,
            &room,
            connection_id,
            Audience::WholeRoom,
            &message,
        )
        .await
    }

    pub async fn handle_seek(
        &self,
        connection_id: &str,
        room_key: &str,
        current_time: f64,
    ) -> Result<(), RoomEventError> {
        let Some(mut room) = self.loaded_room(connection_id, room_key, "seek").await? else {
            return Ok(());
        };

        room.seek_to(current_time);
        self.room_repository.save_room(&room).await?;

        info!(room_key = %room_key, current_time = current_time, "Seeked");

        // The sender's player is already at the new position
        let message = ServerMessage::Seeked(PlayheadUpdatePayload { current_time });
        MessageBroadcaster::broadcast(
            &self.connection_manager,
            &room,
            connection_id,
            Audience::RoomExceptSender,
            &message,
        )
        .await
    }

    pub async fn handle_force_resync(
        &self,
        connection_id: &str,
        room_key: &str,
        current_time: f64,
        should_play: bool,
        ack_id: Option<&str>,
    ) -> Result<(), RoomEventError> {
        let accepted = self
            .apply_force_resync(connection_id, room_key, current_time, should_play)
            .await?;

        if let Some(ack_id) = ack_id {
            let ack = ServerMessage::Ack(AckPayload {
                ack_id: ack_id.to_string(),
                accepted,
            });
            MessageBroadcaster::send_to_connection(&self.connection_manager, connection_id, &ack)
                .await?;
        }

        Ok(())
    }

    async fn apply_force_resync(
        &self,
        connection_id: &str,
        room_key: &str,
        current_time: f64,
        should_play: bool,
    ) -> Result<bool, RoomEventError> {
        let Some(mut room) = self
            .loaded_room(connection_id, room_key, "force-resync")
            .await?
        else {
            return Ok(false);
        };

        room.resync(current_time, should_play);
        self.room_repository.save_room(&room).await?;

        info!(
            room_key = %room_key,
            current_time = current_time,
            should_play = should_play,
            "Force resync"
        );

        let message = ServerMessage::SyncedToTime(SyncedToTimePayload {
            current_time,
            should_play,
        });
        MessageBroadcaster::broadcast(
            &self.connection_manager,
            &room,
            connection_id,
            Audience::WholeRoom,
            &message,
        )
        .await?;

        Ok(true)
    }
}
