use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::room::RosterEntry;
use crate::websockets::messages::{
    ChangeVideoPayload, ClientMessage, ForceResyncPayload, JoinRoomPayload, LeaveRoomPayload,
    PlayheadPayload, ServerMessage, SyncPlayPayload,
};

use super::adapter::{PlaybackAdapter, PlaybackState};

/// How far ahead of "now" a sync-play is scheduled, giving every client
/// time to receive it
pub const SYNC_PLAY_LEAD_MS: i64 = 2000;

/// Time left until `target_time_ms` (ms since epoch), zero if already due
pub fn play_delay(target_time_ms: f64, now: DateTime<Utc>) -> Duration {
    let remaining = target_time_ms - now.timestamp_millis() as f64;
    if remaining.is_finite() && remaining > 0.0 {
        Duration::from_millis(remaining.ceil() as u64)
    } else {
        Duration::ZERO
    }
}

/// Keeps one local player converging on the room's timeline
pub struct PlaybackController<P: PlaybackAdapter> {
    player: P,
    room_key: String,
    video_id: String,
    host_id: Option<String>,
    roster: Vec<RosterEntry>,
    state: PlaybackState,
    scheduled_play: Option<f64>,
}

impl<P: PlaybackAdapter> PlaybackController<P> {
    pub fn new(player: P, room_key: impl Into<String>) -> Self {
        Self {
            player,
            room_key: room_key.into(),
            video_id: String::new(),
            host_id: None,
            roster: Vec::new(),
            state: PlaybackState::Paused,
            scheduled_play: None,
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn room_key(&self) -> &str {
        &self.room_key
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    /// A sync-play has been received and is waiting for its target time
    pub fn is_syncing(&self) -> bool {
        self.scheduled_play.is_some()
    }

    /// State-change notification from the widget
    pub fn on_state_change(&mut self, state: PlaybackState) {
        self.state = state;
    }

    pub fn can_sync_play(&self) -> bool {
        !self.video_id.is_empty() && !self.is_syncing() && self.state == PlaybackState::Paused
    }

    pub fn can_pause(&self) -> bool {
        !self.video_id.is_empty()
            && matches!(
                self.state,
                PlaybackState::Playing | PlaybackState::Buffering
            )
    }

    pub fn join_room(&self, display_name: Option<&str>) -> ClientMessage {
        ClientMessage::JoinRoom(JoinRoomPayload {
            room_key: self.room_key.clone(),
            display_name: display_name.map(str::to_string),
        })
    }

    pub fn leave_room(&self) -> ClientMessage {
        ClientMessage::LeaveRoom(LeaveRoomPayload {
            room_key: self.room_key.clone(),
        })
    }

    pub fn change_video(&self, video_id: &str) -> ClientMessage {
        ClientMessage::ChangeVideo(ChangeVideoPayload {
            room_key: self.room_key.clone(),
            video_id: video_id.to_string(),
        })
    }

    pub fn sync_play(&self, now: DateTime<Utc>) -> ClientMessage {
        let target_time = (now.timestamp_millis() + SYNC_PLAY_LEAD_MS) as f64;
        ClientMessage::SyncPlay(SyncPlayPayload {
            room_key: self.room_key.clone(),
            target_time,
        })
    }

    pub fn pause(&self) -> ClientMessage {
        ClientMessage::Pause(PlayheadPayload {
            room_key: self.room_key.clone(),
            current_time: self.player.current_time(),
        })
    }

    /// Seeks locally right away; the server only relays to the others
    pub fn seek(&mut self, seconds: f64) -> ClientMessage {
        self.player.seek_to(seconds);
        ClientMessage::Seek(PlayheadPayload {
            room_key: self.room_key.clone(),
            current_time: seconds,
        })
    }

    /// Re-anchors everyone on this player's position and state
    pub fn force_resync(&self, ack_id: Option<String>) -> ClientMessage {
        ClientMessage::ForceResync(ForceResyncPayload {
            room_key: self.room_key.clone(),
            current_time: self.player.current_time(),
            should_play: self.player.playback_state() == PlaybackState::Playing,
            ack_id,
        })
    }

    /// Applies one server message to the player.
    ///
    /// Returns how long to wait before calling [`Self::fire_scheduled_play`]
    /// when a sync-play target lies in the future.
    pub fn apply(&mut self, message: &ServerMessage, now: DateTime<Utc>) -> Option<Duration> {
        match message {
            ServerMessage::RoomState(state) => {
                self.roster = state.roster.clone();
                self.host_id = state.host_id.clone();
                self.scheduled_play = None;
                self.switch_video(&state.video_id);
                if !state.video_id.is_empty() {
                    self.player.seek_to(state.playhead);
                    if state.playback {
                        self.player.play();
                    } else {
                        self.player.pause();
                    }
                }
                None
            }
            ServerMessage::UserJoined(joined) => {
                self.roster = joined.roster.clone();
                self.host_id = joined
                    .roster
                    .iter()
                    .find(|entry| entry.is_host)
                    .map(|entry| entry.connection_id.clone());
                None
            }
            ServerMessage::UserLeft(left) => {
                self.roster = left.roster.clone();
                self.host_id = left.host_id.clone();
                None
            }
            ServerMessage::VideoChanged(changed) => {
                self.scheduled_play = None;
                self.switch_video(&changed.video_id);
                None
            }
            ServerMessage::PlaySynced(synced) => {
                let delay = play_delay(synced.target_time, now);
                if delay.is_zero() {
                    self.player.play();
                    None
                } else {
                    self.scheduled_play = Some(synced.target_time);
                    Some(delay)
                }
            }
            ServerMessage::Paused(paused) => {
                self.scheduled_play = None;
                self.player.pause();
                self.player.seek_to(paused.current_time);
                None
            }
            ServerMessage::Seeked(seeked) => {
                self.player.seek_to(seeked.current_time);
                None
            }
            ServerMessage::SyncedToTime(synced) => {
                self.scheduled_play = None;
                self.player.seek_to(synced.current_time);
                if synced.should_play {
                    self.player.play();
                } else {
                    self.player.pause();
                }
                None
            }
            ServerMessage::Ack(ack) => {
                debug!(ack_id = %ack.ack_id, accepted = ack.accepted, "Resync acknowledged");
                None
            }
        }
    }

    /// Starts a pending sync-play once its target time has been reached
    pub fn fire_scheduled_play(&mut self, now: DateTime<Utc>) -> bool {
        match self.scheduled_play {
            Some(target) if play_delay(target, now).is_zero() => {
                self.scheduled_play = None;
                self.player.play();
                true
            }
            _ => false,
        }
    }

    fn switch_video(&mut self, video_id: &str) {
        if video_id.is_empty() {
            if !self.video_id.is_empty() {
                self.player.unload();
            }
        } else {
            self.player.load_video(video_id);
        }
        self.video_id = video_id.to_string();
    }
}
