use serde::{Deserialize, Serialize};

/// A connection that has joined a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub connection_id: String,
    pub display_name: String,
}

/// Roster entry as sent to clients, with the host flag resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub connection_id: String,
    pub display_name: String,
    pub is_host: bool,
}

/// Playback phase of a live room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomPhase {
    /// No video loaded
    Idle,
    Playing,
    Paused,
}

/// In-memory state of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomModel {
    pub key: String,
    pub video_id: String,
    pub is_playing: bool,
    /// Last known position in seconds, only moved by explicit sync events
    pub playhead: f64,
    pub host_id: Option<String>,
    /// Participants in join order
    pub participants: Vec<Participant>,
}

impl RoomModel {
    /// Creates an empty room with no video and no host
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            video_id: String::new(),
            is_playing: false,
            playhead: 0.0,
            host_id: None,
            participants: Vec::new(),
        }
    }

    pub fn phase(&self) -> RoomPhase {
        if self.video_id.is_empty() {
            RoomPhase::Idle
        } else if self.is_playing {
            RoomPhase::Playing
        } else {
            RoomPhase::Paused
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn has_participant(&self, connection_id: &str) -> bool {
        self.participants
            .iter()
            .any(|p| p.connection_id == connection_id)
    }

    pub fn participant(&self, connection_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection_id == connection_id)
    }

    pub fn is_host(&self, connection_id: &str) -> bool {
        self.host_id.as_deref() == Some(connection_id)
    }

    pub fn connection_ids(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|p| p.connection_id.clone())
            .collect()
    }

    /// Appends a participant; the first one into an empty room becomes host
    pub fn add_participant(&mut self, participant: Participant) {
        if self.participants.is_empty() {
            self.host_id = Some(participant.connection_id.clone());
        }
        self.participants.push(participant);
    }

    /// Removes a participant. When the host leaves, the earliest remaining
    /// joiner is promoted.
    pub fn remove_participant(&mut self, connection_id: &str) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.connection_id == connection_id)?;
        let removed = self.participants.remove(index);

        if self.is_host(connection_id) {
            self.host_id = self.participants.first().map(|p| p.connection_id.clone());
        }

        Some(removed)
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.participants
            .iter()
            .map(|p| RosterEntry {
                connection_id: p.connection_id.clone(),
                display_name: p.display_name.clone(),
                is_host: self.is_host(&p.connection_id),
            })
            .collect()
    }

    pub fn roster_entry(&self, connection_id: &str) -> Option<RosterEntry> {
        self.participant(connection_id).map(|p| RosterEntry {
            connection_id: p.connection_id.clone(),
            display_name: p.display_name.clone(),
            is_host: self.is_host(connection_id),
        })
    }

    /// Loads a new video, always landing paused at zero
    pub fn load_video(&mut self, video_id: impl Into<String>) {
        self.video_id = video_id.into();
        self.is_playing = false;
        self.playhead = 0.0;
    }

    pub fn start_playback(&mut self) {
        self.is_playing = true;
    }

    pub fn pause_at(&mut self, current_time: f64) {
        self.is_playing = false;
        self.playhead = current_time;
    }

    pub fn seek_to(&mut self, current_time: f64) {
        self.playhead = current_time;
    }

    pub fn resync(&mut self, current_time: f64, should_play: bool) {
        self.playhead = current_time;
        self.is_playing = should_play;
    }
}
