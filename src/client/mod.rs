//! Client side of the sync protocol.
//!
//! [`PlaybackAdapter`] is the contract an embedded video widget has to meet;
//! [`PlaybackController`] turns local actions into outbound events and
//! applies inbound server messages to the widget.

pub use adapter::{PlaybackAdapter, PlaybackState};
pub use controller::{play_delay, PlaybackController, SYNC_PLAY_LEAD_MS};

mod adapter;
mod controller;
