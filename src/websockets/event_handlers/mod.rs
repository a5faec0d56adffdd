use thiserror::Error;

use crate::shared::AppError;

pub mod membership_events;
pub mod playback_events;
pub mod shared;

pub use membership_events::MembershipEventHandlers;
pub use playback_events::PlaybackEventHandlers;

/// Failure while handling an inbound event; logged, never sent to clients
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Room store error: {0}")]
    Store(#[from] AppError),

    #[error("Handler error: {0}")]
    HandlerError(String),
}
