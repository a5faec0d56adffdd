pub mod message_broadcast;

pub use message_broadcast::{Audience, MessageBroadcaster};
