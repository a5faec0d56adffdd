// Library crate for the watch party sync server
// This file exposes the public API for integration tests

pub mod app;
pub mod client;
pub mod config;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use app::build_app;
pub use config::ServerConfig;
pub use room::{InMemoryRoomRepository, MembershipManager, RoomModel, RoomRepository};
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientMessage, ConnectionManager, InMemoryConnectionManager, MessageHandler, ServerMessage,
    SyncEventRouter,
};
