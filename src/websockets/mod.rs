// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::websocket_handler;
pub use messages::{ClientMessage, ProtocolError, ServerMessage};
pub use router::SyncEventRouter;
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod connection_manager;
pub mod event_handlers;
mod handler;
pub mod messages;
mod router;
mod socket;
