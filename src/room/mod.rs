// Public API - what other modules can use
pub use handlers::{create_room, get_room, list_rooms};
pub use key::{generate_room_key, normalize_room_key, RoomKeyError};
pub use membership::{JoinRoomResult, LeaveRoomResult, MembershipManager};
pub use models::{Participant, RoomModel, RoomPhase, RosterEntry};
pub use repository::{InMemoryRoomRepository, RoomRepository};

// Internal modules
mod handlers;
pub mod key;
pub mod membership;
pub mod models;
pub mod repository;
pub mod types;
