use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::room::{MembershipManager, RoomRepository};
use crate::websockets::{ConnectionManager, SyncEventRouter};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_repository: Arc<dyn RoomRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub event_router: Arc<SyncEventRouter>,
}

impl AppState {
    /// Wires the membership manager and event router on top of the given
    /// store and transport
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        let membership = Arc::new(MembershipManager::new(Arc::clone(&room_repository)));
        let event_router = Arc::new(SyncEventRouter::new(
            Arc::clone(&room_repository),
            membership,
            Arc::clone(&connection_manager),
        ));

        Self {
            room_repository,
            connection_manager,
            event_router,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::room::InMemoryRoomRepository;
    use crate::websockets::InMemoryConnectionManager;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        room_repository: Option<Arc<dyn RoomRepository>>,
        connection_manager: Option<Arc<dyn ConnectionManager>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                room_repository: None,
                connection_manager: None,
            }
        }

        pub fn with_room_repository(mut self, repo: Arc<dyn RoomRepository>) -> Self {
            self.room_repository = Some(repo);
            self
        }

        pub fn with_connection_manager(mut self, manager: Arc<dyn ConnectionManager>) -> Self {
            self.connection_manager = Some(manager);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.room_repository
                    .unwrap_or_else(|| Arc::new(InMemoryRoomRepository::new())),
                self.connection_manager
                    .unwrap_or_else(|| Arc::new(InMemoryConnectionManager::new())),
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
