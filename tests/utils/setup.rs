use std::sync::Arc;

use watchparty::{
    room::{InMemoryRoomRepository, MembershipManager, RoomModel, RoomRepository},
    websockets::SyncEventRouter,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub router: SyncEventRouter,
    pub room_repository: Arc<InMemoryRoomRepository>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub room_key: String,
    /// (connection id, display name)
    pub viewers: Vec<(String, String)>,
}

impl TestSetup {
    /// Current stored state of the setup's room
    #[allow(dead_code)]
    pub async fn room(&self) -> Option<RoomModel> {
        self.room_repository.get_room(&self.room_key).await.unwrap()
    }
}

pub struct TestSetupBuilder {
    viewers: Vec<(String, String)>,
    room_key: String,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            viewers: vec![],
            room_key: "ABC123".to_string(),
        }
    }

    /// Viewers join the room in this order once the setup is built
    pub fn with_viewers(mut self, viewers: Vec<(&str, &str)>) -> Self {
        self.viewers = viewers
            .into_iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();
        self
    }

    #[allow(dead_code)]
    pub fn with_alice_and_bob(self) -> Self {
        self.with_viewers(vec![("alice", "Alice"), ("bob", "Bob")])
    }

    #[allow(dead_code)]
    pub fn with_room_key(mut self, room_key: &str) -> Self {
        self.room_key = room_key.to_string();
        self
    }

    pub async fn build(self) -> TestSetup {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let membership = Arc::new(MembershipManager::new(room_repository.clone()));

        let router = SyncEventRouter::new(
            room_repository.clone(),
            membership,
            mock_conn_manager.clone(),
        );

        for (connection_id, _) in &self.viewers {
            mock_conn_manager.add_connected(connection_id).await;
        }

        let setup = TestSetup {
            router,
            room_repository,
            mock_conn_manager,
            room_key: self.room_key,
            viewers: self.viewers,
        };

        let viewers = setup.viewers.clone();
        for (connection_id, display_name) in &viewers {
            setup.join(connection_id, display_name).await;
        }
        setup.clear_messages().await;

        setup
    }
}
