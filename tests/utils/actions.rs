use serde_json::{json, Value};

use watchparty::websockets::MessageHandler;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

#[allow(dead_code)]
impl TestSetup {
    /// Deliver a raw text frame as if it arrived on the connection's socket
    pub async fn send_raw(&self, connection_id: &str, frame: &str) {
        self.router
            .handle_message(connection_id, frame.to_string())
            .await;
    }

    /// Deliver a `{type, payload}` frame
    pub async fn send_event(&self, connection_id: &str, message_type: &str, payload: Value) {
        let frame = json!({ "type": message_type, "payload": payload });
        self.send_raw(connection_id, &frame.to_string()).await;
    }

    /// Simulate the socket closing
    pub async fn disconnect(&self, connection_id: &str) {
        self.router.handle_disconnect(connection_id).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn join(&self, connection_id: &str, display_name: &str) {
        self.join_room(connection_id, &self.room_key.clone(), display_name)
            .await;
    }

    pub async fn join_room(&self, connection_id: &str, room_key: &str, display_name: &str) {
        self.send_event(
            connection_id,
            "join-room",
            json!({ "roomKey": room_key, "displayName": display_name }),
        )
        .await;
    }

    pub async fn leave(&self, connection_id: &str) {
        self.send_event(
            connection_id,
            "leave-room",
            json!({ "roomKey": self.room_key }),
        )
        .await;
    }

    pub async fn change_video(&self, connection_id: &str, video_id: &str) {
        self.send_event(
            connection_id,
            "change-video",
            json!({ "roomKey": self.room_key, "videoId": video_id }),
        )
        .await;
    }

    pub async fn sync_play(&self, connection_id: &str, target_time: f64) {
        self.send_event(
            connection_id,
            "sync-play",
            json!({ "roomKey": self.room_key, "targetTime": target_time }),
        )
        .await;
    }

    pub async fn pause(&self, connection_id: &str, current_time: f64) {
        self.send_event(
            connection_id,
            "pause",
            json!({ "roomKey": self.room_key, "currentTime": current_time }),
        )
        .await;
    }

    pub async fn seek(&self, connection_id: &str, current_time: f64) {
        self.send_event(
            connection_id,
            "seek",
            json!({ "roomKey": self.room_key, "currentTime": current_time }),
        )
        .await;
    }

    pub async fn force_resync(
        &self,
        connection_id: &str,
        current_time: f64,
        should_play: bool,
        ack_id: Option<&str>,
    ) {
        let mut payload = json!({
            "roomKey": self.room_key,
            "currentTime": current_time,
            "shouldPlay": should_play,
        });
        if let Some(ack_id) = ack_id {
            payload["ackId"] = json!(ack_id);
        }
        self.send_event(connection_id, "force-resync", payload).await;
    }
}
