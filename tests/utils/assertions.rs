//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    connections: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for every viewer in the setup
    pub fn for_all_viewers(setup: &'a TestSetup) -> Self {
        let connections = setup.viewers.iter().map(|(id, _)| id.as_str()).collect();
        Self { setup, connections }
    }

    /// Create an assertion for specific connections
    pub fn for_connections(setup: &'a TestSetup, connections: Vec<&'a str>) -> Self {
        Self { setup, connections }
    }

    /// Assert that every connection received the message type next (consumes it)
    /// and that all copies carry the same payload
    pub async fn received_message_type(self, expected_type: &str) -> MessageContent {
        let mut payloads = vec![];

        for connection in &self.connections {
            let frame = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection)
                .await
                .unwrap_or_else(|| panic!("{} should have received {}", connection, expected_type));

            let frame: Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(
                frame["type"], expected_type,
                "{} received wrong message type",
                connection
            );
            assert!(
                frame["meta"]["timestamp"].is_string(),
                "{} frame is missing meta.timestamp",
                connection
            );
            payloads.push(frame["payload"].clone());
        }

        for (i, payload) in payloads.iter().enumerate().skip(1) {
            assert_eq!(
                payload, &payloads[0],
                "{} payload differs from {}",
                self.connections[i], self.connections[0]
            );
        }

        MessageContent {
            payload: payloads.into_iter().next().unwrap_or(Value::Null),
        }
    }

    /// Assert that the connections have no unconsumed messages
    pub async fn received_no_messages(self) {
        for connection in &self.connections {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection)
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                connection,
                messages
            );
        }
    }

    /// Count unconsumed messages of a type for one connection
    pub async fn count_message_type(&self, connection: &str, message_type: &str) -> usize {
        self.setup
            .mock_conn_manager
            .get_messages_for(connection)
            .await
            .iter()
            .filter_map(|frame| serde_json::from_str::<Value>(frame).ok())
            .filter(|frame| frame["type"] == message_type)
            .count()
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: Value,
}

impl MessageContent {
    pub fn with_video_id(self, expected: &str) -> Self {
        assert_eq!(self.payload["videoId"], expected);
        self
    }

    pub fn with_playback(self, expected: bool) -> Self {
        assert_eq!(self.payload["playback"], expected);
        self
    }

    pub fn with_playhead(self, expected: f64) -> Self {
        assert_eq!(self.payload["playhead"].as_f64(), Some(expected));
        self
    }

    pub fn with_current_time(self, expected: f64) -> Self {
        assert_eq!(self.payload["currentTime"].as_f64(), Some(expected));
        self
    }

    pub fn with_should_play(self, expected: bool) -> Self {
        assert_eq!(self.payload["shouldPlay"], expected);
        self
    }

    pub fn with_target_time(self, expected: f64) -> Self {
        assert_eq!(self.payload["targetTime"].as_f64(), Some(expected));
        self
    }

    pub fn with_host(self, expected: &str) -> Self {
        assert_eq!(self.payload["hostId"], expected);
        self
    }

    pub fn with_joined_name(self, expected: &str) -> Self {
        assert_eq!(self.payload["joinedName"], expected);
        self
    }

    pub fn with_left_name(self, expected: &str) -> Self {
        assert_eq!(self.payload["leftName"], expected);
        self
    }

    pub fn with_ack(self, ack_id: &str, accepted: bool) -> Self {
        assert_eq!(self.payload["ackId"], ack_id);
        assert_eq!(self.payload["accepted"], accepted);
        self
    }

    /// Assert roster display names, in join order
    pub fn with_roster_names(self, expected: Vec<&str>) -> Self {
        let names: Vec<&str> = self.payload["roster"]
            .as_array()
            .expect("payload has no roster")
            .iter()
            .map(|entry| entry["displayName"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(names, expected);
        self
    }
}
