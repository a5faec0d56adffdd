use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Simple WebSocket abstraction - all we care about is send/receive of text frames
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next text message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for inbound frames and connection lifecycle
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming text frame from the client
    async fn handle_message(&self, connection_id: &str, message: String);

    /// Called once after the connection is gone
    async fn handle_disconnect(&self, connection_id: &str);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Binary frames are not part of the protocol; ping/pong is handled by axum
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Connection represents a managed WebSocket connection
/// The outbound receiver is fed by the ConnectionManager's sender for this connection
pub struct Connection {
    pub connection_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        connection_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Run the connection - handles both sending and receiving until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Outbound messages (from our app to client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => self.socket.send_message(message).await?,
                        None => break, // Channel closed, disconnect
                    }
                }

                // Inbound messages (from client to our app)
                msg = self.socket.receive_message() => {
                    match msg {
                        Ok(Some(message)) => {
                            self.message_handler
                                .handle_message(&self.connection_id, message)
                                .await;
                        }
                        Ok(None) => break, // Client disconnected
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        debug!(connection_id = %self.connection_id, "Closing socket");
        let _ = self.socket.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Scripted socket: yields queued inbound frames then reports closure
    struct ScriptedSocket {
        inbound: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SocketWrapper for ScriptedSocket {
        async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
            self.sent.lock().await.push(message);
            Ok(())
        }

        async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
            Ok(self.inbound.pop_front())
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        received: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle_message(&self, connection_id: &str, message: String) {
            self.received
                .lock()
                .await
                .push((connection_id.to_string(), message));
        }

        async fn handle_disconnect(&self, _connection_id: &str) {}
    }

    #[tokio::test]
    async fn test_inbound_frames_reach_handler_until_close() {
        let handler = Arc::new(RecordingHandler::default());
        let (_tx, rx) = mpsc::unbounded_channel();
        let socket = ScriptedSocket {
            inbound: VecDeque::from(vec!["one".to_string(), "two".to_string()]),
            sent: Arc::new(Mutex::new(Vec::new())),
        };

        let connection = Connection::new("conn-1".to_string(), Box::new(socket), rx, handler.clone());
        connection.run().await.unwrap();

        let received = handler.received.lock().await;
        assert_eq!(
            *received,
            vec![
                ("conn-1".to_string(), "one".to_string()),
                ("conn-1".to_string(), "two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_closed_outbound_channel_ends_connection() {
        let handler = Arc::new(RecordingHandler::default());
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(tx);

        /// Never yields an inbound frame
        struct SilentSocket;

        #[async_trait]
        impl SocketWrapper for SilentSocket {
            async fn send_message(&mut self, _message: String) -> Result<(), SocketError> {
                Ok(())
            }

            async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
                futures::future::pending().await
            }

            async fn close(&mut self) -> Result<(), SocketError> {
                Ok(())
            }
        }

        let connection = Connection::new("conn-1".to_string(), Box::new(SilentSocket), rx, handler);
        connection.run().await.unwrap();
    }
}
