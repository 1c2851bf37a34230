//! WebSocket subscription provider

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use crate::client::{GraphQlRequest, decode_session, leaderboard_variables};
use crate::config::ClientConfig;
use crate::protocol::{ClientMessage, SUBPROTOCOL, ServerMessage};
use crate::provider::Provider;
use crate::schema::Session;
use crate::schema::documents::SESSION_SUBSCRIPTION;
use crate::{Result, TimingError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Provider that subscribes to one session over `graphql-transport-ws`.
pub struct SubscriptionProvider {
    endpoint: String,
    session_id: String,
    connect_timeout: Duration,
    ack_timeout: Duration,

    /// Open socket, `None` while disconnected
    socket: Option<Socket>,

    /// Id of the active subscription on `socket`
    operation_id: Option<String>,

    /// Incremented on every subscribe so ids are never reused
    next_operation: u64,
}

impl SubscriptionProvider {
    pub fn new(config: &ClientConfig, session_id: impl Into<String>) -> Self {
        Self {
            endpoint: config.ws_endpoint.clone(),
            session_id: session_id.into(),
            connect_timeout: config.connect_timeout(),
            ack_timeout: config.ack_timeout(),
            socket: None,
            operation_id: None,
            next_operation: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn open_socket(&self) -> Result<Socket> {
        let mut request = self.endpoint.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(SUBPROTOCOL));

        let (socket, response) = tokio::time::timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| TimingError::Timeout { duration: self.connect_timeout })??;

        debug!(status = %response.status(), endpoint = %self.endpoint, "WebSocket upgraded");
        Ok(socket)
    }

    async fn send(socket: &mut Socket, message: &ClientMessage) -> Result<()> {
        trace!(?message, "Sending");
        socket.send(Message::text(message.to_json()?)).await?;
        Ok(())
    }

    /// Wait for `connection_ack`, answering pings in the meantime.
    async fn await_ack(socket: &mut Socket) -> Result<()> {
        while let Some(frame) = socket.next().await {
            let text = match frame? {
                Message::Text(text) => text,
                Message::Close(frame) => {
                    return Err(TimingError::protocol(format!(
                        "server closed before acknowledging: {:?}",
                        frame.map(|f| f.reason.to_string())
                    )));
                }
                _ => continue,
            };

            match ServerMessage::parse(&text)? {
                ServerMessage::ConnectionAck { .. } => return Ok(()),
                ServerMessage::Ping { payload } => {
                    Self::send(socket, &ClientMessage::Pong { payload }).await?;
                }
                other => {
                    return Err(TimingError::protocol(format!(
                        "expected connection_ack, got {:?}",
                        other
                    )));
                }
            }
        }
        Err(TimingError::transport("socket closed during handshake"))
    }

}

#[async_trait::async_trait]
impl Provider for SubscriptionProvider {
    async fn connect(&mut self) -> Result<()> {
        self.close().await;

        info!(endpoint = %self.endpoint, session_id = %self.session_id, "Opening subscription");
        let mut socket = self.open_socket().await?;

        Self::send(&mut socket, &ClientMessage::ConnectionInit { payload: None }).await?;
        tokio::time::timeout(self.ack_timeout, Self::await_ack(&mut socket))
            .await
            .map_err(|_| TimingError::Timeout { duration: self.ack_timeout })??;

        self.next_operation += 1;
        let id = self.next_operation.to_string();
        let subscribe = ClientMessage::Subscribe {
            id: id.clone(),
            payload: GraphQlRequest::new(
                SESSION_SUBSCRIPTION,
                leaderboard_variables(&self.session_id),
            ),
        };
        Self::send(&mut socket, &subscribe).await?;

        debug!(operation_id = %id, "Subscribed");
        self.socket = Some(socket);
        self.operation_id = Some(id);
        Ok(())
    }

    async fn next_snapshot(&mut self) -> Result<Option<Session>> {
        loop {
            let Some(socket) = self.socket.as_mut() else {
                return Err(TimingError::transport("subscription is not connected"));
            };

            let frame = match socket.next().await {
                Some(frame) => frame?,
                None => {
                    self.socket = None;
                    return Err(TimingError::transport("subscription socket closed"));
                }
            };

            let text = match frame {
                Message::Text(text) => text,
                Message::Close(frame) => {
                    debug!(?frame, "Server closed the socket");
                    self.socket = None;
                    return Err(TimingError::transport("subscription socket closed by server"));
                }
                // Transport-level ping/pong is answered by tungstenite itself
                _ => continue,
            };

            let message = ServerMessage::parse(&text)?;
            let current = self.operation_id.as_deref();
            match message {
                ServerMessage::Next { id, payload } if Some(id.as_str()) == current => {
                    match decode_session(payload)? {
                        Some(session) => {
                            trace!(participants = session.participants.len(), "Snapshot received");
                            return Ok(Some(session));
                        }
                        None => {
                            warn!(session_id = %self.session_id, "Subscription delivered no session");
                            continue;
                        }
                    }
                }
                ServerMessage::Error { id, payload } if Some(id.as_str()) == current => {
                    self.operation_id = None;
                    return Err(TimingError::graphql(payload.into_iter().map(|e| e.message)));
                }
                ServerMessage::Complete { id } if Some(id.as_str()) == current => {
                    info!(session_id = %self.session_id, "Subscription completed by server");
                    self.operation_id = None;
                    return Ok(None);
                }
                ServerMessage::Ping { payload } => {
                    Self::send(socket, &ClientMessage::Pong { payload }).await?;
                }
                ServerMessage::Pong { .. } | ServerMessage::ConnectionAck { .. } => {}
                other => {
                    debug!(?other, "Ignoring message for another operation");
                }
            }
        }
    }

    async fn close(&mut self) {
        let Some(mut socket) = self.socket.take() else {
            return;
        };

        if let Some(id) = self.operation_id.take() {
            if let Err(e) = Self::send(&mut socket, &ClientMessage::Complete { id }).await {
                debug!("Failed to send complete: {}", e);
            }
        }
        if let Err(e) = socket.close(None).await {
            debug!("Failed to close socket cleanly: {}", e);
        }
        debug!(session_id = %self.session_id, "Subscription closed");
    }

    fn describe(&self) -> String {
        format!("subscription to session {} at {}", self.session_id, self.endpoint)
    }
}
