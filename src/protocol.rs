//! `graphql-transport-ws` message framing
//!
//! The subscription endpoint speaks the `graphql-transport-ws` sub-protocol:
//! every WebSocket text frame is a JSON object tagged by `type`.
//!
//! ```text
//! client                         server
//!   connection_init  ────────►
//!                    ◄────────  connection_ack
//!   subscribe{id}    ────────►
//!                    ◄────────  next{id}      (repeated)
//!                    ◄────────  error{id} | complete{id}
//!   complete{id}     ────────►  (client teardown)
//!   ping / pong      ◄───────►  (either side, any time)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{GraphQlErrorEntry, GraphQlRequest, GraphQlResponse};
use crate::{Result, TimingError};

/// WebSocket sub-protocol name sent in `Sec-WebSocket-Protocol`.
pub const SUBPROTOCOL: &str = "graphql-transport-ws";

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: GraphQlRequest,
    },
    Complete {
        id: String,
    },
    Ping {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Next {
        id: String,
        payload: GraphQlResponse<Value>,
    },
    Error {
        id: String,
        payload: Vec<GraphQlErrorEntry>,
    },
    Complete {
        id: String,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(TimingError::from)
    }
}

impl ServerMessage {
    /// Decode one text frame.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| TimingError::protocol(format!("undecodable server message: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(TimingError::from)
    }
}
