//! Page ↔ worker messages
//!
//! Pages post `{"type": "..."}` commands; replies go back over the port the
//! page supplied with the message.

use serde::{Deserialize, Serialize};
use smol::channel::Sender;

/// Commands a controlled page can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Activate now instead of waiting for old pages to close
    SkipWaiting,
    /// Delete every cache store
    ClearCache,
    /// Report the worker version
    GetVersion,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::SkipWaiting => "SKIP_WAITING",
            Command::ClearCache => "CLEAR_CACHE",
            Command::GetVersion => "GET_VERSION",
        }
    }
}

/// Reply payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Cleared { success: bool },
    Version { version: String },
}

/// Reply channel supplied by the sender of a message
pub type ReplyPort = Sender<Reply>;

/// Message posted by a page
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub data: serde_json::Value,
    pub port: Option<ReplyPort>,
}

impl MessageEvent {
    pub fn new(data: serde_json::Value) -> Self {
        Self { data, port: None }
    }

    pub fn from_command(command: Command) -> Self {
        Self::new(serde_json::json!({ "type": command.as_str() }))
    }

    pub fn with_port(mut self, port: ReplyPort) -> Self {
        self.port = Some(port);
        self
    }

    /// Decode the payload into a command
    pub fn command(&self) -> Result<Command, serde_json::Error> {
        Command::deserialize(&self.data)
    }

    /// Send a reply if the page gave us a port
    pub async fn reply(&self, reply: Reply) {
        match &self.port {
            Some(port) => {
                if port.send(reply).await.is_err() {
                    tracing::warn!("reply port closed before reply was sent");
                }
            }
            None => tracing::warn!(?reply, "message has no reply port"),
        }
    }
}
