//! Replies travelling back over a gateway connection.

use async_trait::async_trait;
use blep_dispatch::{InboundMessage, Responder};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// What kind of reply a line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundKind {
    Error,
    Success,
    Message,
}

/// One reply line on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub kind: OutboundKind,
    pub channel_id: String,
    pub text: String,
}

/// Feeds replies to a connection's writer task.
#[derive(Clone)]
pub struct GatewayResponder {
    tx: mpsc::Sender<Outbound>,
}

impl GatewayResponder {
    pub fn new(tx: mpsc::Sender<Outbound>) -> Self {
        Self { tx }
    }

    async fn send(&self, kind: OutboundKind, message: &InboundMessage, text: String) {
        let outbound = Outbound {
            kind,
            channel_id: message.channel_id.clone(),
            text,
        };
        if self.tx.send(outbound).await.is_err() {
            warn!(channel = %message.channel_id, "Connection closed before reply was sent");
        }
    }
}

#[async_trait]
impl Responder for GatewayResponder {
    async fn report_error(&self, message: &InboundMessage, text: &str) {
        self.send(OutboundKind::Error, message, format!("❌ {text}"))
            .await;
    }

    async fn report_success(&self, message: &InboundMessage, text: &str) {
        self.send(OutboundKind::Success, message, format!("✅ {text}"))
            .await;
    }

    async fn say(&self, message: &InboundMessage, text: &str) {
        self.send(OutboundKind::Message, message, text.to_string())
            .await;
    }
}
