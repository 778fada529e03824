//! Inbound chat messages, as handed over by the transport.

use serde::{Deserialize, Serialize};

/// The conversation a message was sent in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContext {
    /// A group conversation (server, guild, team), identified by its id.
    Group {
        /// Group identifier.
        id: String,
    },
    /// A one-to-one conversation.
    Direct,
}

impl MessageContext {
    /// Returns `true` for group conversations.
    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// The group id, if this is a group conversation.
    #[inline]
    pub fn group_id(&self) -> Option<&str> {
        match self {
            Self::Group { id } => Some(id),
            Self::Direct => None,
        }
    }
}

/// A chat message as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw message text.
    pub text: String,
    /// Set when the sender is another bot or an automated integration.
    #[serde(default)]
    pub sender_is_automated: bool,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Group or direct conversation.
    pub context: MessageContext,
    /// Author of the message.
    pub author_id: String,
}

impl InboundMessage {
    /// A message posted in `channel_id` of group `group_id`.
    pub fn group(
        group_id: impl Into<String>,
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender_is_automated: false,
            channel_id: channel_id.into(),
            context: MessageContext::Group {
                id: group_id.into(),
            },
            author_id: author_id.into(),
        }
    }

    /// A direct message.
    pub fn direct(
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender_is_automated: false,
            channel_id: channel_id.into(),
            context: MessageContext::Direct,
            author_id: author_id.into(),
        }
    }

    /// Mark the sender as automated.
    pub fn automated(mut self) -> Self {
        self.sender_is_automated = true;
        self
    }
}
