//! Regex triggers for messages that did not enter the command path.

use crate::message::InboundMessage;
use crate::responder::Responder;
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Context handed to a firing trigger.
#[derive(Clone)]
pub struct TriggerContext {
    message: Arc<InboundMessage>,
    pattern: Regex,
    responder: Arc<dyn Responder>,
}

impl TriggerContext {
    pub(crate) fn new(
        message: Arc<InboundMessage>,
        pattern: Regex,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            message,
            pattern,
            responder,
        }
    }

    /// The message that matched.
    pub fn message(&self) -> &InboundMessage {
        &self.message
    }

    /// Capture groups of the trigger pattern against the message text.
    pub fn captures(&self) -> Option<Captures<'_>> {
        self.pattern.captures(&self.message.text)
    }

    /// Send plain text back to the channel.
    pub async fn say(&self, text: &str) {
        self.responder.say(&self.message, text).await;
    }

    /// The responder for this message.
    pub fn responder(&self) -> &Arc<dyn Responder> {
        &self.responder
    }
}

/// The body of a trigger.
#[async_trait]
pub trait TriggerAction: Send + Sync {
    /// React to a matching message.
    async fn fire(&self, context: &TriggerContext) -> anyhow::Result<()>;
}

struct FnTrigger<F>(F);

#[async_trait]
impl<F, Fut> TriggerAction for FnTrigger<F>
where
    F: Fn(TriggerContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn fire(&self, context: &TriggerContext) -> anyhow::Result<()> {
        (self.0)(context.clone()).await
    }
}

/// Wrap an async closure as a [`TriggerAction`].
pub fn trigger_fn<F, Fut>(f: F) -> Arc<dyn TriggerAction>
where
    F: Fn(TriggerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnTrigger(f))
}

/// A pattern, an optional channel scope, and the action to run on a match.
#[derive(Clone)]
pub struct TriggerEntry {
    pattern: Regex,
    channels: HashSet<String>,
    action: Arc<dyn TriggerAction>,
}

impl TriggerEntry {
    /// A trigger matching `pattern` in any channel.
    pub fn new(pattern: Regex, action: Arc<dyn TriggerAction>) -> Self {
        Self {
            pattern,
            channels: HashSet::new(),
            action,
        }
    }

    /// Compile `pattern` and build an unscoped trigger.
    pub fn from_pattern(
        pattern: &str,
        action: Arc<dyn TriggerAction>,
    ) -> Result<Self, regex::Error> {
        Ok(Self::new(Regex::new(pattern)?, action))
    }

    /// Restrict the trigger to `channels`. An empty set means every channel.
    pub fn scoped_to<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Registry key: the pattern source, inline flags included.
    pub fn key(&self) -> &str {
        self.pattern.as_str()
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The channel scope.
    pub fn channels(&self) -> &HashSet<String> {
        &self.channels
    }

    /// The trigger body.
    pub fn action(&self) -> &Arc<dyn TriggerAction> {
        &self.action
    }

    /// Whether the trigger fires for `message`.
    pub fn matches(&self, message: &InboundMessage) -> bool {
        self.pattern.is_match(&message.text)
            && (self.channels.is_empty() || self.channels.contains(&message.channel_id))
    }
}

impl fmt::Debug for TriggerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerEntry")
            .field("pattern", &self.pattern.as_str())
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}
