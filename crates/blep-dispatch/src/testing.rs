//! An in-memory [`Responder`] for tests and embedding.

use crate::message::InboundMessage;
use crate::responder::Responder;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Kind of reply recorded by [`RecordingResponder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// `report_error`
    Error,
    /// `report_success`
    Success,
    /// `say`
    Say,
}

/// One recorded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Which responder method produced it.
    pub kind: ReplyKind,
    /// Channel of the originating message.
    pub channel_id: String,
    /// Reply text.
    pub text: String,
}

/// Records every reply instead of sending it anywhere.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    replies: Mutex<Vec<Reply>>,
}

impl RecordingResponder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order.
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }

    /// Texts of recorded errors.
    pub fn errors(&self) -> Vec<String> {
        self.texts(ReplyKind::Error)
    }

    /// Texts of recorded plain messages.
    pub fn said(&self) -> Vec<String> {
        self.texts(ReplyKind::Say)
    }

    /// Drain the recorded replies.
    pub fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.replies.lock())
    }

    fn texts(&self, kind: ReplyKind) -> Vec<String> {
        self.replies
            .lock()
            .iter()
            .filter(|reply| reply.kind == kind)
            .map(|reply| reply.text.clone())
            .collect()
    }

    fn record(&self, kind: ReplyKind, message: &InboundMessage, text: &str) {
        self.replies.lock().push(Reply {
            kind,
            channel_id: message.channel_id.clone(),
            text: text.to_string(),
        });
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn report_error(&self, message: &InboundMessage, text: &str) {
        self.record(ReplyKind::Error, message, text);
    }

    async fn report_success(&self, message: &InboundMessage, text: &str) {
        self.record(ReplyKind::Success, message, text);
    }

    async fn say(&self, message: &InboundMessage, text: &str) {
        self.record(ReplyKind::Say, message, text);
    }
}
