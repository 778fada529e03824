//! The outbound side of a dispatch.

use crate::message::InboundMessage;
use async_trait::async_trait;

/// Surfaces text back to where a message came from.
///
/// The dispatcher only calls [`report_error`](Responder::report_error), on
/// rejection paths. Actions and triggers use all three.
///
/// Implementations own delivery failures: they log and drop rather than
/// returning an error into the dispatch.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Report a failure to the origin of `message`.
    async fn report_error(&self, message: &InboundMessage, text: &str);

    /// Report a success to the origin of `message`.
    async fn report_success(&self, message: &InboundMessage, text: &str);

    /// Send plain text to the channel of `message`.
    async fn say(&self, message: &InboundMessage, text: &str);
}
