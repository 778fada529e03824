//! `ping` - liveness check.

use async_trait::async_trait;
use blep_dispatch::{CommandAction, CommandNode, Invocation, RegistrationError};
use std::sync::Arc;

pub struct PingHandler;

#[async_trait]
impl CommandAction for PingHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        _args: &[Option<String>],
    ) -> anyhow::Result<()> {
        invocation.say("Pong!").await;
        Ok(())
    }
}

pub fn command() -> Result<CommandNode, RegistrationError> {
    CommandNode::builder("ping", Arc::new(PingHandler))
        .usage("ping")
        .description("Pings the bot.")
        .build()
}
