//! `help` - lists every command and subcommand.

use async_trait::async_trait;
use blep_dispatch::{CommandAction, CommandNode, Invocation, RegistrationError};
use std::sync::Arc;

pub struct HelpHandler;

#[async_trait]
impl CommandAction for HelpHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        _args: &[Option<String>],
    ) -> anyhow::Result<()> {
        invocation.say(&render(invocation)).await;
        Ok(())
    }
}

/// One line per unique command, each followed by its subcommands.
fn render(invocation: &Invocation) -> String {
    let prefix = invocation.prefix();
    let mut lines = vec!["**Command help**".to_string()];
    for node in invocation.registry().unique_nodes() {
        for entry in std::iter::once(&node).chain(node.subcommands()) {
            lines.push(format!("`{prefix}{}` - {}", entry.usage(), entry.description()));
        }
    }
    lines.join("\n")
}

pub fn command() -> Result<CommandNode, RegistrationError> {
    CommandNode::builder("help", Arc::new(HelpHandler))
        .usage("help")
        .description("Displays bot command help.")
        .build()
}
