//! `dead` trigger: "deader" answers "deaderer", "deadest" answers "deaderest".

use async_trait::async_trait;
use blep_dispatch::{TriggerAction, TriggerContext, TriggerEntry};
use regex::Regex;
use std::sync::{Arc, OnceLock};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*dead((?:er)*)((?:est)*)\s*$").expect("dead pattern is valid")
    })
}

/// Reply for a matching message: one more `er` after the existing ones.
pub fn reply(text: &str) -> Option<String> {
    let caps = pattern().captures(text)?;
    Some(format!("dead{}er{}", &caps[1], &caps[2]))
}

pub struct DeadTrigger;

#[async_trait]
impl TriggerAction for DeadTrigger {
    async fn fire(&self, context: &TriggerContext) -> anyhow::Result<()> {
        // Never answer other bots, including ourselves.
        if context.message().sender_is_automated {
            return Ok(());
        }
        if let Some(text) = reply(&context.message().text) {
            context.say(&text).await;
        }
        Ok(())
    }
}

pub fn trigger(channels: &[String]) -> TriggerEntry {
    TriggerEntry::new(pattern().clone(), Arc::new(DeadTrigger)).scoped_to(channels.iter().cloned())
}
