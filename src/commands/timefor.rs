//! `timefor` - local time for a user, from a stored UTC offset.

use crate::store::TimezoneStore;
use anyhow::Context as _;
use async_trait::async_trait;
use blep_dispatch::{
    ArgumentSpec, ArgumentValidator, CommandAction, CommandNode, Invocation, RegistrationError,
    Validation,
};
use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use std::sync::{Arc, OnceLock};

const SET_USAGE: &str = "timefor set [timezone]";

/// Largest offset in use anywhere (UTC+14, Line Islands).
const MAX_OFFSET_HOURS: i32 = 14;

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:(?:utc|gmt)\s*)?([+-])\s*(\d{1,2})(?::?(\d{2}))?$")
            .expect("offset pattern is valid")
    })
}

/// Parse `+02:00`, `-5`, `UTC+5:30`, `gmt-0330` or a bare `UTC`.
pub fn parse_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if ["utc", "gmt", "z"].iter().any(|zero| text.eq_ignore_ascii_case(zero)) {
        return FixedOffset::east_opt(0);
    }

    let caps = offset_pattern().captures(text)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if hours > MAX_OFFSET_HOURS || minutes >= 60 || (hours == MAX_OFFSET_HOURS && minutes > 0) {
        return None;
    }

    let seconds = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds)
}

/// Wall-clock time at `offset`, e.g. `6:00 PM`.
pub fn local_time(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format("%-I:%M %p").to_string()
}

pub struct ValidOffset;

#[async_trait]
impl ArgumentValidator for ValidOffset {
    async fn validate(&self, _invocation: &Invocation, value: &str) -> Validation {
        match parse_offset(value) {
            Some(_) => Validation::accept(),
            None => Validation::reject(format!(
                "Couldn't understand the timezone `{value}`. Use a UTC offset such as `+02:00` or `UTC-5`."
            )),
        }
    }
}

pub struct TimeForHandler {
    store: Arc<TimezoneStore>,
}

#[async_trait]
impl CommandAction for TimeForHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        let author = &invocation.message().author_id;
        let user = args
            .first()
            .cloned()
            .flatten()
            .unwrap_or_else(|| author.clone());

        let Some(offset) = self.store.get(&user).as_deref().and_then(parse_offset) else {
            let text = if &user == author {
                format!(
                    "You have not set your timezone yet. Use `{}{SET_USAGE}` to do so.",
                    invocation.prefix()
                )
            } else {
                format!("User `{user}` has not set their timezone.")
            };
            invocation.error(&text).await;
            return Ok(());
        };

        invocation
            .say(&format!(
                "It is **{}** in `{user}`'s timezone (`UTC{offset}`)",
                local_time(Utc::now(), offset)
            ))
            .await;
        Ok(())
    }
}

pub struct SetTimezoneHandler {
    store: Arc<TimezoneStore>,
}

#[async_trait]
impl CommandAction for SetTimezoneHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        let offset = args
            .first()
            .and_then(Option::as_deref)
            .and_then(parse_offset)
            .context("timezone was not validated")?;
        self.store
            .set(&invocation.message().author_id, offset.to_string());
        invocation
            .success(&format!("I've set your timezone to `UTC{offset}`."))
            .await;
        Ok(())
    }
}

pub fn command(store: Arc<TimezoneStore>) -> Result<CommandNode, RegistrationError> {
    let set = CommandNode::builder(
        "set",
        Arc::new(SetTimezoneHandler {
            store: Arc::clone(&store),
        }),
    )
    .usage(SET_USAGE)
    .description("Sets your timezone to the UTC offset `[timezone]`, e.g. `+02:00`.")
    .argument(
        ArgumentSpec::required("timezone")
            .infinite()
            .validate_with(Arc::new(ValidOffset)),
    )
    .build()?;

    CommandNode::builder(
        "timefor",
        Arc::new(TimeForHandler {
            store: Arc::clone(&store),
        }),
    )
    .alias("tf")
    .usage("timefor [user?]")
    .description("Displays the local time for [user], or your local time if [user] is empty.")
    .argument(ArgumentSpec::optional("user"))
    .subcommand(set)
    .on_shutdown(store)
    .build()
}
