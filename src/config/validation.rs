//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bot.prefix is required")]
    EmptyPrefix,
    #[error("bot.prefix cannot contain whitespace, got '{0}'")]
    PrefixWhitespace(String),
    #[error("bot.name is required")]
    MissingBotName,
    #[error("triggers.dead_channels entry {0} is blank")]
    BlankChannel(usize),
    #[error("storage.tags_file and storage.timezones_file must differ, both are '{0}'")]
    SharedStoreFile(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.bot.prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    } else if prefix.contains(char::is_whitespace) {
        errors.push(ValidationError::PrefixWhitespace(prefix.clone()));
    }
    if config.bot.name.trim().is_empty() {
        errors.push(ValidationError::MissingBotName);
    }

    for (i, channel) in config.triggers.dead_channels.iter().enumerate() {
        if channel.trim().is_empty() {
            errors.push(ValidationError::BlankChannel(i));
        }
    }

    if config.storage.tags_file == config.storage.timezones_file {
        errors.push(ValidationError::SharedStoreFile(config.storage.tags_file.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
