//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading (Config, BotConfig, GatewayConfig, ...)
//! - [`validation`]: Startup validation collecting every problem at once
//! - [`defaults`]: serde default value functions

mod defaults;
mod types;
mod validation;

pub use types::{Config, LogFormat, StorageConfig, TriggersConfig};
pub use validation::validate;
