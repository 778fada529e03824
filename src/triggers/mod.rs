//! Regex triggers for non-command messages.

mod dead;

use crate::config::TriggersConfig;
use blep_dispatch::{RegistrationError, RegistryBuilder};

/// Register every bot trigger.
pub fn register_all(
    builder: &mut RegistryBuilder,
    config: &TriggersConfig,
) -> Result<(), RegistrationError> {
    builder.register_trigger(dead::trigger(&config.dead_channels))?;
    Ok(())
}
