//! Bot commands.
//!
//! Each submodule exposes a `command(...)` constructor returning the built
//! node; store handles are passed in by [`register_all`].

mod help;
mod ping;
mod tag;
mod timefor;

use crate::store::Stores;
use blep_dispatch::{RegistrationError, RegistryBuilder};
use std::sync::Arc;

/// Register every bot command.
pub fn register_all(
    builder: &mut RegistryBuilder,
    stores: &Stores,
) -> Result<(), RegistrationError> {
    builder.register_command(ping::command()?)?;
    builder.register_command(help::command()?)?;
    builder.register_command(tag::command(Arc::clone(&stores.tags))?)?;
    builder.register_command(timefor::command(Arc::clone(&stores.timezones))?)?;
    Ok(())
}
