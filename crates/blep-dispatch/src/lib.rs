//! # blep-dispatch
//!
//! The command-string dispatcher behind blep-bot.
//!
//! ## Features
//!
//! - Whitespace tokenizer with a bounded split budget and one trailing "infinite" field
//! - Immutable command registry with aliases and nested subcommands
//! - Per-argument validation run concurrently, with every failure collected
//! - Regex triggers, optionally scoped to channels, for messages that are not commands
//! - A dispatch state machine that sequences all of the above per inbound message
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blep_dispatch::{
//!     action_fn, ArgumentSpec, CommandNode, Dispatcher, InboundMessage, Prefix,
//!     RegistryBuilder,
//! };
//! use blep_dispatch::testing::RecordingResponder;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RegistryBuilder::new();
//! builder.register_command(
//!     CommandNode::builder(
//!         "echo",
//!         action_fn(|invocation, args| async move {
//!             let text = args[0].clone().unwrap_or_default();
//!             invocation.say(&text).await;
//!             Ok(())
//!         }),
//!     )
//!     .argument(ArgumentSpec::required("text").infinite())
//!     .build()?,
//! )?;
//! let registry = builder.freeze();
//!
//! let responder = Arc::new(RecordingResponder::new());
//! let dispatcher = Dispatcher::new(registry, Prefix::new("!")?, responder);
//! dispatcher
//!     .dispatch(InboundMessage::direct("dm-1", "alice", "!echo hello there"))
//!     .await;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod binder;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod registry;
pub mod responder;
pub mod telemetry;
pub mod testing;
pub mod tokenize;
pub mod trigger;

pub use self::binder::bind_arguments;
pub use self::command::{
    action_fn, validator_fn, ArgumentSpec, ArgumentValidator, BoundArgs, CommandAction,
    CommandBuilder, CommandNode, ContextRestriction, Invocation, ShutdownHook, Validation,
};
pub use self::dispatch::{DispatchOutcome, Dispatcher, Prefix};
pub use self::error::{ArgumentError, DispatchError, RegistrationError};
pub use self::message::{InboundMessage, MessageContext};
pub use self::registry::{Registry, RegistryBuilder};
pub use self::responder::Responder;
pub use self::tokenize::{split_whitespace_n, TokenizeError};
pub use self::trigger::{trigger_fn, TriggerAction, TriggerContext, TriggerEntry};
