//! The dispatch state machine.
//!
//! ```text
//! START -> PREFIX_TEST -> TRIGGER_SCAN                       (terminal, 0..n fires)
//!                      -> COMMAND_LOOKUP -> REJECTED           (unrecognized command)
//!                                        -> CONTEXT_CHECK -> REJECTED (group only)
//!                                                         -> DESCEND* -> BIND_ARGS
//! BIND_ARGS -> EXECUTE | REJECTED (one or more argument errors)
//! ```
//!
//! Every command-path terminal state produces exactly one outward effect:
//! the action runs, or a single error is reported.

use crate::binder::bind_arguments;
use crate::command::{ContextRestriction, Invocation};
use crate::error::{DispatchError, RegistrationError};
use crate::message::InboundMessage;
use crate::registry::Registry;
use crate::responder::Responder;
use crate::telemetry::CommandTimer;
use crate::tokenize::split_fields;
use crate::trigger::TriggerContext;
use std::fmt;
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, span, warn, Instrument, Level, Span};

/// A validated, non-empty command prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct Prefix(Arc<str>);

impl Prefix {
    /// Validate `prefix`.
    pub fn new(prefix: impl AsRef<str>) -> Result<Self, RegistrationError> {
        let prefix = prefix.as_ref();
        if prefix.is_empty() {
            return Err(RegistrationError::EmptyPrefix);
        }
        Ok(Self(Arc::from(prefix)))
    }

    /// The prefix text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Prefix").field(&&*self.0).finish()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The resolved command's action ran.
    Executed {
        /// Canonical names from the top-level command down.
        path: Vec<String>,
    },
    /// The command path ended with a reported error.
    Rejected(DispatchError),
    /// The message went to the trigger scan.
    Triggered {
        /// Number of triggers that fired.
        fired: usize,
    },
}

struct DispatcherInner {
    registry: Arc<Registry>,
    prefix: Prefix,
    responder: Arc<dyn Responder>,
}

/// Routes inbound messages to commands or triggers.
///
/// Cheap to clone; all clones share the same frozen registry.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Create a dispatcher over a frozen registry.
    pub fn new(registry: Arc<Registry>, prefix: Prefix, responder: Arc<dyn Responder>) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                registry,
                prefix,
                responder,
            }),
        }
    }

    /// The registry this dispatcher reads.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &Prefix {
        &self.inner.prefix
    }

    /// Command usage statistics, busiest first.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        self.inner.registry.command_stats()
    }

    /// Dispatch `message` on its own task.
    pub fn spawn(&self, message: InboundMessage) -> JoinHandle<DispatchOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(message).await })
    }

    /// Run one message through the state machine to a terminal state.
    pub async fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        let message = Arc::new(message);
        let command_line = if message.sender_is_automated {
            None
        } else {
            message.text.strip_prefix(self.inner.prefix.as_str())
        };

        match command_line {
            Some(line) => {
                let command_span = span!(
                    Level::DEBUG,
                    "bot.command",
                    command = tracing::field::Empty,
                    author = %message.author_id,
                    channel = %message.channel_id,
                );
                self.run_command(&message, line)
                    .instrument(command_span)
                    .await
            }
            None => self.scan_triggers(&message).await,
        }
    }

    async fn run_command(&self, message: &Arc<InboundMessage>, line: &str) -> DispatchOutcome {
        let inner = &self.inner;
        let fields = split_fields(Some(line), 1);
        let word = fields.first().copied().flatten().unwrap_or_default();
        let mut remainder = fields.get(1).copied().flatten();
        Span::current().record("command", word);

        let Some(root) = inner.registry.lookup(word) else {
            return self
                .reject(
                    message,
                    DispatchError::UnrecognizedCommand(word.to_string()),
                )
                .await;
        };

        if root.restriction() == ContextRestriction::GroupContextOnly
            && !message.context.is_group()
        {
            return self.reject(message, DispatchError::ContextRestricted).await;
        }

        let mut node = Arc::clone(root);
        let mut path = vec![root.name().to_string()];
        while !node.subcommands().is_empty() {
            let fields = split_fields(remainder, 1);
            let Some(child) = fields
                .first()
                .copied()
                .flatten()
                .and_then(|candidate| node.subcommand(candidate))
                .cloned()
            else {
                break;
            };
            remainder = fields.get(1).copied().flatten();
            path.push(child.name().to_string());
            node = child;
        }

        inner.registry.record_invocation(root.name());
        let invocation = Invocation::new(
            Arc::clone(message),
            path,
            Arc::clone(&node),
            Arc::clone(root),
            Arc::clone(&inner.registry),
            Arc::clone(&inner.prefix.0),
            Arc::clone(&inner.responder),
        );

        let args = match bind_arguments(&node, remainder, &invocation).await {
            Ok(args) => args,
            Err(errors) => {
                return self
                    .reject(message, DispatchError::InvalidArguments(errors))
                    .await;
            }
        };

        let command = invocation.path().join(" ");
        {
            let _timer = CommandTimer::new(command.as_str());
            if let Err(e) = node.action().execute(&invocation, &args).await {
                warn!(command = %command, error = %e, "Command action failed");
            }
        }
        debug!(command = %command, "Command executed");

        DispatchOutcome::Executed {
            path: invocation.path().to_vec(),
        }
    }

    async fn reject(&self, message: &InboundMessage, error: DispatchError) -> DispatchOutcome {
        debug!(
            error_code = error.error_code(),
            error = %error,
            channel = %message.channel_id,
            "Command rejected"
        );
        self.inner
            .responder
            .report_error(message, &error.to_string())
            .await;
        DispatchOutcome::Rejected(error)
    }

    /// Fire every matching trigger on its own task and wait for all of them.
    async fn scan_triggers(&self, message: &Arc<InboundMessage>) -> DispatchOutcome {
        let mut tasks = JoinSet::new();
        for entry in self.inner.registry.triggers() {
            if !entry.matches(message) {
                continue;
            }
            let action = Arc::clone(entry.action());
            let pattern = entry.key().to_string();
            let context = TriggerContext::new(
                Arc::clone(message),
                entry.pattern().clone(),
                Arc::clone(&self.inner.responder),
            );
            tasks.spawn(async move {
                if let Err(e) = action.fire(&context).await {
                    warn!(pattern = %pattern, error = %e, "Trigger action failed");
                }
            });
        }

        let fired = tasks.len();
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Trigger task panicked");
            }
        }
        if fired > 0 {
            debug!(fired, channel = %message.channel_id, "Triggers fired");
        }
        DispatchOutcome::Triggered { fired }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.inner.prefix)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}
