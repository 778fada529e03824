//! Command nodes, their arguments, and the context their actions run in.
//!
//! A [`CommandNode`] is one concrete structure: metadata, declared arguments,
//! an action, and zero or more child nodes of the same type. While a node has
//! subcommands its own arguments are only bound when no child name matches.
//!
//! Nodes are built once through [`CommandBuilder`], which enforces the
//! structural invariants (infinite argument last, unique sibling names), and
//! are never mutated afterwards.

use crate::error::RegistrationError;
use crate::message::InboundMessage;
use crate::registry::Registry;
use crate::responder::Responder;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Values bound to a command's declared arguments, in declaration order.
/// `None` marks an optional argument that was not supplied.
pub type BoundArgs = Vec<Option<String>>;

/// Where a command may be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextRestriction {
    /// Group and direct conversations.
    #[default]
    Any,
    /// Group conversations only.
    GroupContextOnly,
}

/// Verdict of an [`ArgumentValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Whether the value is acceptable.
    pub valid: bool,
    /// Explanation shown to the user on rejection.
    pub message: Option<String>,
}

impl Validation {
    /// The value is acceptable.
    pub fn accept() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// The value is rejected with `message`.
    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Checks one raw argument value before the action runs.
///
/// Validators may suspend (existence lookups against a store, for example).
/// All validators of a dispatch run concurrently.
#[async_trait]
pub trait ArgumentValidator: Send + Sync {
    /// Validate `value` for the command being invoked.
    async fn validate(&self, invocation: &Invocation, value: &str) -> Validation;
}

/// The body of a command.
///
/// Errors are logged by the dispatcher and otherwise ignored; an action that
/// wants the user to see a failure reports it through the invocation.
#[async_trait]
pub trait CommandAction: Send + Sync {
    /// Run the command with its bound arguments.
    async fn execute(&self, invocation: &Invocation, args: &[Option<String>])
        -> anyhow::Result<()>;
}

/// Teardown hook run once at shutdown.
#[async_trait]
pub trait ShutdownHook: Send + Sync {
    /// Release resources, flush state.
    async fn shutdown(&self) -> anyhow::Result<()>;
}

struct FnAction<F>(F);

#[async_trait]
impl<F, Fut> CommandAction for FnAction<F>
where
    F: Fn(Invocation, BoundArgs) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        (self.0)(invocation.clone(), args.to_vec()).await
    }
}

/// Wrap an async closure as a [`CommandAction`].
pub fn action_fn<F, Fut>(f: F) -> Arc<dyn CommandAction>
where
    F: Fn(Invocation, BoundArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnAction(f))
}

struct FnValidator<F>(F);

#[async_trait]
impl<F, Fut> ArgumentValidator for FnValidator<F>
where
    F: Fn(Invocation, String) -> Fut + Send + Sync,
    Fut: Future<Output = Validation> + Send,
{
    async fn validate(&self, invocation: &Invocation, value: &str) -> Validation {
        (self.0)(invocation.clone(), value.to_string()).await
    }
}

/// Wrap an async closure as an [`ArgumentValidator`].
pub fn validator_fn<F, Fut>(f: F) -> Arc<dyn ArgumentValidator>
where
    F: Fn(Invocation, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Validation> + Send + 'static,
{
    Arc::new(FnValidator(f))
}

/// One declared positional argument.
#[derive(Clone)]
pub struct ArgumentSpec {
    name: String,
    optional: bool,
    infinite: bool,
    validator: Option<Arc<dyn ArgumentValidator>>,
}

impl ArgumentSpec {
    /// A required argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            infinite: false,
            validator: None,
        }
    }

    /// An optional argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(name)
        }
    }

    /// Consume all remaining text, whitespace included. Only valid last.
    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    /// Run `validator` against the value before the action.
    pub fn validate_with(mut self, validator: Arc<dyn ArgumentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Argument name, as shown in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the argument may be omitted.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the argument swallows the rest of the line.
    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    /// The declared validator, if any.
    pub fn validator(&self) -> Option<&Arc<dyn ArgumentValidator>> {
        self.validator.as_ref()
    }

    fn usage_fragment(&self) -> String {
        match (self.optional, self.infinite) {
            (false, false) => format!("[{}]", self.name),
            (true, false) => format!("[{}?]", self.name),
            (false, true) => format!("[{}...]", self.name),
            (true, true) => format!("[{}...?]", self.name),
        }
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("infinite", &self.infinite)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// A named, possibly nested, invocable command.
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    usage: String,
    description: String,
    arguments: Vec<ArgumentSpec>,
    subcommands: Vec<Arc<CommandNode>>,
    restriction: ContextRestriction,
    action: Arc<dyn CommandAction>,
    shutdown: Option<Arc<dyn ShutdownHook>>,
}

impl CommandNode {
    /// Start building a command named `name` that runs `action`.
    pub fn builder(name: impl Into<String>, action: Arc<dyn CommandAction>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            aliases: Vec::new(),
            usage: None,
            description: String::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
            restriction: ContextRestriction::Any,
            action,
            shutdown: None,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative top-level names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Usage line, without the prefix.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared positional arguments.
    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    /// Child commands, in declaration order.
    pub fn subcommands(&self) -> &[Arc<CommandNode>] {
        &self.subcommands
    }

    /// Look up a direct child by exact name. Aliases do not apply here.
    pub fn subcommand(&self, name: &str) -> Option<&Arc<CommandNode>> {
        self.subcommands.iter().find(|child| child.name == name)
    }

    /// Where the command may run.
    pub fn restriction(&self) -> ContextRestriction {
        self.restriction
    }

    /// The command body.
    pub fn action(&self) -> &Arc<dyn CommandAction> {
        &self.action
    }

    /// Teardown hook, if the command owns resources.
    pub fn shutdown_hook(&self) -> Option<&Arc<dyn ShutdownHook>> {
        self.shutdown.as_ref()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("restriction", &self.restriction)
            .field("shutdown", &self.shutdown.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandNode`].
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    usage: Option<String>,
    description: String,
    arguments: Vec<ArgumentSpec>,
    subcommands: Vec<CommandNode>,
    restriction: ContextRestriction,
    action: Arc<dyn CommandAction>,
    shutdown: Option<Arc<dyn ShutdownHook>>,
}

impl CommandBuilder {
    /// Add a top-level alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the usage line. Derived from the name and arguments when unset.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a positional argument.
    pub fn argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Append a subcommand.
    pub fn subcommand(mut self, child: CommandNode) -> Self {
        self.subcommands.push(child);
        self
    }

    /// Only allow the command in group conversations.
    pub fn group_only(mut self) -> Self {
        self.restriction = ContextRestriction::GroupContextOnly;
        self
    }

    /// Run `hook` once when the registry shuts down.
    pub fn on_shutdown(mut self, hook: Arc<dyn ShutdownHook>) -> Self {
        self.shutdown = Some(hook);
        self
    }

    /// Validate the structure and produce the node.
    pub fn build(self) -> Result<CommandNode, RegistrationError> {
        if !is_valid_name(&self.name) {
            return Err(RegistrationError::InvalidCommandName(self.name));
        }
        if let Some(alias) = self.aliases.iter().find(|alias| !is_valid_name(alias)) {
            return Err(RegistrationError::InvalidCommandName(alias.clone()));
        }

        let last = self.arguments.len().saturating_sub(1);
        if let Some(argument) = self
            .arguments
            .iter()
            .enumerate()
            .find(|(i, arg)| arg.infinite && *i != last)
            .map(|(_, arg)| arg)
        {
            return Err(RegistrationError::InfiniteArgumentNotLast {
                command: self.name,
                argument: argument.name.clone(),
            });
        }

        for (i, child) in self.subcommands.iter().enumerate() {
            if self.subcommands[..i].iter().any(|c| c.name == child.name) {
                return Err(RegistrationError::DuplicateSubcommand {
                    parent: self.name,
                    name: child.name.clone(),
                });
            }
        }

        let usage = self.usage.unwrap_or_else(|| {
            std::iter::once(self.name.clone())
                .chain(self.arguments.iter().map(ArgumentSpec::usage_fragment))
                .collect::<Vec<_>>()
                .join(" ")
        });

        Ok(CommandNode {
            name: self.name,
            aliases: self.aliases,
            usage,
            description: self.description,
            arguments: self.arguments,
            subcommands: self.subcommands.into_iter().map(Arc::new).collect(),
            restriction: self.restriction,
            action: self.action,
            shutdown: self.shutdown,
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(char::is_whitespace)
}

/// Immutable execution context handed to actions and validators.
///
/// Cheap to clone. The node is always the resolved command itself; the
/// top-level command it was reached through is available as [`root`].
///
/// [`root`]: Invocation::root
#[derive(Clone)]
pub struct Invocation {
    message: Arc<InboundMessage>,
    path: Arc<[String]>,
    node: Arc<CommandNode>,
    root: Arc<CommandNode>,
    registry: Arc<Registry>,
    prefix: Arc<str>,
    responder: Arc<dyn Responder>,
}

impl Invocation {
    pub(crate) fn new(
        message: Arc<InboundMessage>,
        path: Vec<String>,
        node: Arc<CommandNode>,
        root: Arc<CommandNode>,
        registry: Arc<Registry>,
        prefix: Arc<str>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            message,
            path: path.into(),
            node,
            root,
            registry,
            prefix,
            responder,
        }
    }

    /// The message being dispatched.
    pub fn message(&self) -> &InboundMessage {
        &self.message
    }

    /// Canonical names from the top-level command down, e.g. `["tag", "create"]`.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The resolved command.
    pub fn node(&self) -> &Arc<CommandNode> {
        &self.node
    }

    /// The top-level command the resolution started from.
    pub fn root(&self) -> &Arc<CommandNode> {
        &self.root
    }

    /// The frozen registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The configured command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The responder for this message.
    pub fn responder(&self) -> &Arc<dyn Responder> {
        &self.responder
    }

    /// Send plain text back to the channel.
    pub async fn say(&self, text: &str) {
        self.responder.say(&self.message, text).await;
    }

    /// Report a success back to the channel.
    pub async fn success(&self, text: &str) {
        self.responder.report_success(&self.message, text).await;
    }

    /// Report a failure back to the channel.
    pub async fn error(&self, text: &str) {
        self.responder.report_error(&self.message, text).await;
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("path", &self.path)
            .field("channel_id", &self.message.channel_id)
            .field("author_id", &self.message.author_id)
            .finish_non_exhaustive()
    }
}
