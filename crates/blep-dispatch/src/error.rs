//! Error types for registration and dispatch.
//!
//! Registration errors are startup-fatal. Dispatch errors are recovered
//! locally: the dispatcher reports them through the [`Responder`] and the
//! dispatch ends normally.
//!
//! [`Responder`]: crate::responder::Responder

use thiserror::Error;

/// Errors raised while building commands or registering them.
///
/// None of these are recoverable; the process must not start dispatching
/// with a partially built registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A command name or alias collides with an existing name or alias.
    #[error("a command named `{0}` is already registered")]
    DuplicateCommandName(String),

    /// A trigger with the same pattern source is already registered.
    #[error("a trigger with pattern `{0}` is already registered")]
    DuplicateTriggerPattern(String),

    /// Two subcommands of the same parent share a name.
    #[error("command `{parent}` already has a subcommand named `{name}`")]
    DuplicateSubcommand {
        /// The parent command.
        parent: String,
        /// The clashing subcommand name.
        name: String,
    },

    /// An infinite argument was declared anywhere but last.
    #[error("argument `{argument}` of `{command}` is infinite but not the last argument")]
    InfiniteArgumentNotLast {
        /// The command declaring the argument.
        command: String,
        /// The offending argument.
        argument: String,
    },

    /// A command name is empty or contains whitespace, so it could never be typed.
    #[error("invalid command name `{0}`")]
    InvalidCommandName(String),

    /// The command prefix is empty.
    #[error("command prefix cannot be empty")]
    EmptyPrefix,
}

/// A single argument-binding failure.
///
/// Zero or more of these co-occur in one rejection; they are reported in
/// argument declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// A required argument was missing or empty.
    #[error("Required argument `{0}` was empty.")]
    RequiredArgumentMissing(String),

    /// Text was left over after the last non-infinite argument.
    #[error("Unexpected arguments: `{0}`")]
    UnexpectedArguments(String),

    /// A declared validator rejected the value.
    #[error("{message}")]
    ValidationFailed {
        /// The argument that failed validation.
        name: String,
        /// Message produced by the validator.
        message: String,
    },
}

impl ArgumentError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RequiredArgumentMissing(_) => "required_argument_missing",
            Self::UnexpectedArguments(_) => "unexpected_arguments",
            Self::ValidationFailed { .. } => "validation_failed",
        }
    }
}

/// Errors that end a command dispatch without running its action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No top-level name or alias matched.
    #[error("Unrecognized command `{0}`.")]
    UnrecognizedCommand(String),

    /// The command only runs in a group conversation.
    #[error("This command can only be executed in a group.")]
    ContextRestricted,

    /// One or more arguments failed to bind or validate.
    #[error("{}", join_messages(.0))]
    InvalidArguments(Vec<ArgumentError>),
}

impl DispatchError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnrecognizedCommand(_) => "unrecognized_command",
            Self::ContextRestricted => "context_restricted",
            Self::InvalidArguments(_) => "invalid_arguments",
        }
    }
}

fn join_messages(errors: &[ArgumentError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
