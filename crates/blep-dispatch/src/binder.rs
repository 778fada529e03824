//! Argument binding and validation.
//!
//! Every declared position is checked concurrently and every failure is
//! collected; the caller gets either the bound values or all errors, in
//! declaration order.

use crate::command::{ArgumentSpec, BoundArgs, CommandNode, Invocation};
use crate::error::ArgumentError;
use crate::tokenize::split_fields;
use futures_util::future::join_all;
use tracing::trace;

/// Bind `remainder` to the declared arguments of `node`.
///
/// The action may run only when this returns `Ok`.
pub async fn bind_arguments(
    node: &CommandNode,
    remainder: Option<&str>,
    invocation: &Invocation,
) -> Result<BoundArgs, Vec<ArgumentError>> {
    let arguments = node.arguments();
    let k = arguments.len();

    if k == 0 {
        return match remainder.filter(|r| !r.is_empty()) {
            Some(text) => Err(vec![ArgumentError::UnexpectedArguments(text.to_string())]),
            None => Ok(Vec::new()),
        };
    }

    let mut values = split_fields(remainder, k - 1);
    values.resize(k, None);
    let overflow = split_fields(remainder, k)
        .get(k)
        .copied()
        .flatten()
        .filter(|text| !text.is_empty());

    let checks = arguments
        .iter()
        .zip(&values)
        .enumerate()
        .map(|(i, (spec, value))| {
            let overflow = if i == k - 1 && !spec.is_infinite() {
                overflow
            } else {
                None
            };
            async move { (i, check_position(spec, *value, overflow, invocation).await) }
        });
    let mut outcomes = join_all(checks).await;
    outcomes.sort_by_key(|(i, _)| *i);

    let errors: Vec<ArgumentError> = outcomes
        .into_iter()
        .filter_map(|(_, outcome)| outcome.err())
        .collect();
    if !errors.is_empty() {
        trace!(command = %node.name(), errors = errors.len(), "Argument binding failed");
        return Err(errors);
    }

    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Check one position: required, then overflow, then the validator.
async fn check_position(
    spec: &ArgumentSpec,
    value: Option<&str>,
    overflow: Option<&str>,
    invocation: &Invocation,
) -> Result<(), ArgumentError> {
    let present = value.filter(|v| !v.is_empty());

    if !spec.is_optional() && present.is_none() {
        return Err(ArgumentError::RequiredArgumentMissing(
            spec.name().to_string(),
        ));
    }
    if let Some(text) = overflow {
        return Err(ArgumentError::UnexpectedArguments(text.to_string()));
    }

    let (Some(validator), Some(value)) = (spec.validator(), present) else {
        return Ok(());
    };
    let verdict = validator.validate(invocation, value).await;
    if verdict.valid {
        Ok(())
    } else {
        Err(ArgumentError::ValidationFailed {
            name: spec.name().to_string(),
            message: verdict
                .message
                .unwrap_or_else(|| format!("Invalid value for `{}`.", spec.name())),
        })
    }
}
