//! Whitespace tokenizer with a bounded split budget.
//!
//! `split_whitespace_n(text, n)` performs at most `n` splits on runs of
//! whitespace. Whatever is left after the last split, embedded whitespace
//! included, becomes the final field. When the input runs out of whitespace
//! early, the result is padded with `None` ("missing") up to `n + 1` fields.
//!
//! ```rust
//! use blep_dispatch::split_whitespace_n;
//!
//! assert_eq!(split_whitespace_n(Some("a b c"), 1).unwrap(), vec![Some("a"), Some("b c")]);
//! assert_eq!(split_whitespace_n(Some("a"), 2).unwrap(), vec![Some("a"), None, None]);
//! assert!(split_whitespace_n(Some("a"), -1).is_err());
//! ```
//!
//! The dispatcher uses the same primitive to pull the command word (`n = 1`),
//! descend subcommands one level at a time (`n = 1`), bind `k` positional
//! arguments (`n = k - 1`) and detect overflow text (`n = k`).

use thiserror::Error;

/// Fields produced by the tokenizer. `None` marks a missing field.
pub type Fields<'a> = Vec<Option<&'a str>>;

/// Tokenizer contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// The split count was negative.
    #[error("split count cannot be negative (got {0})")]
    NegativeSplitCount(isize),
}

/// Split `text` on at most `n` whitespace runs.
///
/// - Empty or absent text yields no fields, whatever `n` is.
/// - `n == 0` yields the text unmodified as the only field.
/// - Otherwise the result always has exactly `n + 1` fields.
pub fn split_whitespace_n(text: Option<&str>, n: isize) -> Result<Fields<'_>, TokenizeError> {
    let n = usize::try_from(n).map_err(|_| TokenizeError::NegativeSplitCount(n))?;
    Ok(split_fields(text, n))
}

/// Infallible form of [`split_whitespace_n`] for callers holding a `usize`.
pub(crate) fn split_fields(text: Option<&str>, n: usize) -> Fields<'_> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Vec::new();
    };
    if n == 0 {
        return vec![Some(text)];
    }

    let mut fields = Vec::with_capacity(n + 1);
    let mut rest = text;
    while fields.len() < n {
        let Some((start, end)) = next_whitespace_run(rest) else {
            break;
        };
        fields.push(Some(&rest[..start]));
        rest = &rest[end..];
    }
    fields.push(Some(rest).filter(|r| !r.is_empty()));
    fields.resize(n + 1, None);
    fields
}

/// Byte range of the first run of one or more whitespace characters.
fn next_whitespace_run(s: &str) -> Option<(usize, usize)> {
    let start = s.find(char::is_whitespace)?;
    let end = s[start..]
        .find(|c: char| !c.is_whitespace())
        .map_or(s.len(), |offset| start + offset);
    Some((start, end))
}
