//! Error handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! parent module.

use crate::ident::Tag;


//------------ Error ---------------------------------------------------------

/// An error happened while decoding or constructing a value.
///
/// All errors are detected locally and are deterministic: decoding the same
/// data again will produce the same error. There is no recovery from any of
/// them. Because the components of a SEQUENCE are positional, a bad field
/// invalidates everything that follows it, so the decoding of the whole
/// enclosing structure is abandoned.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The data violates the encoding rules.
    ///
    /// The position is the offset in the decoded data of the value in
    /// question.
    #[error("malformed data at offset {pos}: {msg}")]
    Malformed {
        msg: &'static str,
        pos: usize,
    },

    /// A value had a different tag than the type it was decoded as.
    #[error("expected {expected}, found {found}")]
    UnexpectedTag {
        expected: Tag,
        found: Tag,
    },

    /// The number of elements of a SEQUENCE is outside the allowed range.
    #[error("{structure}: bad sequence size {actual} (expected {min}..={max})")]
    BadSequenceSize {
        structure: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// A SEQUENCE ended before a mandatory field.
    #[error("{structure}: sequence ended before `{field}`")]
    TruncatedSequence {
        structure: &'static str,
        field: &'static str,
    },

    /// Elements were left after all declared fields were read.
    #[error("{structure}: {remaining} unexpected trailing element(s)")]
    UnexpectedTrailingElements {
        structure: &'static str,
        remaining: usize,
    },

    /// A mandatory field was not present where it was expected.
    #[error("{structure}: missing mandatory field `{field}`")]
    MissingMandatoryField {
        structure: &'static str,
        field: &'static str,
    },

    /// No alternative of a CHOICE matched the tag of a value.
    #[error("{choice}: no alternative for tag {tag}")]
    UnresolvedChoice {
        choice: &'static str,
        tag: Tag,
    },

    /// A version field or a rule tied to it was violated.
    #[error("{structure}: {reason}")]
    InvalidVersion {
        structure: &'static str,
        reason: String,
    },

    /// An internal invariant does not hold.
    ///
    /// This indicates a bug in this crate or in code that declares
    /// structures using it rather than bad data.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Creates a malformed data error.
    pub fn malformed(msg: &'static str, pos: usize) -> Self {
        Error::Malformed { msg, pos }
    }

    /// Creates an error for an unexpected tag.
    pub fn unexpected_tag(expected: Tag, found: Tag) -> Self {
        Error::UnexpectedTag { expected, found }
    }

    /// Creates an error for an illegal version or version related rule.
    pub fn invalid_version(
        structure: &'static str, reason: impl Into<String>
    ) -> Self {
        Error::InvalidVersion { structure, reason: reason.into() }
    }

    /// Creates an error for a violated invariant.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }
}
