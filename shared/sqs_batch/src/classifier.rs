//! Retryable / non-retryable classification of handler errors
//!
//! Errors are tagged with an [`ErrorKind`]. Kinds form a hierarchy through a
//! `'static` parent link, so configuring a parent kind as non-retryable also
//! covers every kind derived from it.

use std::fmt;

use strum::Display;

use crate::handler::MessageError;

/// Tag identifying the kind of a [`MessageError`]
///
/// Kinds are usually declared as constants:
///
/// ```rust
/// use sqs_batch::ErrorKind;
///
/// const VALIDATION: ErrorKind = ErrorKind::new("validation");
/// const MISSING_FIELD: ErrorKind = ErrorKind::with_parent("missing_field", &VALIDATION);
///
/// assert!(MISSING_FIELD.is_a(&VALIDATION));
/// assert!(!VALIDATION.is_a(&MISSING_FIELD));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorKind {
    name: &'static str,
    parent: Option<&'static ErrorKind>,
}

impl ErrorKind {
    /// Kind given to errors that carry no explicit classification
    pub const UNCLASSIFIED: Self = Self::new("unclassified");

    /// Creates a root kind
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Creates a kind derived from `parent`
    #[must_use]
    pub const fn with_parent(name: &'static str, parent: &'static Self) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Name of this kind
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Direct parent of this kind, if any
    #[must_use]
    pub const fn parent(&self) -> Option<&'static Self> {
        self.parent
    }

    /// Returns true if this kind is `other` or derives from it
    #[must_use]
    pub fn is_a(&self, other: &Self) -> bool {
        self.lineage().any(|kind| kind == other)
    }

    /// Iterates over this kind followed by its ancestors, nearest first
    pub fn lineage(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Outcome of classifying a failed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Classification {
    /// The message is left on the queue for native redelivery
    Retryable,
    /// The message is deleted or redirected to the dead-letter queue
    NonRetryable,
}

/// Classifies `error` against the configured non-retryable kinds
///
/// Matching is opt-in: an error whose kind does not match, or derive from,
/// any of `non_retryable_kinds` is retryable.
#[must_use]
pub fn classify(error: &MessageError, non_retryable_kinds: &[ErrorKind]) -> Classification {
    let kind = error.kind();

    if non_retryable_kinds.iter().any(|candidate| kind.is_a(candidate)) {
        Classification::NonRetryable
    } else {
        Classification::Retryable
    }
}
