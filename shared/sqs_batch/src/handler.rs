//! Per-message handlers and their errors

use async_trait::async_trait;
use thiserror::Error;

use crate::{classifier::ErrorKind, message::SqsMessage};

/// Boxed error returned by application code
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by a [`MessageHandler`] for a single message
///
/// The [`ErrorKind`] decides whether the failure is retryable, see
/// [`classify`](crate::classifier::classify).
#[derive(Error, Debug)]
#[error("{kind}: {source}")]
pub struct MessageError {
    kind: ErrorKind,
    #[source]
    source: BoxError,
}

impl MessageError {
    /// Creates an error of the given kind wrapping `source`
    #[must_use]
    pub fn new(kind: ErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// Creates an error of the given kind from a plain message
    #[must_use]
    pub fn msg(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message.into())
    }

    /// Creates an [`ErrorKind::UNCLASSIFIED`] error
    #[must_use]
    pub fn unclassified(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::UNCLASSIFIED, source)
    }

    /// Kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the wrapped error
    #[must_use]
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

impl From<anyhow::Error> for MessageError {
    fn from(err: anyhow::Error) -> Self {
        Self::unclassified(err)
    }
}

/// Processes one SQS message at a time
///
/// Handlers take `&mut self` since messages of a batch are handled strictly
/// in order, one at a time.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use sqs_batch::{MessageError, MessageHandler, SqsMessage};
///
/// #[derive(Default)]
/// struct BodyLength;
///
/// #[async_trait]
/// impl MessageHandler for BodyLength {
///     type Output = usize;
///
///     async fn handle(&mut self, message: &SqsMessage) -> Result<usize, MessageError> {
///         Ok(message.body.as_deref().map_or(0, str::len))
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler: Send {
    /// Value produced for a successfully handled message
    type Output: Send + std::fmt::Debug;

    /// Handles a single message
    ///
    /// # Errors
    ///
    /// Returns `MessageError` if the message could not be processed. The
    /// batch carries on with the next message.
    async fn handle(&mut self, message: &SqsMessage) -> Result<Self::Output, MessageError>;
}

/// [`MessageHandler`] backed by a synchronous closure, see [`handler_fn`]
pub struct HandlerFn<F> {
    f: F,
}

/// Wraps a closure into a [`MessageHandler`]
#[must_use]
pub fn handler_fn<F, T>(f: F) -> HandlerFn<F>
where
    F: FnMut(&SqsMessage) -> Result<T, MessageError> + Send,
    T: Send + std::fmt::Debug,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, T> MessageHandler for HandlerFn<F>
where
    F: FnMut(&SqsMessage) -> Result<T, MessageError> + Send,
    T: Send + std::fmt::Debug,
{
    type Output = T;

    async fn handle(&mut self, message: &SqsMessage) -> Result<T, MessageError> {
        (self.f)(message)
    }
}
