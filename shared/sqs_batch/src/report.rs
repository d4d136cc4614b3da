//! Aggregated outcome of a partially failed batch

use std::fmt;

use crate::{
    handler::MessageError,
    message::{display_id, SqsMessage},
};

/// Outcome of handling one message
#[derive(Debug)]
pub enum Outcome<'a, T> {
    /// The handler returned a value
    Success {
        /// Handled message
        message: &'a SqsMessage,
        /// Value returned by the handler
        value: T,
    },
    /// The handler failed
    Failure {
        /// Handled message
        message: &'a SqsMessage,
        /// Error returned by the handler
        error: MessageError,
    },
}

impl<'a, T> Outcome<'a, T> {
    /// Builds the outcome of a handler call for `message`
    #[must_use]
    pub fn new(message: &'a SqsMessage, result: Result<T, MessageError>) -> Self {
        match result {
            Ok(value) => Self::Success { message, value },
            Err(error) => Self::Failure { message, error },
        }
    }

    /// Message this outcome belongs to
    #[must_use]
    pub const fn message(&self) -> &'a SqsMessage {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => *message,
        }
    }

    /// Returns true for a failed message
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Details of a batch in which at least one message failed
///
/// Failed errors, failed messages and success values are kept in the order
/// the messages were processed. `errors()[i]` is the error of `failures()[i]`.
#[derive(Debug)]
pub struct BatchFailureReport<T> {
    errors: Vec<MessageError>,
    failures: Vec<SqsMessage>,
    success_values: Vec<T>,
}

impl<T> BatchFailureReport<T> {
    /// Splits processing outcomes into a report
    #[must_use]
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = Outcome<'a, T>>) -> Self {
        let mut report = Self {
            errors: Vec::new(),
            failures: Vec::new(),
            success_values: Vec::new(),
        };

        for outcome in outcomes {
            match outcome {
                Outcome::Success { value, .. } => report.success_values.push(value),
                Outcome::Failure { message, error } => {
                    report.failures.push(message.clone());
                    report.errors.push(error);
                }
            }
        }

        report
    }

    /// Errors raised for the failed messages
    #[must_use]
    pub fn errors(&self) -> &[MessageError] {
        &self.errors
    }

    /// Messages that failed
    #[must_use]
    pub fn failures(&self) -> &[SqsMessage] {
        &self.failures
    }

    /// Values returned for the successfully handled messages
    #[must_use]
    pub fn success_values(&self) -> &[T] {
        &self.success_values
    }

    /// Iterates over failed messages paired with their error
    pub fn failed_messages(&self) -> impl Iterator<Item = (&SqsMessage, &MessageError)> {
        self.failures.iter().zip(&self.errors)
    }

    /// Consumes the report, returning the success values
    #[must_use]
    pub fn into_success_values(self) -> Vec<T> {
        self.success_values
    }

    /// Consumes the report, returning errors, failed messages and success values
    #[must_use]
    pub fn into_parts(self) -> (Vec<MessageError>, Vec<SqsMessage>, Vec<T>) {
        (self.errors, self.failures, self.success_values)
    }
}

impl<T> fmt::Display for BatchFailureReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (message, error)) in self.failed_messages().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {error}", display_id(message))?;
        }
        Ok(())
    }
}
