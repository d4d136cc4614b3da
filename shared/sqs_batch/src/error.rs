use std::fmt;

use aws_sdk_sqs::error::{BuildError, SdkError};
use aws_sdk_sqs::operation::delete_message_batch::DeleteMessageBatchError;
use aws_sdk_sqs::operation::get_queue_attributes::GetQueueAttributesError;
use aws_sdk_sqs::operation::send_message_batch::SendMessageBatchError;
use thiserror::Error;

use crate::report::BatchFailureReport;

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Error types for queue operations
#[derive(Error, Debug)]
pub enum QueueError {
    /// Error deleting a batch of messages from SQS
    #[error("Failed to delete message batch from SQS")]
    DeleteMessageBatch(#[from] SdkError<DeleteMessageBatchError>),

    /// Error sending a batch of messages to SQS
    #[error("Failed to send message batch to SQS")]
    SendMessageBatch(#[from] SdkError<SendMessageBatchError>),

    /// Error reading queue attributes from SQS
    #[error("Failed to get queue attributes from SQS")]
    GetQueueAttributes(#[from] SdkError<GetQueueAttributesError>),

    /// A batch request entry is missing a required field
    #[error("Failed to build batch request entry: {0}")]
    InvalidEntry(#[from] BuildError),

    /// The `RedrivePolicy` attribute is not valid JSON
    #[error("Invalid redrive policy: {0}")]
    InvalidRedrivePolicy(#[from] serde_json::Error),

    /// A message lacks a field needed to address it on the queue
    #[error(
        "SQS message {} is missing {field}",
        .message_id.as_deref().unwrap_or("<unknown>")
    )]
    MissingMessageField {
        /// ID of the message, if present
        message_id: Option<String>,
        /// Name of the missing field in the event payload
        field: &'static str,
    },

    /// Queue ARN could not be parsed
    #[error("Invalid queue ARN: {0}")]
    InvalidQueueArn(String),
}

/// Error returned when processing a batch
#[derive(Error, Debug)]
pub enum BatchError<T: fmt::Debug> {
    /// At least one message failed and exceptions are not suppressed
    #[error("{0}")]
    PartialFailure(BatchFailureReport<T>),

    /// Reconciling the batch against the queue failed
    #[error("Failed to clean up batch: {0}")]
    Queue(#[from] QueueError),
}

impl<T: fmt::Debug> BatchError<T> {
    /// Returns the failure report if this is a partial failure
    #[must_use]
    pub const fn report(&self) -> Option<&BatchFailureReport<T>> {
        match self {
            Self::PartialFailure(report) => Some(report),
            Self::Queue(_) => None,
        }
    }
}
