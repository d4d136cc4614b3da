pub use aws_lambda_events::event::sqs::{SqsEvent, SqsMessage, SqsMessageAttribute};

use crate::error::{QueueError, QueueResult};

/// Returns a field of `message` that the queue API requires
///
/// Missing and empty values are both rejected, SQS accepts neither.
pub(crate) fn required_field<'a>(
    message: &SqsMessage,
    value: Option<&'a str>,
    field: &'static str,
) -> QueueResult<&'a str> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| QueueError::MissingMessageField {
            message_id: message.message_id.clone(),
            field,
        })
}

/// Message ID used in logs and reports
pub(crate) fn display_id(message: &SqsMessage) -> &str {
    message.message_id.as_deref().unwrap_or("<unknown>")
}
