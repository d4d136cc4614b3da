//! Queue operations used to reconcile a processed batch
//!
//! The [`QueueGateway`] trait abstracts the three SQS calls the batch
//! processor needs. [`SqsGateway`] implements it on top of the AWS SDK.

/// Queue ARN parsing and URL resolution
pub mod arn;
/// AWS SDK backed gateway
pub mod sqs_gateway;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::{
    error::{QueueError, QueueResult},
    message::{required_field, SqsMessage, SqsMessageAttribute},
};

pub use arn::{queue_url_from_arn, QueueArn};
pub use sqs_gateway::SqsGateway;

/// Entry of a `DeleteMessageBatch` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEntry {
    /// Entry ID, unique within one request
    pub id: String,
    /// Receipt handle of the message to delete
    pub receipt_handle: String,
}

impl TryFrom<&SqsMessage> for DeleteEntry {
    type Error = QueueError;

    fn try_from(message: &SqsMessage) -> QueueResult<Self> {
        Ok(Self {
            id: required_field(message, message.message_id.as_deref(), "messageId")?.to_string(),
            receipt_handle: required_field(
                message,
                message.receipt_handle.as_deref(),
                "receiptHandle",
            )?
            .to_string(),
        })
    }
}

/// Entry of a `SendMessageBatch` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEntry {
    /// Entry ID, unique within one request
    pub id: String,
    /// Message body
    pub body: String,
    /// Message attributes carried over to the new message
    pub message_attributes: HashMap<String, SqsMessageAttribute>,
}

impl TryFrom<&SqsMessage> for SendEntry {
    type Error = QueueError;

    fn try_from(message: &SqsMessage) -> QueueResult<Self> {
        Ok(Self {
            id: required_field(message, message.message_id.as_deref(), "messageId")?.to_string(),
            body: required_field(message, message.body.as_deref(), "body")?.to_string(),
            message_attributes: message.message_attributes.clone(),
        })
    }
}

/// Entry of a batch request that SQS rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// ID of the rejected entry
    pub id: String,
    /// Error code reported by SQS
    pub code: String,
    /// Error message reported by SQS
    pub message: Option<String>,
    /// Whether the caller is at fault
    pub sender_fault: bool,
}

/// Per-entry result of a batch request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEntryOutcome {
    /// IDs of the entries that succeeded
    pub successful: Vec<String>,
    /// Entries that failed
    pub failed: Vec<EntryFailure>,
}

impl BatchEntryOutcome {
    /// Returns true if at least one entry failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Dead-letter configuration of a queue, from its `RedrivePolicy` attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedrivePolicy {
    /// ARN of the dead-letter queue
    pub dead_letter_target_arn: String,
    /// Receives before SQS moves a message to the dead-letter queue
    #[serde(deserialize_with = "deserialize_receive_count")]
    pub max_receive_count: u32,
}

impl RedrivePolicy {
    /// Parses the JSON value of a `RedrivePolicy` attribute
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidRedrivePolicy` if the value is malformed
    pub fn parse(policy: &str) -> QueueResult<Self> {
        Ok(serde_json::from_str(policy)?)
    }
}

// SQS accepts the count both as a number and as a string
fn deserialize_receive_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(count) => Ok(count),
        Count::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Queue operations needed to clean up after a partially failed batch
///
/// Each call is a single request. Entry lists hold at most
/// [`MAX_BATCH_ENTRIES`](crate::chunk::MAX_BATCH_ENTRIES) entries.
#[async_trait]
pub trait QueueGateway: Send + Sync {
    /// Deletes a batch of messages from the queue at `queue_url`
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the request fails as a whole
    async fn delete_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<DeleteEntry>,
    ) -> QueueResult<BatchEntryOutcome>;

    /// Sends a batch of messages to the queue at `queue_url`
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the request fails as a whole
    async fn send_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<SendEntry>,
    ) -> QueueResult<BatchEntryOutcome>;

    /// Fetches the redrive policy of the queue at `queue_url`
    ///
    /// Returns `None` if the queue has no dead-letter queue configured.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the attributes cannot be read or parsed
    async fn get_redrive_policy(&self, queue_url: &str) -> QueueResult<Option<RedrivePolicy>>;
}
