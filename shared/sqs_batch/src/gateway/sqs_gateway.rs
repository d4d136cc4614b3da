use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use aws_sdk_sqs::{
    primitives::Blob,
    types::{
        BatchResultErrorEntry, DeleteMessageBatchRequestEntry, MessageAttributeValue,
        QueueAttributeName, SendMessageBatchRequestEntry,
    },
    Client as SqsClient,
};
use tracing::debug;

use crate::{
    environment::Environment,
    error::QueueResult,
    gateway::{
        BatchEntryOutcome, DeleteEntry, EntryFailure, QueueGateway, RedrivePolicy, SendEntry,
    },
    message::SqsMessageAttribute,
};

/// [`QueueGateway`] backed by an SQS client
#[derive(Debug, Clone)]
pub struct SqsGateway {
    sqs_client: Arc<SqsClient>,
}

impl SqsGateway {
    /// Creates a new gateway
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>) -> Self {
        Self { sqs_client }
    }

    /// Creates a gateway with a client configured for `environment`
    pub async fn from_environment(environment: &Environment) -> Self {
        Self::new(Arc::new(environment.sqs_client().await))
    }
}

#[async_trait]
impl QueueGateway for SqsGateway {
    async fn delete_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<DeleteEntry>,
    ) -> QueueResult<BatchEntryOutcome> {
        let entries = entries
            .into_iter()
            .map(|entry| {
                DeleteMessageBatchRequestEntry::builder()
                    .id(entry.id)
                    .receipt_handle(entry.receipt_handle)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .sqs_client
            .delete_message_batch()
            .queue_url(queue_url)
            .set_entries(Some(entries))
            .send()
            .await?;

        debug!(
            queue_url,
            successful = output.successful().len(),
            failed = output.failed().len(),
            "Deleted message batch"
        );

        Ok(BatchEntryOutcome {
            successful: output
                .successful()
                .iter()
                .map(|entry| entry.id().to_string())
                .collect(),
            failed: output.failed().iter().map(EntryFailure::from).collect(),
        })
    }

    async fn send_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<SendEntry>,
    ) -> QueueResult<BatchEntryOutcome> {
        let entries = entries
            .into_iter()
            .map(|entry| -> QueueResult<SendMessageBatchRequestEntry> {
                let attributes = to_sdk_attributes(entry.message_attributes)?;

                Ok(SendMessageBatchRequestEntry::builder()
                    .id(entry.id)
                    .message_body(entry.body)
                    .set_message_attributes((!attributes.is_empty()).then_some(attributes))
                    .build()?)
            })
            .collect::<QueueResult<Vec<_>>>()?;

        let output = self
            .sqs_client
            .send_message_batch()
            .queue_url(queue_url)
            .set_entries(Some(entries))
            .send()
            .await?;

        debug!(
            queue_url,
            successful = output.successful().len(),
            failed = output.failed().len(),
            "Sent message batch"
        );

        Ok(BatchEntryOutcome {
            successful: output
                .successful()
                .iter()
                .map(|entry| entry.id().to_string())
                .collect(),
            failed: output.failed().iter().map(EntryFailure::from).collect(),
        })
    }

    async fn get_redrive_policy(&self, queue_url: &str) -> QueueResult<Option<RedrivePolicy>> {
        let output = self
            .sqs_client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::RedrivePolicy)
            .send()
            .await?;

        output
            .attributes()
            .and_then(|attributes| attributes.get(&QueueAttributeName::RedrivePolicy))
            .map(|policy| RedrivePolicy::parse(policy))
            .transpose()
    }
}

impl From<&BatchResultErrorEntry> for EntryFailure {
    fn from(entry: &BatchResultErrorEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            code: entry.code().to_string(),
            message: entry.message().map(ToString::to_string),
            sender_fault: entry.sender_fault(),
        }
    }
}

// Binary values arrive base64 decoded and are sent back as raw bytes
fn to_sdk_attributes(
    attributes: HashMap<String, SqsMessageAttribute>,
) -> QueueResult<HashMap<String, MessageAttributeValue>> {
    attributes
        .into_iter()
        .map(|(name, attribute)| -> QueueResult<(String, MessageAttributeValue)> {
            let value = MessageAttributeValue::builder()
                .set_data_type(attribute.data_type)
                .set_string_value(attribute.string_value)
                .set_binary_value(attribute.binary_value.map(|data| Blob::new(data.0)))
                .build()?;

            Ok((name, value))
        })
        .collect()
}
