#![allow(dead_code)]

pub mod queue_utils;

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_sqs::error::SdkError;
use sqs_batch::{
    BatchEntryOutcome, DeleteEntry, EntryFailure, QueueError, QueueGateway, QueueResult,
    RedrivePolicy, SendEntry, SqsEvent, SqsMessage,
};

pub const QUEUE_ARN: &str = "arn:aws:sqs:us-east-2:123456789012:my-queue";
pub const QUEUE_URL: &str = "https://sqs.us-east-2.amazonaws.com/123456789012/my-queue";
pub const DLQ_ARN: &str = "arn:aws:sqs:us-east-2:123456789012:retry-queue";
pub const DLQ_URL: &str = "https://sqs.us-east-2.amazonaws.com/123456789012/retry-queue";

/// A call made against the [`RecordingGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Delete {
        queue_url: String,
        entries: Vec<DeleteEntry>,
    },
    Send {
        queue_url: String,
        entries: Vec<SendEntry>,
    },
    GetRedrivePolicy {
        queue_url: String,
    },
}

/// In-memory gateway recording every call made by the processor
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    redrive_policy: Option<RedrivePolicy>,
    rejected_sends: HashSet<String>,
    rejected_deletes: HashSet<String>,
    fail_deletes: bool,
    fail_sends: bool,
    fail_redrive_lookup: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the origin queue with a dead-letter queue
    pub fn with_dead_letter_queue(mut self) -> Self {
        self.redrive_policy = Some(RedrivePolicy {
            dead_letter_target_arn: DLQ_ARN.to_string(),
            max_receive_count: 2,
        });
        self
    }

    /// Makes SQS reject the send entry with the given ID
    pub fn rejecting_send(mut self, id: &str) -> Self {
        self.rejected_sends.insert(id.to_string());
        self
    }

    /// Makes SQS reject the delete entry with the given ID
    pub fn rejecting_delete(mut self, id: &str) -> Self {
        self.rejected_deletes.insert(id.to_string());
        self
    }

    /// Makes every delete request fail as a whole
    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Makes every send request fail as a whole
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Makes the redrive policy lookup fail, as without `sqs:GetQueueAttributes`
    pub fn failing_redrive_lookup(mut self) -> Self {
        self.fail_redrive_lookup = true;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<Vec<DeleteEntry>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Delete { entries, .. } => Some(entries),
                _ => None,
            })
            .collect()
    }

    pub fn sends(&self) -> Vec<Vec<SendEntry>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Send { entries, .. } => Some(entries),
                _ => None,
            })
            .collect()
    }

    /// IDs of every deleted message, in request order
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deletes()
            .into_iter()
            .flatten()
            .map(|entry| entry.id)
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl QueueGateway for RecordingGateway {
    async fn delete_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<DeleteEntry>,
    ) -> QueueResult<BatchEntryOutcome> {
        self.record(GatewayCall::Delete {
            queue_url: queue_url.to_string(),
            entries: entries.clone(),
        });

        if self.fail_deletes {
            return Err(QueueError::DeleteMessageBatch(
                SdkError::construction_failure("connection refused"),
            ));
        }

        let (failed, successful): (Vec<_>, Vec<_>) = entries
            .iter()
            .partition(|entry| self.rejected_deletes.contains(&entry.id));

        Ok(BatchEntryOutcome {
            successful: successful.into_iter().map(|entry| entry.id.clone()).collect(),
            failed: failed
                .into_iter()
                .map(|entry| EntryFailure {
                    id: entry.id.clone(),
                    code: "ReceiptHandleIsInvalid".to_string(),
                    message: Some("receipt handle has expired".to_string()),
                    sender_fault: true,
                })
                .collect(),
        })
    }

    async fn send_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<SendEntry>,
    ) -> QueueResult<BatchEntryOutcome> {
        self.record(GatewayCall::Send {
            queue_url: queue_url.to_string(),
            entries: entries.clone(),
        });

        if self.fail_sends {
            return Err(QueueError::SendMessageBatch(
                SdkError::construction_failure("connection refused"),
            ));
        }

        let (failed, successful): (Vec<_>, Vec<_>) = entries
            .iter()
            .partition(|entry| self.rejected_sends.contains(&entry.id));

        Ok(BatchEntryOutcome {
            successful: successful.into_iter().map(|entry| entry.id.clone()).collect(),
            failed: failed
                .into_iter()
                .map(|entry| EntryFailure {
                    id: entry.id.clone(),
                    code: "AccessDenied".to_string(),
                    message: Some("not authorized to perform sqs:SendMessage".to_string()),
                    sender_fault: true,
                })
                .collect(),
        })
    }

    async fn get_redrive_policy(&self, queue_url: &str) -> QueueResult<Option<RedrivePolicy>> {
        self.record(GatewayCall::GetRedrivePolicy {
            queue_url: queue_url.to_string(),
        });

        if self.fail_redrive_lookup {
            return Err(QueueError::GetQueueAttributes(
                SdkError::construction_failure("access denied"),
            ));
        }

        Ok(self.redrive_policy.clone())
    }
}

/// Loads the two-record sample event
pub fn sample_event() -> SqsEvent {
    serde_json::from_str(include_str!("../fixtures/sample_batch_event.json"))
        .expect("sample event should deserialize")
}

/// Builds a batch of `size` messages from the origin queue
pub fn batch_of(size: usize) -> Vec<SqsMessage> {
    (0..size)
        .map(|index| {
            let mut message = SqsMessage::default();
            message.message_id = Some(format!("message-{index}"));
            message.receipt_handle = Some(format!("receipt-{index}"));
            message.body = Some(format!("{{\"index\":{index}}}"));
            message.event_source = Some("aws:sqs".to_string());
            message.event_source_arn = Some(QUEUE_ARN.to_string());
            message.aws_region = Some("us-east-2".to_string());
            message
        })
        .collect()
}

/// ID of a message built by [`batch_of`] or loaded from a fixture
pub fn id_of(message: &SqsMessage) -> String {
    message.message_id.clone().unwrap_or_default()
}
