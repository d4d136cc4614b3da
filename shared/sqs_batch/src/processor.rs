//! Batch orchestration
//!
//! [`BatchProcessor::process`] hands every message of a batch to a
//! [`MessageHandler`], then reconciles the origin queue when some messages
//! failed:
//!
//! - successfully handled messages are deleted, since the delivery layer
//!   would otherwise redeliver them together with the failures
//! - retryable failures stay on the queue for native redelivery
//! - non-retryable failures are either deleted or moved to the dead-letter
//!   queue named by the origin queue's redrive policy

use tracing::{debug, error, info, instrument, warn};

use crate::{
    chunk::{chunk, MAX_BATCH_ENTRIES},
    classifier::{classify, Classification, ErrorKind},
    error::{BatchError, QueueResult},
    gateway::{queue_url_from_arn, DeleteEntry, QueueGateway, SendEntry},
    handler::MessageHandler,
    message::{display_id, required_field, SqsMessage},
    report::{BatchFailureReport, Outcome},
};

/// Options for a single [`BatchProcessor::process`] call
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Return the success values instead of failing when some messages failed
    pub suppress_exception: bool,
    /// Error kinds that are not worth retrying through queue redelivery
    pub non_retryable_kinds: Vec<ErrorKind>,
    /// Delete non-retryable failures instead of moving them to the dead-letter queue
    pub delete_non_retryable: bool,
}

impl BatchOptions {
    /// Sets whether partial failures are suppressed
    #[must_use]
    pub const fn with_suppress_exception(mut self, suppress_exception: bool) -> Self {
        self.suppress_exception = suppress_exception;
        self
    }

    /// Adds error kinds that are treated as non-retryable
    #[must_use]
    pub fn with_non_retryable(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.non_retryable_kinds.extend(kinds);
        self
    }

    /// Sets whether non-retryable failures are deleted rather than redriven
    #[must_use]
    pub const fn with_delete_non_retryable(mut self, delete_non_retryable: bool) -> Self {
        self.delete_non_retryable = delete_non_retryable;
        self
    }
}

/// Processes SQS batches with per-message failure isolation
#[derive(Debug, Clone)]
pub struct BatchProcessor<G> {
    gateway: G,
}

impl<G: QueueGateway> BatchProcessor<G> {
    /// Creates a new batch processor
    ///
    /// # Arguments
    ///
    /// * `gateway` - Queue operations used to clean up after partial failures
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Queue gateway used by this processor
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Processes every message of `batch` with `handler`
    ///
    /// Messages are handled one at a time, in order. A failing message never
    /// stops the batch.
    ///
    /// After a partial failure, successes are deleted before any dead-letter
    /// work, so a failed redrive policy lookup or send leaves them deleted.
    /// Non-retryable failures are deleted together with the successes when
    /// `delete_non_retryable` is set, otherwise only after their copies were
    /// accepted by the dead-letter queue.
    ///
    /// # Returns
    ///
    /// The values returned by the handler, in batch order. When some messages
    /// failed and `suppress_exception` is set, only the values of the
    /// successful messages.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::PartialFailure` if at least one message failed and
    /// `suppress_exception` is not set. Returns `BatchError::Queue` if cleaning
    /// up the queue failed; cleanup already performed is not rolled back.
    #[instrument(skip_all, fields(batch_size = batch.len()))]
    pub async fn process<H>(
        &self,
        batch: &[SqsMessage],
        handler: &mut H,
        options: &BatchOptions,
    ) -> Result<Vec<H::Output>, BatchError<H::Output>>
    where
        H: MessageHandler,
    {
        let mut outcomes = Vec::with_capacity(batch.len());
        for message in batch {
            let outcome = Outcome::new(message, handler.handle(message).await);
            if let Outcome::Failure { error, .. } = &outcome {
                debug!(message_id = display_id(message), %error, "Message failed");
            }
            outcomes.push(outcome);
        }

        let failed = outcomes.iter().filter(|outcome| outcome.is_failure()).count();
        if failed == 0 {
            debug!("All messages processed successfully");
            return Ok(outcomes
                .into_iter()
                .filter_map(|outcome| match outcome {
                    Outcome::Success { value, .. } => Some(value),
                    Outcome::Failure { .. } => None,
                })
                .collect());
        }

        info!(
            failed,
            succeeded = batch.len() - failed,
            "Batch processed with failures"
        );

        self.reconcile(&outcomes, options).await?;

        let report = BatchFailureReport::from_outcomes(outcomes);
        if options.suppress_exception {
            debug!("Suppressing batch failure: {report}");
            Ok(report.into_success_values())
        } else {
            Err(BatchError::PartialFailure(report))
        }
    }

    /// Processes `batch` with a freshly constructed handler of type `H`
    ///
    /// # Errors
    ///
    /// See [`BatchProcessor::process`]
    pub async fn process_with<H>(
        &self,
        batch: &[SqsMessage],
        options: &BatchOptions,
    ) -> Result<Vec<H::Output>, BatchError<H::Output>>
    where
        H: MessageHandler + Default,
    {
        let mut handler = H::default();
        self.process(batch, &mut handler, options).await
    }

    /// Deletes successes and handles non-retryable failures on the origin queue
    ///
    /// Every entry is built before the first request, so a message missing a
    /// required field aborts cleanup before the queue is touched.
    async fn reconcile<T>(
        &self,
        outcomes: &[Outcome<'_, T>],
        options: &BatchOptions,
    ) -> QueueResult<()> {
        let mut successes = Vec::new();
        let mut non_retryable = Vec::new();

        for outcome in outcomes {
            match outcome {
                Outcome::Success { message, .. } => {
                    successes.push(DeleteEntry::try_from(*message)?);
                }
                Outcome::Failure { message, error } => {
                    let classification = classify(error, &options.non_retryable_kinds);
                    debug!(
                        message_id = display_id(message),
                        %classification,
                        "Classified failure"
                    );
                    if classification == Classification::NonRetryable {
                        non_retryable.push(*message);
                    }
                }
            }
        }

        if successes.is_empty() && non_retryable.is_empty() {
            return Ok(());
        }

        let Some(first) = outcomes.first() else {
            return Ok(());
        };
        let origin_arn = required_field(
            first.message(),
            first.message().event_source_arn.as_deref(),
            "eventSourceARN",
        )?;
        let origin_url = queue_url_from_arn(origin_arn)?;

        let failed_deletes = non_retryable
            .iter()
            .map(|message| DeleteEntry::try_from(*message))
            .collect::<QueueResult<Vec<_>>>()?;

        if options.delete_non_retryable {
            successes.extend(failed_deletes);
            return self.delete_messages(&origin_url, &successes).await;
        }

        let failed_sends = non_retryable
            .iter()
            .map(|message| SendEntry::try_from(*message))
            .collect::<QueueResult<Vec<_>>>()?;

        self.delete_messages(&origin_url, &successes).await?;

        if !failed_sends.is_empty()
            && self
                .move_to_dead_letter_queue(&origin_url, &failed_sends)
                .await?
        {
            self.delete_messages(&origin_url, &failed_deletes).await?;
        }

        Ok(())
    }

    /// Sends `entries` to the dead-letter queue of `origin_url`
    ///
    /// Returns false if the originals must stay on the origin queue, either
    /// because no dead-letter queue is configured or because SQS rejected
    /// some of the copies.
    async fn move_to_dead_letter_queue(
        &self,
        origin_url: &str,
        entries: &[SendEntry],
    ) -> QueueResult<bool> {
        let Some(policy) = self.gateway.get_redrive_policy(origin_url).await? else {
            warn!(
                queue_url = origin_url,
                count = entries.len(),
                "No redrive policy configured, non-retryable messages stay on the queue"
            );
            return Ok(false);
        };

        let dead_letter_url = queue_url_from_arn(&policy.dead_letter_target_arn)?;

        let mut moved = true;
        for entries in chunk(entries, MAX_BATCH_ENTRIES) {
            let outcome = self
                .gateway
                .send_message_batch(&dead_letter_url, entries.to_vec())
                .await?;

            for failure in &outcome.failed {
                error!(
                    queue_url = %dead_letter_url,
                    id = %failure.id,
                    code = %failure.code,
                    reason = failure.message.as_deref().unwrap_or("unknown"),
                    "Failed sending message to the dead-letter queue, check the function has sqs:SendMessage permission"
                );
            }
            moved &= !outcome.has_failures();
        }

        if moved {
            info!(
                queue_url = %dead_letter_url,
                count = entries.len(),
                "Moved non-retryable messages to the dead-letter queue"
            );
        }

        Ok(moved)
    }

    /// Deletes `entries` from the queue at `queue_url`, in chunks
    async fn delete_messages(&self, queue_url: &str, entries: &[DeleteEntry]) -> QueueResult<()> {
        for entries in chunk(entries, MAX_BATCH_ENTRIES) {
            let outcome = self
                .gateway
                .delete_message_batch(queue_url, entries.to_vec())
                .await?;

            for failure in &outcome.failed {
                warn!(
                    queue_url,
                    id = %failure.id,
                    code = %failure.code,
                    reason = failure.message.as_deref().unwrap_or("unknown"),
                    "Batch delete entry failed (message will be redelivered)"
                );
            }
        }

        Ok(())
    }
}
