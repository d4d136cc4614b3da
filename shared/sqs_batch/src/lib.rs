//! Partial batch processing for SQS consumers
//!
//! This crate processes a batch of SQS messages one message at a time so that a
//! single failing message does not fail the whole batch. When some messages
//! fail, the origin queue is reconciled: handled messages are deleted and
//! non-retryable failures are deleted or moved to the dead-letter queue.
//!
//! ```rust,no_run
//! use sqs_batch::{
//!     handler_fn, BatchOptions, BatchProcessor, Environment, ErrorKind, MessageError, SqsEvent,
//!     SqsGateway, SqsMessage,
//! };
//!
//! const MALFORMED: ErrorKind = ErrorKind::new("malformed");
//!
//! # async fn run(event: SqsEvent) -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = SqsGateway::from_environment(&Environment::from_env()).await;
//! let processor = BatchProcessor::new(gateway);
//!
//! let mut handler = handler_fn(|message: &SqsMessage| {
//!     serde_json::from_str::<serde_json::Value>(message.body.as_deref().unwrap_or_default())
//!         .map_err(|err| MessageError::new(MALFORMED, err))
//! });
//!
//! let options = BatchOptions::default().with_non_retryable([MALFORMED]);
//! let values = processor
//!     .process(&event.records, &mut handler, &options)
//!     .await?;
//! assert_eq!(values.len(), event.records.len());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

pub mod chunk;
pub mod classifier;
pub mod environment;
/// Error types for queue operations and batch processing
pub mod error;
pub mod gateway;
pub mod handler;
/// SQS event and message types
pub mod message;
pub mod processor;
pub mod report;

pub use chunk::{chunk, MAX_BATCH_ENTRIES};
pub use classifier::{classify, Classification, ErrorKind};
pub use environment::Environment;
pub use error::{BatchError, QueueError, QueueResult};
pub use gateway::{
    queue_url_from_arn, BatchEntryOutcome, DeleteEntry, EntryFailure, QueueArn, QueueGateway,
    RedrivePolicy, SendEntry, SqsGateway,
};
pub use handler::{handler_fn, BoxError, HandlerFn, MessageError, MessageHandler};
pub use message::{SqsEvent, SqsMessage, SqsMessageAttribute};
pub use processor::{BatchOptions, BatchProcessor};
pub use report::{BatchFailureReport, Outcome};
