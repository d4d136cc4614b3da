//! LocalStack queue setup utilities

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sqs::{types::QueueAttributeName, Client as SqsClient};
use uuid::Uuid;

/// Test context that provides an SQS client and a pair of queues
pub struct QueueTestContext {
    pub sqs_client: Arc<SqsClient>,
    pub queue_url: String,
    pub dead_letter_queue_url: String,
    pub dead_letter_queue_arn: String,
}

impl QueueTestContext {
    /// Creates a queue whose redrive policy points at a fresh dead-letter queue
    pub async fn new(test_name: &str) -> Self {
        // Setup LocalStack client with hardcoded credentials for CI
        let credentials = Credentials::from_keys(
            "test", // AWS_ACCESS_KEY_ID
            "test", // AWS_SECRET_ACCESS_KEY
            None,   // no session token
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url("http://localhost:4566")
            .region("us-east-1")
            .credentials_provider(credentials)
            .load()
            .await;

        let sqs_client = Arc::new(SqsClient::new(&config));

        let dead_letter_queue_url =
            create_queue(&sqs_client, &format!("{test_name}-dlq-{}", Uuid::new_v4())).await;
        let dead_letter_queue_arn = sqs_client
            .get_queue_attributes()
            .queue_url(&dead_letter_queue_url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .expect("Failed to get dead-letter queue attributes")
            .attributes()
            .and_then(|attributes| attributes.get(&QueueAttributeName::QueueArn))
            .expect("Queue ARN not returned")
            .clone();

        let queue_url = create_queue(&sqs_client, &format!("{test_name}-{}", Uuid::new_v4())).await;

        Self {
            sqs_client,
            queue_url,
            dead_letter_queue_url,
            dead_letter_queue_arn,
        }
    }

    /// Points the redrive policy of the main queue at the dead-letter queue
    pub async fn attach_dead_letter_queue(&self, max_receive_count: u32) {
        let policy = serde_json::json!({
            "deadLetterTargetArn": self.dead_letter_queue_arn,
            "maxReceiveCount": max_receive_count.to_string(),
        });

        self.sqs_client
            .set_queue_attributes()
            .queue_url(&self.queue_url)
            .attributes(QueueAttributeName::RedrivePolicy, policy.to_string())
            .send()
            .await
            .expect("Failed to set redrive policy");
    }
}

async fn create_queue(sqs_client: &SqsClient, queue_name: &str) -> String {
    sqs_client
        .create_queue()
        .queue_name(queue_name)
        .send()
        .await
        .expect("Failed to create test queue")
        .queue_url()
        .expect("Queue URL not returned")
        .to_string()
}

impl Drop for QueueTestContext {
    fn drop(&mut self) {
        // Clean up both queues
        let client = self.sqs_client.clone();
        let queue_urls = [self.queue_url.clone(), self.dead_letter_queue_url.clone()];

        // Use tokio runtime to delete queues
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                for queue_url in queue_urls {
                    let _ = client.delete_queue().queue_url(&queue_url).send().await;
                }
            });
        }
    }
}
