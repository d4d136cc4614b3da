use std::{fmt, str::FromStr};

use crate::error::{QueueError, QueueResult};

/// Parsed SQS queue ARN, `arn:<partition>:sqs:<region>:<account>:<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueArn {
    partition: String,
    region: String,
    account_id: String,
    queue_name: String,
}

impl QueueArn {
    /// Region of the queue
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Account owning the queue
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Name of the queue
    #[must_use]
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Queue URL used by the SQS API
    #[must_use]
    pub fn queue_url(&self) -> String {
        let domain = match self.partition.as_str() {
            "aws-cn" => "amazonaws.com.cn",
            _ => "amazonaws.com",
        };

        format!(
            "https://sqs.{}.{domain}/{}/{}",
            self.region, self.account_id, self.queue_name
        )
    }
}

impl FromStr for QueueArn {
    type Err = QueueError;

    fn from_str(arn: &str) -> Result<Self, Self::Err> {
        let invalid = || QueueError::InvalidQueueArn(arn.to_string());

        let parts: Vec<&str> = arn.split(':').collect();
        let [prefix, partition, service, region, account_id, queue_name] = parts[..] else {
            return Err(invalid());
        };

        if prefix != "arn" || service != "sqs" {
            return Err(invalid());
        }
        if [partition, region, account_id, queue_name]
            .iter()
            .any(|part| part.is_empty())
        {
            return Err(invalid());
        }

        Ok(Self {
            partition: partition.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            queue_name: queue_name.to_string(),
        })
    }
}

impl fmt::Display for QueueArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:sqs:{}:{}:{}",
            self.partition, self.region, self.account_id, self.queue_name
        )
    }
}

/// Resolves the queue URL for a queue ARN
///
/// # Errors
///
/// Returns `QueueError::InvalidQueueArn` if `arn` is not an SQS queue ARN
pub fn queue_url_from_arn(arn: &str) -> QueueResult<String> {
    Ok(arn.parse::<QueueArn>()?.queue_url())
}
