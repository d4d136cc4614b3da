//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_sqs::Client as SqsClient;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the endpoint URL to use for SQS
    ///
    /// `SQS_ENDPOINT_URL` overrides the default in every environment.
    #[must_use]
    pub fn sqs_endpoint_url(&self) -> Option<String> {
        env::var("SQS_ENDPOINT_URL").ok().or_else(|| match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566".to_string()),
        })
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config)
            .build()
    }

    /// SQS client for this environment
    pub async fn sqs_client(&self) -> SqsClient {
        let aws_config = self.aws_config().await;
        let mut builder = aws_sdk_sqs::config::Builder::from(&aws_config);

        if let Some(endpoint_url) = self.sqs_endpoint_url() {
            builder = builder.endpoint_url(endpoint_url);
        }

        SqsClient::from_conf(builder.build())
    }
}
