//! CloudWatch Logs provider backed by the AWS SDK

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::operation::delete_log_group::DeleteLogGroupError;
use aws_sdk_cloudwatchlogs::Client;
use cwprune_config::AwsConfig;
use tracing::{debug, warn};

use super::{LogGroupPage, LogGroupProvider};
use crate::error::{DeleteError, PruneError, Result};
use crate::record::LogGroupRecord;

/// Create a CloudWatch Logs client from configuration.
///
/// Unset fields fall through to the SDK's default region and credential chains.
pub async fn create_logs_client(config: &AwsConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    // Custom endpoint (for LocalStack)
    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    Client::new(&loader.load().await)
}

pub struct CloudWatchLogsProvider {
    client: Client,
}

impl CloudWatchLogsProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &AwsConfig) -> Self {
        Self::new(create_logs_client(config).await)
    }
}

#[async_trait]
impl LogGroupProvider for CloudWatchLogsProvider {
    async fn describe_log_groups(&self, next_token: Option<String>) -> Result<LogGroupPage> {
        let output = self
            .client
            .describe_log_groups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| PruneError::listing(DisplayErrorContext(&e).to_string()))?;

        let mut log_groups = Vec::with_capacity(output.log_groups().len());
        for group in output.log_groups() {
            let Some(name) = group.log_group_name() else {
                warn!(arn = ?group.arn(), "Skipping log group without a name");
                continue;
            };
            log_groups.push(LogGroupRecord::new(
                name,
                group.arn().unwrap_or_default(),
                group.retention_in_days(),
            ));
        }

        debug!(count = log_groups.len(), "Fetched log group page");

        Ok(LogGroupPage {
            log_groups,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn delete_log_group(&self, name: &str) -> std::result::Result<(), DeleteError> {
        self.client
            .delete_log_group()
            .log_group_name(name)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let context = DisplayErrorContext(&e).to_string();
                map_delete_error(e.into_service_error(), context)
            })
    }
}

/// Map the SDK's delete error onto the kinds the pruner handles.
/// `context` is the full error chain, used for anything unrecognized.
fn map_delete_error(err: DeleteLogGroupError, context: String) -> DeleteError {
    match err {
        DeleteLogGroupError::ResourceNotFoundException(e) => {
            DeleteError::NotFound(e.message().unwrap_or("log group not found").to_string())
        }
        DeleteLogGroupError::OperationAbortedException(e) => {
            DeleteError::Aborted(e.message().unwrap_or("operation aborted").to_string())
        }
        DeleteLogGroupError::ServiceUnavailableException(e) => DeleteError::ServiceUnavailable(
            e.message().unwrap_or("service unavailable").to_string(),
        ),
        _ => DeleteError::Unknown(context),
    }
}
