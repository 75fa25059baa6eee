//! Log group providers
//!
//! The pruner talks to CloudWatch Logs only through [`LogGroupProvider`], so the
//! whole flow can run against [`InMemoryProvider`] in tests.

use async_trait::async_trait;

use crate::error::{DeleteError, Result};
use crate::record::LogGroupRecord;

mod aws;
mod memory;

pub use aws::{create_logs_client, CloudWatchLogsProvider};
pub use memory::InMemoryProvider;

/// One page of a log group listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogGroupPage {
    pub log_groups: Vec<LogGroupRecord>,
    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

#[async_trait]
pub trait LogGroupProvider: Send + Sync {
    /// Fetch the page that starts at `next_token` (`None` for the first page).
    async fn describe_log_groups(&self, next_token: Option<String>) -> Result<LogGroupPage>;

    /// Delete a log group by name.
    async fn delete_log_group(&self, name: &str) -> std::result::Result<(), DeleteError>;
}
