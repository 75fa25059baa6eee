//! Listing, filtering and confirmed deletion of log groups

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use cwprune_config::{PrunerConfig, RetryConfig, UnknownErrorPolicy};
use tracing::{debug, info, warn};

use crate::confirm::ConfirmDeletion;
use crate::error::{DeleteError, PruneError, Result};
use crate::provider::LogGroupProvider;
use crate::record::LogGroupRecord;
use crate::retry::backoff_duration;

/// Keeps log groups whose name contains a substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    pattern: String,
}

impl NameFilter {
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        name.contains(&self.pattern)
    }
}

/// Terminal state of a single log group's deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Operator declined; nothing was sent
    Skipped,
    Deleted,
    /// The log group was already gone when the delete arrived
    AlreadyGone,
    AbortedByProvider { message: String },
    /// Service stayed unavailable for every attempt
    GivenUp { attempts: u32 },
    /// Unrecognized error under [`UnknownErrorPolicy::Skip`]
    Failed { message: String },
}

/// Counts for one prune run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub listed: usize,
    pub matched: usize,
    pub deleted: usize,
    pub already_gone: usize,
    pub skipped: usize,
    pub aborted: usize,
    pub given_up: usize,
    pub failed: usize,
}

impl PruneSummary {
    fn record(&mut self, outcome: &DeletionOutcome) {
        match outcome {
            DeletionOutcome::Skipped => self.skipped += 1,
            DeletionOutcome::Deleted => self.deleted += 1,
            DeletionOutcome::AlreadyGone => self.already_gone += 1,
            DeletionOutcome::AbortedByProvider { .. } => self.aborted += 1,
            DeletionOutcome::GivenUp { .. } => self.given_up += 1,
            DeletionOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for PruneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listed={} matched={} deleted={} already_gone={} skipped={} aborted={} given_up={} failed={}",
            self.listed,
            self.matched,
            self.deleted,
            self.already_gone,
            self.skipped,
            self.aborted,
            self.given_up,
            self.failed
        )
    }
}

/// Lists log groups, filters them by name and deletes the ones the operator
/// confirms, one at a time in listing order.
pub struct LogGroupPruner {
    provider: Arc<dyn LogGroupProvider>,
    retry: RetryConfig,
    on_unknown_error: UnknownErrorPolicy,
    dry_run: bool,
}

impl LogGroupPruner {
    pub fn new(provider: Arc<dyn LogGroupProvider>) -> Self {
        Self {
            provider,
            retry: RetryConfig::default(),
            on_unknown_error: UnknownErrorPolicy::default(),
            dry_run: false,
        }
    }

    /// Build a pruner from a full configuration, validating it first.
    pub fn from_config(provider: Arc<dyn LogGroupProvider>, config: &PrunerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PruneError::invalid_config(format!("{:#}", e)))?;

        Ok(Self::new(provider)
            .with_retry(config.retry.clone())
            .with_unknown_error_policy(config.on_unknown_error)
            .with_dry_run(config.dry_run))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_unknown_error_policy(mut self, policy: UnknownErrorPolicy) -> Self {
        self.on_unknown_error = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Every log group visible to the provider, pages concatenated in order.
    pub async fn list_all(&self) -> Result<Vec<LogGroupRecord>> {
        let mut all = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .provider
                .describe_log_groups(next_token.clone())
                .await?;
            pages += 1;
            all.extend(page.log_groups);

            match page.next_token {
                Some(token) if next_token.as_deref() == Some(token.as_str()) => {
                    return Err(PruneError::listing(format!(
                        "pagination did not advance (token '{}' returned twice)",
                        token
                    )));
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(pages, count = all.len(), "Listed log groups");
        Ok(all)
    }

    /// Records whose name matches `filter`, in their original order.
    pub fn filter(records: Vec<LogGroupRecord>, filter: &NameFilter) -> Vec<LogGroupRecord> {
        records
            .into_iter()
            .filter(|record| filter.matches(record.name()))
            .collect()
    }

    pub fn report<W: Write>(records: &[LogGroupRecord], out: &mut W) -> std::io::Result<()> {
        if records.is_empty() {
            writeln!(out, "No matching log groups found.")?;
            return Ok(());
        }

        writeln!(out, "Found {} matching log group(s):", records.len())?;
        for record in records {
            writeln!(out, "{}", record)?;
        }
        Ok(())
    }

    /// Ask for confirmation, then delete `record`, retrying while the service
    /// reports itself unavailable (at most `retry.max_retries` times).
    pub async fn delete_one<C>(&self, record: &LogGroupRecord, confirm: &mut C) -> Result<DeletionOutcome>
    where
        C: ConfirmDeletion + ?Sized,
    {
        let name = record.name();

        if !confirm.confirm(record)? {
            info!(log_group = name, "Deletion skipped");
            return Ok(DeletionOutcome::Skipped);
        }

        let mut retries = 0u32;
        loop {
            match self.provider.delete_log_group(name).await {
                Ok(()) => {
                    info!(log_group = name, "Deleted log group");
                    return Ok(DeletionOutcome::Deleted);
                }
                Err(DeleteError::NotFound(message)) => {
                    info!(log_group = name, %message, "Log group already gone, nothing to delete");
                    return Ok(DeletionOutcome::AlreadyGone);
                }
                Err(DeleteError::Aborted(message)) => {
                    warn!(log_group = name, %message, "Deletion aborted by provider");
                    return Ok(DeletionOutcome::AbortedByProvider { message });
                }
                Err(DeleteError::ServiceUnavailable(message)) => {
                    if retries >= self.retry.max_retries {
                        warn!(
                            log_group = name,
                            attempts = retries + 1,
                            %message,
                            "Service still unavailable, skipping deletion"
                        );
                        return Ok(DeletionOutcome::GivenUp {
                            attempts: retries + 1,
                        });
                    }

                    let backoff = backoff_duration(&self.retry, retries);
                    retries += 1;
                    warn!(
                        log_group = name,
                        attempt = retries,
                        max_retries = self.retry.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        %message,
                        "Service unavailable, retrying delete"
                    );
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(DeleteError::Unknown(message)) => match self.on_unknown_error {
                    UnknownErrorPolicy::Abort => return Err(PruneError::delete(name, message)),
                    UnknownErrorPolicy::Skip => {
                        warn!(log_group = name, %message, "Delete failed, continuing");
                        return Ok(DeletionOutcome::Failed { message });
                    }
                },
            }
        }
    }

    /// list → filter → report → confirm and delete each match in order.
    pub async fn prune_all<C, W>(
        &self,
        filter: &NameFilter,
        confirm: &mut C,
        out: &mut W,
    ) -> Result<PruneSummary>
    where
        C: ConfirmDeletion + ?Sized,
        W: Write,
    {
        let all = self.list_all().await?;
        let mut summary = PruneSummary {
            listed: all.len(),
            ..Default::default()
        };

        let matched = Self::filter(all, filter);
        summary.matched = matched.len();
        info!(
            pattern = filter.pattern(),
            listed = summary.listed,
            matched = summary.matched,
            "Filtered log groups"
        );

        Self::report(&matched, out)?;
        out.flush()?;

        if self.dry_run {
            info!("Dry run, no log groups deleted");
            return Ok(summary);
        }

        for record in &matched {
            let outcome = self.delete_one(record, &mut *confirm).await?;
            summary.record(&outcome);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{DecisionList, FixedDecision};
    use crate::provider::InMemoryProvider;

    fn no_wait() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            jitter: false,
        }
    }

    fn record(name: &str) -> LogGroupRecord {
        LogGroupRecord::new(name, format!("arn:aws:logs:::log-group:{}", name), None)
    }

    fn pruner(provider: &Arc<InMemoryProvider>) -> LogGroupPruner {
        LogGroupPruner::new(provider.clone()).with_retry(no_wait())
    }

    #[test]
    fn test_filter_preserves_order() {
        let records = vec![
            record("/aws/lambda/foo"),
            record("/other/bar"),
            record("/aws/lambda/baz"),
        ];
        let kept = LogGroupPruner::filter(records, &NameFilter::contains("aws/lambda"));
        let names: Vec<_> = kept.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["/aws/lambda/foo", "/aws/lambda/baz"]);
    }

    #[test]
    fn test_report_header() {
        let mut out = Vec::new();
        LogGroupPruner::report(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No matching log groups found.\n");

        let mut out = Vec::new();
        let records = vec![
            LogGroupRecord::new("/aws/lambda/a", "arn:a", None),
            LogGroupRecord::new("/aws/lambda/b", "arn:b", Some(0)),
        ];
        LogGroupPruner::report(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Found 2 matching log group(s):\n"));
        assert!(text.contains("name=/aws/lambda/a, short_name=a, arn=arn:a, prefix=/aws/lambda, retentionInDays=-1"));
        assert!(text.contains("retentionInDays=0)"));
    }

    #[tokio::test]
    async fn test_list_all_concatenates_pages() {
        let records: Vec<_> = (0..7).map(|i| record(&format!("/g/{}", i))).collect();
        let provider = Arc::new(InMemoryProvider::with_page_size(records.clone(), 3));

        let listed = pruner(&provider).list_all().await.unwrap();
        assert_eq!(listed, records);
    }

    #[tokio::test]
    async fn test_list_all_propagates_listing_error() {
        let provider = Arc::new(InMemoryProvider::new(vec![record("/a")]).fail_listing("expired"));
        let err = pruner(&provider).list_all().await.unwrap_err();
        assert!(matches!(err, PruneError::Listing { .. }));
    }

    #[tokio::test]
    async fn test_declined_is_skipped_without_remote_call() {
        let provider = Arc::new(InMemoryProvider::new(vec![record("/aws/lambda/a")]));
        let outcome = pruner(&provider)
            .delete_one(&record("/aws/lambda/a"), &mut FixedDecision(false))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::Skipped);
        assert!(provider.delete_attempts().is_empty());
        assert!(provider.contains("/aws/lambda/a"));
    }

    #[tokio::test]
    async fn test_confirmed_is_deleted() {
        let provider = Arc::new(InMemoryProvider::new(vec![record("/aws/lambda/a")]));
        let outcome = pruner(&provider)
            .delete_one(&record("/aws/lambda/a"), &mut FixedDecision(true))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::Deleted);
        assert!(!provider.contains("/aws/lambda/a"));
    }

    #[tokio::test]
    async fn test_unavailable_every_time_gives_up_after_four_attempts() {
        let name = "/aws/lambda/a";
        let provider = Arc::new(
            InMemoryProvider::new(vec![record(name)]).fail_deletes(
                name,
                std::iter::repeat(DeleteError::ServiceUnavailable("down".to_string())).take(10),
            ),
        );

        let outcome = pruner(&provider)
            .delete_one(&record(name), &mut FixedDecision(true))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::GivenUp { attempts: 4 });
        assert_eq!(provider.delete_attempts().len(), 4);
        assert!(provider.contains(name));
    }

    #[tokio::test]
    async fn test_unavailable_then_recovers() {
        let name = "/aws/lambda/a";
        let provider = Arc::new(InMemoryProvider::new(vec![record(name)]).fail_deletes(
            name,
            [
                DeleteError::ServiceUnavailable("down".to_string()),
                DeleteError::ServiceUnavailable("down".to_string()),
            ],
        ));

        let outcome = pruner(&provider)
            .delete_one(&record(name), &mut FixedDecision(true))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::Deleted);
        assert_eq!(provider.delete_attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_single_attempt() {
        let name = "/aws/lambda/a";
        let provider = Arc::new(InMemoryProvider::new(vec![record(name)]).fail_deletes(
            name,
            [DeleteError::ServiceUnavailable("down".to_string())],
        ));

        let outcome = LogGroupPruner::new(provider.clone())
            .with_retry(RetryConfig {
                max_retries: 0,
                ..no_wait()
            })
            .delete_one(&record(name), &mut FixedDecision(true))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::GivenUp { attempts: 1 });
        assert_eq!(provider.delete_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_already_gone_after_one_attempt() {
        let provider = Arc::new(InMemoryProvider::new(Vec::new()));
        let outcome = pruner(&provider)
            .delete_one(&record("/aws/lambda/gone"), &mut FixedDecision(true))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::AlreadyGone);
        assert_eq!(provider.delete_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_aborted_is_not_retried() {
        let name = "/aws/lambda/a";
        let provider = Arc::new(InMemoryProvider::new(vec![record(name)]).fail_deletes(
            name,
            [DeleteError::Aborted("conflicting operation".to_string())],
        ));

        let outcome = pruner(&provider)
            .delete_one(&record(name), &mut FixedDecision(true))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DeletionOutcome::AbortedByProvider {
                message: "conflicting operation".to_string()
            }
        );
        assert_eq!(provider.delete_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_error_aborts_by_default() {
        let name = "/aws/lambda/a";
        let provider = Arc::new(
            InMemoryProvider::new(vec![record(name)])
                .fail_deletes(name, [DeleteError::Unknown("AccessDenied".to_string())]),
        );

        let err = pruner(&provider)
            .delete_one(&record(name), &mut FixedDecision(true))
            .await
            .unwrap_err();

        assert!(matches!(err, PruneError::Delete { .. }));
        assert!(err.to_string().contains("AccessDenied"));
    }

    #[tokio::test]
    async fn test_unknown_error_skipped_under_skip_policy() {
        let provider = Arc::new(
            InMemoryProvider::new(vec![record("/aws/lambda/a"), record("/aws/lambda/b")])
                .fail_deletes("/aws/lambda/a", [DeleteError::Unknown("AccessDenied".to_string())]),
        );

        let summary = pruner(&provider)
            .with_unknown_error_policy(UnknownErrorPolicy::Skip)
            .prune_all(
                &NameFilter::contains("aws/lambda"),
                &mut FixedDecision(true),
                &mut Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(provider.log_group_names(), vec!["/aws/lambda/a"]);
    }

    #[tokio::test]
    async fn test_dry_run_reports_without_prompting() {
        let provider = Arc::new(InMemoryProvider::new(vec![record("/aws/lambda/a")]));
        let mut decisions = DecisionList::new([true]);
        let mut out = Vec::new();

        let summary = pruner(&provider)
            .with_dry_run(true)
            .prune_all(&NameFilter::contains("aws/lambda"), &mut decisions, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.matched, 1);
        assert_eq!(summary.deleted, 0);
        assert_eq!(decisions.remaining(), 1);
        assert!(provider.delete_attempts().is_empty());
        assert!(String::from_utf8(out).unwrap().contains("/aws/lambda/a"));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let provider = Arc::new(InMemoryProvider::new(Vec::new()));
        let mut config = PrunerConfig::default();
        config.filter.pattern.clear();

        let err = LogGroupPruner::from_config(provider, &config).err().unwrap();
        assert!(matches!(err, PruneError::InvalidConfig { .. }));
    }

    #[test]
    fn test_summary_display() {
        let mut summary = PruneSummary {
            listed: 3,
            matched: 2,
            ..Default::default()
        };
        summary.record(&DeletionOutcome::Deleted);
        summary.record(&DeletionOutcome::GivenUp { attempts: 4 });
        assert_eq!(
            summary.to_string(),
            "listed=3 matched=2 deleted=1 already_gone=0 skipped=0 aborted=0 given_up=1 failed=0"
        );
    }
}
