//! In-memory provider with scriptable failures

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{LogGroupPage, LogGroupProvider};
use crate::error::{DeleteError, PruneError, Result};
use crate::record::LogGroupRecord;

const DEFAULT_PAGE_SIZE: usize = 50;

/// Keeps log groups in a vector and serves them in fixed-size pages.
///
/// Delete failures can be queued per log group name; each delete attempt
/// consumes one queued failure, and once the queue is empty the delete goes
/// through. Every delete attempt is recorded.
pub struct InMemoryProvider {
    page_size: usize,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    log_groups: Vec<LogGroupRecord>,
    delete_failures: HashMap<String, VecDeque<DeleteError>>,
    listing_failure: Option<String>,
    delete_attempts: Vec<String>,
}

impl InMemoryProvider {
    pub fn new(log_groups: Vec<LogGroupRecord>) -> Self {
        Self::with_page_size(log_groups, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(log_groups: Vec<LogGroupRecord>, page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Mutex::new(State {
                log_groups,
                ..Default::default()
            }),
        }
    }

    /// Queue failures for the next delete attempts on `name`.
    pub fn fail_deletes(
        self,
        name: impl Into<String>,
        failures: impl IntoIterator<Item = DeleteError>,
    ) -> Self {
        self.lock()
            .delete_failures
            .entry(name.into())
            .or_default()
            .extend(failures);
        self
    }

    /// Make every listing call fail with `reason`.
    pub fn fail_listing(self, reason: impl Into<String>) -> Self {
        self.lock().listing_failure = Some(reason.into());
        self
    }

    /// Names passed to `delete_log_group`, in call order.
    pub fn delete_attempts(&self) -> Vec<String> {
        self.lock().delete_attempts.clone()
    }

    /// Names still present in the store.
    pub fn log_group_names(&self) -> Vec<String> {
        self.lock()
            .log_groups
            .iter()
            .map(|g| g.name().to_string())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().log_groups.iter().any(|g| g.name() == name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LogGroupProvider for InMemoryProvider {
    async fn describe_log_groups(&self, next_token: Option<String>) -> Result<LogGroupPage> {
        let state = self.lock();

        if let Some(reason) = &state.listing_failure {
            return Err(PruneError::listing(reason.clone()));
        }

        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| PruneError::listing(format!("invalid next token '{}'", token)))?,
            None => 0,
        };

        let end = (start + self.page_size).min(state.log_groups.len());
        let log_groups = state
            .log_groups
            .get(start..end)
            .map(<[LogGroupRecord]>::to_vec)
            .unwrap_or_default();
        let next_token = (end < state.log_groups.len()).then(|| end.to_string());

        Ok(LogGroupPage {
            log_groups,
            next_token,
        })
    }

    async fn delete_log_group(&self, name: &str) -> std::result::Result<(), DeleteError> {
        let mut state = self.lock();
        state.delete_attempts.push(name.to_string());

        if let Some(failure) = state
            .delete_failures
            .get_mut(name)
            .and_then(VecDeque::pop_front)
        {
            return Err(failure);
        }

        let before = state.log_groups.len();
        state.log_groups.retain(|g| g.name() != name);
        if state.log_groups.len() == before {
            return Err(DeleteError::NotFound(format!(
                "The specified log group does not exist: {}",
                name
            )));
        }

        Ok(())
    }
}
