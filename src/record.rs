//! Log group records as returned by a listing

use std::fmt;

/// Displayed in place of a retention period when none is set.
pub const NO_RETENTION_SENTINEL: &str = "-1";

/// One remote log group at the time it was listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupRecord {
    name: String,
    arn: String,
    retention_days: Option<i32>,
}

impl LogGroupRecord {
    pub fn new(name: impl Into<String>, arn: impl Into<String>, retention_days: Option<i32>) -> Self {
        Self {
            name: name.into(),
            arn: arn.into(),
            retention_days,
        }
    }

    /// Full slash-delimited name, e.g. `/aws/lambda/my-function`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// `None` means logs never expire
    pub fn retention_days(&self) -> Option<i32> {
        self.retention_days
    }

    /// Every path segment except the last, still joined by `/`.
    pub fn prefix(&self) -> &str {
        prefix(&self.name)
    }

    /// The last path segment.
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

impl fmt::Display for LogGroupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogGroup(name={}, short_name={}, arn={}, prefix={}, retentionInDays={})",
            self.name,
            self.short_name(),
            self.arn,
            self.prefix(),
            format_retention(self.retention_days)
        )
    }
}

pub fn prefix(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(head, _)| head)
}

pub fn short_name(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, tail)| tail)
}

pub fn format_retention(retention_days: Option<i32>) -> String {
    match retention_days {
        Some(days) => days.to_string(),
        None => NO_RETENTION_SENTINEL.to_string(),
    }
}
