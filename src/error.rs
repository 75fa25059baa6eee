//! Error types for the log group pruner

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Listing log groups failed
    E001ListingFailed,
    /// E002: Delete failed with an unrecognized error
    E002DeleteFailed,
    /// E003: Reading the operator's answer failed
    E003PromptFailed,
    /// E004: Configuration missing or invalid
    E004InvalidConfig,
    /// E005: Writing the report failed
    E005ReportFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001ListingFailed => "E001",
            Self::E002DeleteFailed => "E002",
            Self::E003PromptFailed => "E003",
            Self::E004InvalidConfig => "E004",
            Self::E005ReportFailed => "E005",
        }
    }
}

/// Errors that abort a prune run
#[derive(Debug, Error)]
pub enum PruneError {
    /// The provider could not list log groups
    #[error("[{code}] Failed to list log groups: {reason}\n\nTroubleshooting:\n  • Check AWS credentials are valid (aws sts get-caller-identity)\n  • Check the region is correct\n  • Ensure the caller may call logs:DescribeLogGroups")]
    Listing { code: &'static str, reason: String },

    /// A delete failed with an error outside the handled kinds
    #[error("[{code}] Failed to delete log group '{log_group}': {reason}")]
    Delete {
        code: &'static str,
        log_group: String,
        reason: String,
    },

    /// Prompting the operator failed (closed terminal, broken pipe, ...)
    #[error("[{code}] Failed to read confirmation for '{log_group}': {reason}")]
    Prompt {
        code: &'static str,
        log_group: String,
        reason: String,
    },

    /// Invalid configuration provided
    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    /// Writing the log group report failed
    #[error("[E005] Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

impl PruneError {
    /// Create a listing error with error code
    pub fn listing(reason: impl Into<String>) -> Self {
        Self::Listing {
            code: ErrorCode::E001ListingFailed.as_str(),
            reason: reason.into(),
        }
    }

    /// Create a delete error with error code
    pub fn delete(log_group: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Delete {
            code: ErrorCode::E002DeleteFailed.as_str(),
            log_group: log_group.into(),
            reason: reason.into(),
        }
    }

    /// Create a prompt error with error code
    pub fn prompt(log_group: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Prompt {
            code: ErrorCode::E003PromptFailed.as_str(),
            log_group: log_group.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid config error with error code
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E004InvalidConfig.as_str(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Listing { code, .. }
            | Self::Delete { code, .. }
            | Self::Prompt { code, .. }
            | Self::InvalidConfig { code, .. } => *code,
            Self::Report(_) => ErrorCode::E005ReportFailed.as_str(),
        }
    }
}

/// Delete failures reported by a provider, as a closed set of kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    /// The log group does not exist (anymore)
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A conflicting operation is in progress; the provider will not retry
    #[error("operation aborted: {0}")]
    Aborted(String),

    /// Transient outage, worth retrying
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Anything else (auth, throttling, transport, ...)
    #[error("{0}")]
    Unknown(String),
}

/// Result type alias for PruneError
pub type Result<T> = std::result::Result<T, PruneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let err = PruneError::listing("expired token");
        assert_eq!(err.code(), "E001");
        assert!(err.to_string().starts_with("[E001]"));
        assert!(err.to_string().contains("expired token"));

        let err = PruneError::delete("/aws/lambda/a", "AccessDenied");
        assert_eq!(err.code(), "E002");
        assert!(err.to_string().contains("/aws/lambda/a"));

        assert_eq!(PruneError::prompt("x", "eof").code(), "E003");
        assert_eq!(PruneError::invalid_config("bad").code(), "E004");
    }

    #[test]
    fn test_delete_error_display() {
        assert_eq!(
            DeleteError::ServiceUnavailable("try later".to_string()).to_string(),
            "service unavailable: try later"
        );
        assert_eq!(DeleteError::Unknown("boom".to_string()).to_string(), "boom");
    }
}
