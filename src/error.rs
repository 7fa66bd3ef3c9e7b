//! Submission error taxonomy
//!
//! Every stage of the grading pipeline fails with a [`SubmissionError`].
//! All variants are terminal for the submission; nothing is retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Explorer API unavailable: {0}")]
    ExplorerUnavailable(String),
    #[error("Contract source code is not verified: {0}")]
    NotVerified(String),
    #[error("Malformed source payload: {0}")]
    MalformedSourcePayload(String),
    #[error("Contract source code is not valid. Are you sure you are submitting the {0} contract address?")]
    EmptyResolvedSource(String),
    #[error("Failed to write contract into workspace: {0}")]
    WorkspaceWriteError(String),
    #[error("Test harness failed: {stderr}")]
    HarnessExecutionError { exit_code: Option<i32>, stderr: String },
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: &'static str, secs: u64 },
    #[error("Unknown challenge: {0}")]
    UnknownChallenge(String),
}

/// Machine-readable failure kind, sent alongside the message to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ExplorerUnavailable,
    NotVerified,
    MalformedSourcePayload,
    EmptyResolvedSource,
    WorkspaceWriteError,
    HarnessExecutionError,
    Timeout,
    UnknownChallenge,
}

impl SubmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExplorerUnavailable(_) => ErrorKind::ExplorerUnavailable,
            Self::NotVerified(_) => ErrorKind::NotVerified,
            Self::MalformedSourcePayload(_) => ErrorKind::MalformedSourcePayload,
            Self::EmptyResolvedSource(_) => ErrorKind::EmptyResolvedSource,
            Self::WorkspaceWriteError(_) => ErrorKind::WorkspaceWriteError,
            Self::HarnessExecutionError { .. } => ErrorKind::HarnessExecutionError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::UnknownChallenge(_) => ErrorKind::UnknownChallenge,
        }
    }
}

/// Result type for grading operations
pub type Result<T> = std::result::Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::NotVerified).unwrap();
        assert_eq!(json, r#""not_verified""#);

        let kind: ErrorKind = serde_json::from_str(r#""workspace_write_error""#).unwrap();
        assert_eq!(kind, ErrorKind::WorkspaceWriteError);
    }

    #[test]
    fn test_kind_matches_variant() {
        let err = SubmissionError::Timeout {
            stage: "Test harness",
            secs: 30,
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Test harness timed out after 30s");

        let err = SubmissionError::HarnessExecutionError {
            exit_code: Some(127),
            stderr: "yarn: not found".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::HarnessExecutionError);
        assert!(err.to_string().contains("yarn: not found"));
    }

    #[test]
    fn test_empty_source_message_names_contract() {
        let err = SubmissionError::EmptyResolvedSource("YourToken.sol".to_string());
        assert!(err.to_string().contains("YourToken.sol"));
    }
}
