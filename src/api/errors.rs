//! API error responses.

use crate::error::{ErrorKind, SubmissionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

/// Error returned by a handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: None,
            message: message.into(),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotVerified
        | ErrorKind::MalformedSourcePayload
        | ErrorKind::EmptyResolvedSource => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ExplorerUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::UnknownChallenge => StatusCode::NOT_FOUND,
        ErrorKind::WorkspaceWriteError | ErrorKind::HarnessExecutionError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        let kind = e.kind();
        Self {
            status: status_for(kind),
            kind: Some(kind),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                kind: self.kind,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_status() {
        let err: ApiError = SubmissionError::NotVerified("NOTOK".to_string()).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind, Some(ErrorKind::NotVerified));

        let err: ApiError = SubmissionError::Timeout {
            stage: "Explorer request",
            secs: 30,
        }
        .into();
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);

        let err: ApiError = SubmissionError::ExplorerUnavailable("refused".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err: ApiError = SubmissionError::HarnessExecutionError {
            exit_code: Some(1),
            stderr: String::new(),
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
