//! API route handlers.

use super::errors::ApiError;
use super::validation::validate_submission;
use super::ApiState;
use crate::challenge::ChallengeDescriptor;
use crate::gas_report::GasReportEntry;
use crate::harness::HarnessResult;
use crate::submission::SubmissionRequest;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// INFO
// ============================================================================

/// GET /
pub async fn index() -> &'static str {
    "Challenge Grader Server"
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengesResponse {
    pub challenges: Vec<ChallengeDescriptor>,
}

/// GET /challenges
pub async fn list_challenges(State(state): State<Arc<ApiState>>) -> Json<ChallengesResponse> {
    let challenges = state.submitter.challenges().fetch_challenges().await;
    Json(ChallengesResponse { challenges })
}

// ============================================================================
// SUBMISSION
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Harness output, verbatim
    pub result: HarnessResult,
    pub gas_report: Vec<GasReportEntry>,
    pub submission_id: Uuid,
    pub graded_at: DateTime<Utc>,
}

/// GET /:challenge_id/:network/:address
///
/// Fetches the contract's verified source, runs the challenge test suite
/// against it and returns the test output.
pub async fn submit_challenge(
    State(state): State<Arc<ApiState>>,
    Path((challenge_id, network, address)): Path<(String, String, String)>,
) -> Result<Json<SubmitResponse>, ApiError> {
    info!("GET /{}/{}/{}", challenge_id, network, address);

    let submitter = &state.submitter;
    validate_submission(
        &**submitter.challenges(),
        submitter.explorer().config(),
        &challenge_id,
        &network,
        &address,
    )
    .await?;

    let request = SubmissionRequest {
        challenge_id,
        network,
        contract_address: address,
    };
    let outcome = submitter.submit(&request).await?;

    Ok(Json(SubmitResponse {
        result: outcome.result,
        gas_report: outcome.gas_report,
        submission_id: outcome.submission_id,
        graded_at: outcome.graded_at,
    }))
}
