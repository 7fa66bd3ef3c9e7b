//! Submission Orchestrator
//!
//! Grades one contract submission:
//! 1. Fetches the verified source from the explorer
//! 2. Normalizes it to the single file the challenge expects
//! 3. Stages it into the challenge workspace
//! 4. Runs the challenge test suite against it
//! 5. Removes the staged file
//!
//! Steps run strictly in order. Once a file has been staged it is removed
//! on every exit path, including harness failure and timeout.

use crate::challenge::{ChallengeDescriptor, ChallengeStore};
use crate::config::GraderConfig;
use crate::error::{Result, SubmissionError};
use crate::explorer::ExplorerClient;
use crate::gas_report::{parse_gas_report, GasReportEntry};
use crate::harness::{HarnessInvoker, HarnessResult};
use crate::source::ParsedSource;
use crate::workspace::{StagedFile, Workspace};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A learner's request to grade a deployed contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub challenge_id: String,
    pub network: String,
    pub contract_address: String,
}

/// Pipeline stage, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Fetching,
    Normalizing,
    Staging,
    Testing,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetching => "fetching",
            Self::Normalizing => "normalizing",
            Self::Staging => "staging",
            Self::Testing => "testing",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a graded submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub challenge_id: String,
    /// Harness output, verbatim
    pub result: HarnessResult,
    /// Per-function gas usage read from the harness output
    pub gas_report: Vec<GasReportEntry>,
    pub graded_at: DateTime<Utc>,
}

/// Runs the grading pipeline
pub struct Submitter {
    explorer: ExplorerClient,
    workspace: Workspace,
    harness: HarnessInvoker,
    challenges: Arc<dyn ChallengeStore>,
}

impl Submitter {
    pub fn new(config: &GraderConfig, challenges: Arc<dyn ChallengeStore>) -> anyhow::Result<Self> {
        Ok(Self {
            explorer: ExplorerClient::new(config.explorer.clone())?,
            workspace: Workspace::new(config.workspace.clone()),
            harness: HarnessInvoker::new(config.harness.clone()),
            challenges,
        })
    }

    pub fn challenges(&self) -> &Arc<dyn ChallengeStore> {
        &self.challenges
    }

    pub fn explorer(&self) -> &ExplorerClient {
        &self.explorer
    }

    /// Grade a submission
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionOutcome> {
        let challenge = self
            .challenges
            .fetch_challenge(&request.challenge_id)
            .await
            .ok_or_else(|| SubmissionError::UnknownChallenge(request.challenge_id.clone()))?;

        let submission_id = Uuid::new_v4();
        let start = Instant::now();

        info!(
            %submission_id,
            challenge = %challenge.id,
            network = %request.network,
            address = %request.contract_address,
            "Grading submission"
        );

        match self.run(&challenge, request, submission_id).await {
            Ok(result) => {
                info!(
                    %submission_id,
                    stage = %SubmissionStage::Done,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Submission graded"
                );
                Ok(SubmissionOutcome {
                    submission_id,
                    challenge_id: challenge.id,
                    gas_report: parse_gas_report(&result.stdout),
                    result,
                    graded_at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(
                    %submission_id,
                    stage = %SubmissionStage::Failed,
                    kind = ?e.kind(),
                    "Submission failed: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        challenge: &ChallengeDescriptor,
        request: &SubmissionRequest,
        submission_id: Uuid,
    ) -> Result<HarnessResult> {
        debug!(%submission_id, stage = %SubmissionStage::Fetching);
        let payload = self
            .explorer
            .fetch(&request.network, &request.contract_address)
            .await?;

        debug!(%submission_id, stage = %SubmissionStage::Normalizing);
        let parsed = ParsedSource::decode(&payload.source_code)?;
        debug!(%submission_id, encoding = parsed.encoding(), "Decoded explorer source");
        let source = parsed.resolve(&challenge.contract_name)?;

        debug!(%submission_id, stage = %SubmissionStage::Staging);
        let staged = self
            .workspace
            .stage(
                &challenge.name,
                &request.contract_address,
                submission_id,
                &source,
            )
            .await?;
        let mut guard = CleanupGuard::new(&staged);

        debug!(%submission_id, stage = %SubmissionStage::Testing);
        let outcome = self.harness.invoke(&staged, &challenge.contract_name).await;

        debug!(%submission_id, stage = %SubmissionStage::Cleanup);
        self.cleanup(&staged).await;
        guard.disarm();

        outcome
    }

    /// Best-effort removal; failures are logged and never replace the result
    async fn cleanup(&self, staged: &StagedFile) {
        if let Err(e) = self.workspace.unstage(staged).await {
            error!(path = %staged.path.display(), "Failed to remove staged contract: {}", e);
        }
    }
}

/// Removes a staged file if the submission future is dropped before the
/// async cleanup ran.
struct CleanupGuard {
    path: Option<PathBuf>,
}

impl CleanupGuard {
    fn new(staged: &StagedFile) -> Self {
        Self {
            path: Some(staged.path.clone()),
        }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    error!(path = %path.display(), "Failed to remove staged contract: {}", e);
                }
            }
        }
    }
}
