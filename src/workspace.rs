//! Challenge Workspace Stager
//!
//! Writes a normalized contract into a challenge repository so the
//! challenge's test suite can pick it up, and removes it afterwards.
//!
//! Staged files are keyed by challenge, contract address and submission id,
//! so concurrent submissions never share a path.

use crate::config::WorkspaceConfig;
use crate::error::{Result, SubmissionError};
use crate::source::NormalizedSource;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// A contract written into a challenge workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Absolute or root-relative path of the written file
    pub path: PathBuf,
    /// File name, as referenced by the harness
    pub file_name: String,
    /// Challenge repository the file lives in
    pub challenge_dir: PathBuf,
}

impl StagedFile {
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Stages contracts into challenge repositories
#[derive(Debug, Clone)]
pub struct Workspace {
    config: WorkspaceConfig,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// File name for a submission: `download-<address>-<id>.<ext>`
    pub fn staged_file_name(&self, contract_address: &str, submission_id: Uuid) -> String {
        format!(
            "download-{}-{}.{}",
            contract_address,
            submission_id.simple(),
            self.config.extension
        )
    }

    /// Write `content` into the challenge's contracts directory.
    ///
    /// The directory must already exist; an unknown challenge fails with
    /// `WorkspaceWriteError` instead of creating it. An existing file at the
    /// same path is overwritten.
    pub async fn stage(
        &self,
        challenge_name: &str,
        contract_address: &str,
        submission_id: Uuid,
        content: &NormalizedSource,
    ) -> Result<StagedFile> {
        ensure_path_component(challenge_name)?;
        ensure_path_component(contract_address)?;

        let dir = self.config.contracts_path(challenge_name);
        let file_name = self.staged_file_name(contract_address, submission_id);
        let path = dir.join(&file_name);

        tokio::fs::write(&path, content.as_str())
            .await
            .map_err(|e| {
                SubmissionError::WorkspaceWriteError(format!("{}: {}", path.display(), e))
            })?;

        info!(challenge = challenge_name, path = %path.display(), "Contract staged");

        Ok(StagedFile {
            path,
            file_name,
            challenge_dir: self.config.challenge_dir(challenge_name),
        })
    }

    /// Remove a staged file. Removing an absent file succeeds.
    pub async fn unstage(&self, staged: &StagedFile) -> io::Result<()> {
        remove_if_present(&staged.path).await
    }
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Staged contract removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Reject values that would escape the workspace when joined into a path
fn ensure_path_component(value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains('/')
        && !value.contains('\\');
    if valid {
        Ok(())
    } else {
        Err(SubmissionError::WorkspaceWriteError(format!(
            "invalid workspace path component: {:?}",
            value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    const ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn workspace_with_challenge(name: &str) -> (TempDir, Workspace) {
        let root = TempDir::new().unwrap();
        let workspace = Workspace::new(WorkspaceConfig::default().with_root(root.path()));
        std::fs::create_dir_all(workspace.config().contracts_path(name)).unwrap();
        (root, workspace)
    }

    fn source(text: &str) -> NormalizedSource {
        NormalizedSource::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_stage_writes_content() {
        let (_root, workspace) = workspace_with_challenge("decentralized-staking");
        let id = Uuid::new_v4();

        let staged = workspace
            .stage("decentralized-staking", ADDRESS, id, &source("contract Staker {}"))
            .await
            .unwrap();

        assert!(staged.exists());
        assert!(staged.file_name.starts_with(&format!("download-{}-", ADDRESS)));
        assert!(staged.file_name.ends_with(".sol"));
        assert_eq!(
            std::fs::read_to_string(&staged.path).unwrap(),
            "contract Staker {}"
        );
    }

    #[tokio::test]
    async fn test_stage_overwrites_existing_file() {
        let (_root, workspace) = workspace_with_challenge("dice-game");
        let id = Uuid::new_v4();

        workspace
            .stage("dice-game", ADDRESS, id, &source("contract Old {}"))
            .await
            .unwrap();
        let staged = workspace
            .stage("dice-game", ADDRESS, id, &source("contract New {}"))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&staged.path).unwrap(), "contract New {}");
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_distinct_paths() {
        let (_root, workspace) = workspace_with_challenge("dice-game");

        let a = workspace
            .stage("dice-game", ADDRESS, Uuid::new_v4(), &source("contract A {}"))
            .await
            .unwrap();
        let b = workspace
            .stage("dice-game", ADDRESS, Uuid::new_v4(), &source("contract B {}"))
            .await
            .unwrap();

        assert_ne!(a.path, b.path);
        workspace.unstage(&a).await.unwrap();
        assert!(b.exists());
    }

    #[tokio::test]
    async fn test_stage_unknown_challenge_fails() {
        let (_root, workspace) = workspace_with_challenge("dice-game");

        let err = workspace
            .stage("no-such-challenge", ADDRESS, Uuid::new_v4(), &source("contract A {}"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WorkspaceWriteError);
    }

    #[tokio::test]
    async fn test_stage_rejects_traversal() {
        let (_root, workspace) = workspace_with_challenge("dice-game");

        let err = workspace
            .stage("../dice-game", ADDRESS, Uuid::new_v4(), &source("contract A {}"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WorkspaceWriteError);
    }

    #[tokio::test]
    async fn test_unstage_is_idempotent() {
        let (_root, workspace) = workspace_with_challenge("dice-game");
        let staged = workspace
            .stage("dice-game", ADDRESS, Uuid::new_v4(), &source("contract A {}"))
            .await
            .unwrap();

        workspace.unstage(&staged).await.unwrap();
        assert!(!staged.exists());
        workspace.unstage(&staged).await.unwrap();
    }
}
