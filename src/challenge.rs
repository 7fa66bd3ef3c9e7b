//! Challenge Registry
//!
//! Challenges are described in a TOML catalogue:
//!
//! ```toml
//! [[challenges]]
//! id = "simple-nft-example"
//! name = "simple-nft-example"
//! contract_name = "YourCollectible.sol"
//! label = "Simple NFT Example"
//! ```
//!
//! `name` is the workspace directory of the challenge repository and
//! `contract_name` the file the grader extracts from multi-file sources.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// A gradable challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDescriptor {
    /// Slug used in submission URLs
    pub id: String,
    /// Workspace directory key
    pub name: String,
    /// Contract file expected in the submission, e.g. `YourToken.sol`
    pub contract_name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default = "default_true")]
    pub auto_grading: bool,
    #[serde(default)]
    pub disabled: bool,
}

fn default_true() -> bool {
    true
}

/// Source of challenge descriptors
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn fetch_challenge(&self, id: &str) -> Option<ChallengeDescriptor>;
    async fn fetch_challenges(&self) -> Vec<ChallengeDescriptor>;
}

#[derive(Debug, Deserialize)]
struct Catalogue {
    #[serde(default)]
    challenges: Vec<ChallengeDescriptor>,
}

/// Challenge catalogue loaded once from a TOML file
#[derive(Debug, Clone, Default)]
pub struct FileChallengeStore {
    challenges: Vec<ChallengeDescriptor>,
    by_id: HashMap<String, usize>,
}

impl FileChallengeStore {
    pub fn from_challenges(challenges: Vec<ChallengeDescriptor>) -> Self {
        let by_id = challenges
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self { challenges, by_id }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let catalogue: Catalogue =
            toml::from_str(text).context("Failed to parse challenge catalogue")?;

        let mut seen = std::collections::HashSet::new();
        for challenge in &catalogue.challenges {
            if !seen.insert(challenge.id.as_str()) {
                anyhow::bail!("Duplicate challenge id: {}", challenge.id);
            }
        }

        Ok(Self::from_challenges(catalogue.challenges))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read challenge catalogue {}", path.display()))?;
        let store = Self::from_toml(&text)?;
        info!(
            "Loaded {} challenges from {}",
            store.challenges.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

#[async_trait]
impl ChallengeStore for FileChallengeStore {
    async fn fetch_challenge(&self, id: &str) -> Option<ChallengeDescriptor> {
        self.by_id.get(id).map(|&i| self.challenges[i].clone())
    }

    async fn fetch_challenges(&self) -> Vec<ChallengeDescriptor> {
        self.challenges.clone()
    }
}
