//! Grader Configuration
//!
//! Defines the configuration for the contract grader including:
//! - Explorer API endpoint, key and supported networks
//! - Challenge workspace layout
//! - Test harness command and limits

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete grader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Block explorer configuration
    pub explorer: ExplorerConfig,
    /// Workspace layout
    pub workspace: WorkspaceConfig,
    /// Test harness configuration
    pub harness: HarnessConfig,
}

impl GraderConfig {
    /// Load a full configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// Command-line / environment options shared by the grader binaries
#[derive(Debug, Clone, clap::Args)]
pub struct GraderArgs {
    /// TOML configuration file; when set, the options below are ignored
    #[arg(long, env = "GRADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Explorer API key
    #[arg(long, env = "ETHERSCAN_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Explorer domain
    #[arg(long, env = "EXPLORER_DOMAIN", default_value = "etherscan.io")]
    pub explorer_domain: String,

    /// Explorer endpoint override (`{network}` is substituted)
    #[arg(long, env = "EXPLORER_BASE_URL")]
    pub explorer_url: Option<String>,

    /// Accepted networks
    #[arg(long, env = "EXPLORER_NETWORKS", value_delimiter = ',', default_value = "sepolia,goerli,holesky")]
    pub networks: Vec<String>,

    /// Explorer request timeout in seconds
    #[arg(long, env = "EXPLORER_TIMEOUT_SECS", default_value = "30")]
    pub explorer_timeout: u64,

    /// Directory holding the challenge repositories
    #[arg(long, env = "CHALLENGES_DIR", default_value = "challenges")]
    pub workspace_root: PathBuf,

    /// Contracts directory inside each challenge repository
    #[arg(long, env = "CONTRACTS_DIR", default_value = "packages/foundry/contracts")]
    pub contracts_dir: PathBuf,

    /// Test command run from the challenge repository
    #[arg(long, env = "TEST_COMMAND", default_value = "yarn foundry:test")]
    pub test_command: String,

    /// Do not append --gas-report to the test command
    #[arg(long)]
    pub no_gas_report: bool,

    /// Test run timeout in seconds
    #[arg(long, env = "TEST_TIMEOUT_SECS", default_value = "300")]
    pub test_timeout: u64,
}

impl GraderArgs {
    pub fn into_config(self) -> Result<GraderConfig> {
        if let Some(path) = &self.config {
            return GraderConfig::load(path);
        }
        Ok(GraderConfig {
            explorer: ExplorerConfig {
                api_key: self.api_key,
                domain: self.explorer_domain,
                base_url: self.explorer_url,
                networks: self.networks,
                timeout_secs: self.explorer_timeout,
            },
            workspace: WorkspaceConfig {
                root: self.workspace_root,
                contracts_dir: self.contracts_dir,
                ..Default::default()
            },
            harness: HarnessConfig {
                test_command: self.test_command,
                gas_report: !self.no_gas_report,
                timeout_secs: self.test_timeout,
            },
        })
    }
}

/// Block explorer API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// API key appended to every request
    pub api_key: String,
    /// Explorer domain, network-specific hosts are `api-<network>.<domain>`
    pub domain: String,
    /// Full endpoint override. `{network}` is substituted when present.
    pub base_url: Option<String>,
    /// Networks accepted by the submission endpoint
    pub networks: Vec<String>,
    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            domain: "etherscan.io".to_string(),
            base_url: None,
            networks: vec![
                "sepolia".to_string(),
                "goerli".to_string(),
                "holesky".to_string(),
            ],
            timeout_secs: 30,
        }
    }
}

impl ExplorerConfig {
    /// API endpoint for a network
    pub fn api_url(&self, network: &str) -> String {
        match &self.base_url {
            Some(template) => template.replace("{network}", network),
            None => format!("https://api-{}.{}/api", network, self.domain),
        }
    }

    pub fn is_supported_network(&self, network: &str) -> bool {
        self.networks.iter().any(|n| n == network)
    }
}

/// Challenge workspace layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding one checked-out repository per challenge
    pub root: PathBuf,
    /// Directory, relative to a challenge repository, where contracts are staged
    pub contracts_dir: PathBuf,
    /// Extension of staged source files
    pub extension: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("challenges"),
            contracts_dir: PathBuf::from("packages/foundry/contracts"),
            extension: "sol".to_string(),
        }
    }
}

impl WorkspaceConfig {
    /// Repository directory for a challenge
    pub fn challenge_dir(&self, challenge_name: &str) -> PathBuf {
        self.root.join(challenge_name)
    }

    /// Directory where a challenge's submitted contracts are staged
    pub fn contracts_path(&self, challenge_name: &str) -> PathBuf {
        self.challenge_dir(challenge_name).join(&self.contracts_dir)
    }

    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }
}

/// Test harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Command run from the challenge directory
    pub test_command: String,
    /// Append `--gas-report` to the command
    pub gas_report: bool,
    /// Hard limit for a single test run
    pub timeout_secs: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_command: "yarn foundry:test".to_string(),
            gas_report: true,
            timeout_secs: 300,
        }
    }
}

impl HarnessConfig {
    /// Full shell command line for a run
    pub fn command_line(&self) -> String {
        if self.gas_report {
            format!("{} --gas-report", self.test_command)
        } else {
            self.test_command.clone()
        }
    }
}
