//! Contract Challenge Grader
//!
//! Grades smart-contract challenge submissions. A learner submits the
//! address of a deployed contract; the grader fetches its verified source
//! from a block explorer, stages it into the challenge repository and runs
//! the challenge's test suite against it.
//!
//! ## Module Structure
//!
//! - `explorer/`: Block explorer client
//! - `source`: Verified source decoding
//! - `workspace`: Staging contracts into challenge repositories
//! - `harness`: Running challenge test suites
//! - `submission`: The grading pipeline
//! - `challenge`: Challenge catalogue
//! - `gas_report`: Gas report extraction
//! - `api/`: REST API

/// Grader configuration
pub mod config;

/// Error taxonomy
pub mod error;

/// Block explorer integration
pub mod explorer;

/// Verified source decoding
pub mod source;

/// Challenge workspace staging
pub mod workspace;

/// Challenge test harness
pub mod harness;

/// Gas report extraction
pub mod gas_report;

/// Challenge catalogue
pub mod challenge;

/// Grading pipeline
pub mod submission;

/// REST API
pub mod api;

pub use api::{router, run_server, ApiState};
pub use challenge::{ChallengeDescriptor, ChallengeStore, FileChallengeStore};
pub use config::{ExplorerConfig, GraderConfig, HarnessConfig, WorkspaceConfig};
pub use error::{ErrorKind, SubmissionError};
pub use explorer::{ExplorerClient, RawExplorerPayload};
pub use gas_report::{parse_gas_report, GasReportEntry};
pub use harness::{HarnessInvoker, HarnessResult};
pub use source::{normalize, NormalizedSource, ParsedSource};
pub use submission::{SubmissionOutcome, SubmissionRequest, Submitter};
pub use workspace::{StagedFile, Workspace};
