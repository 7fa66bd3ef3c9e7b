//! Request validation run before a submission is graded.

use super::errors::ApiError;
use crate::challenge::ChallengeStore;
use crate::config::ExplorerConfig;
use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"));

pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

pub fn validate_address(address: &str) -> Result<(), ApiError> {
    if is_valid_address(address) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Invalid address: {}", address)))
    }
}

pub fn validate_network(explorer: &ExplorerConfig, network: &str) -> Result<(), ApiError> {
    if explorer.is_supported_network(network) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Unsupported network: {} (expected one of: {})",
            network,
            explorer.networks.join(", ")
        )))
    }
}

/// Check address, network and that the challenge accepts automatic grading
pub async fn validate_submission(
    challenges: &dyn ChallengeStore,
    explorer: &ExplorerConfig,
    challenge_id: &str,
    network: &str,
    address: &str,
) -> Result<(), ApiError> {
    validate_address(address)?;
    validate_network(explorer, network)?;

    let challenge = challenges
        .fetch_challenge(challenge_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Challenge not found: {}", challenge_id)))?;

    if challenge.disabled {
        return Err(ApiError::bad_request(format!(
            "Challenge is disabled: {}",
            challenge_id
        )));
    }

    if !challenge.auto_grading {
        return Err(ApiError::bad_request(format!(
            "Challenge is not auto-graded: {}",
            challenge_id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_format() {
        assert!(is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa"));
        assert!(!is_valid_address("0xZZbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa3/../x"));
    }

    #[tokio::test]
    async fn test_validate_submission_checks_challenge() {
        use crate::challenge::FileChallengeStore;

        let store = FileChallengeStore::from_toml(
            r#"
[[challenges]]
id = "token-vendor"
name = "token-vendor"
contract_name = "Vendor.sol"

[[challenges]]
id = "dex"
name = "dex"
contract_name = "DEX.sol"
auto_grading = false
"#,
        )
        .unwrap();
        let explorer = ExplorerConfig::default();
        let address = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

        validate_submission(&store, &explorer, "token-vendor", "sepolia", address)
            .await
            .unwrap();

        let err = validate_submission(&store, &explorer, "dex", "sepolia", address)
            .await
            .unwrap_err();
        assert!(err.message.contains("not auto-graded"));

        let err = validate_submission(&store, &explorer, "missing", "sepolia", address)
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_network() {
        let explorer = ExplorerConfig::default();
        assert!(validate_network(&explorer, "sepolia").is_ok());
        let err = validate_network(&explorer, "mainnet").unwrap_err();
        assert!(err.message.contains("sepolia"));
    }
}
