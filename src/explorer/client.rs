use super::types::*;
use crate::config::ExplorerConfig;
use crate::error::{Result, SubmissionError};
use anyhow::Context;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the block explorer `getsourcecode` endpoint
pub struct ExplorerClient {
    client: Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Fetch the verified source of `address` on `network`.
    ///
    /// One request, no retry. Transport failures map to
    /// `ExplorerUnavailable`, a non-`OK` status or a missing source to
    /// `NotVerified`.
    pub async fn fetch(&self, network: &str, address: &str) -> Result<RawExplorerPayload> {
        let url = self.config.api_url(network);
        info!(network, address, "Downloading contract source from explorer");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmissionError::ExplorerUnavailable(format!(
                "explorer returned {}: {}",
                status, body
            )));
        }

        let body: ExplorerResponse = resp.json().await.map_err(|e| self.transport_error(e))?;

        if !body.is_ok() {
            warn!(network, address, detail = %body.detail(), "Explorer lookup returned NOTOK");
            return Err(SubmissionError::NotVerified(format!(
                "explorer API returned {}",
                body.detail()
            )));
        }

        let record = body
            .first_record()
            .filter(|r| !r.source_code.is_empty())
            .ok_or_else(|| {
                SubmissionError::NotVerified(format!(
                    "no source code for {} on {}. Is the contract verified?",
                    address, network
                ))
            })?;

        debug!(
            network,
            address,
            contract_name = %record.contract_name,
            bytes = record.source_code.len(),
            "Received verified source"
        );

        Ok(RawExplorerPayload {
            network: network.to_string(),
            address: address.to_string(),
            source_code: record.source_code,
            contract_name: record.contract_name,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> SubmissionError {
        if e.is_timeout() {
            SubmissionError::Timeout {
                stage: "Explorer request",
                secs: self.config.timeout_secs,
            }
        } else {
            SubmissionError::ExplorerUnavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use httpmock::prelude::*;

    const ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn client_for(server: &MockServer) -> ExplorerClient {
        ExplorerClient::new(ExplorerConfig {
            api_key: "test-key".to_string(),
            base_url: Some(server.url("/api")),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_verified_source() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api")
                .query_param("module", "contract")
                .query_param("action", "getsourcecode")
                .query_param("address", ADDRESS)
                .query_param("apikey", "test-key");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"1","message":"OK","result":[{"SourceCode":"contract A {}","ContractName":"A"}]}"#);
        });

        let payload = client_for(&server).fetch("sepolia", ADDRESS).await.unwrap();
        mock.assert();
        assert_eq!(payload.source_code, "contract A {}");
        assert_eq!(payload.contract_name, "A");
        assert_eq!(payload.network, "sepolia");
    }

    #[tokio::test]
    async fn test_fetch_notok_is_not_verified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"0","message":"NOTOK","result":"Invalid Address format"}"#);
        });

        let err = client_for(&server).fetch("sepolia", ADDRESS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotVerified);
        assert!(err.to_string().contains("Invalid Address format"));
    }

    #[tokio::test]
    async fn test_fetch_missing_source_is_not_verified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":"1","message":"OK","result":[{"SourceCode":"","ABI":"Contract source code not verified"}]}"#);
        });

        let err = client_for(&server).fetch("sepolia", ADDRESS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotVerified);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(503);
        });

        let err = client_for(&server).fetch("sepolia", ADDRESS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExplorerUnavailable);
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200).body("<html>rate limited</html>");
        });

        let err = client_for(&server).fetch("sepolia", ADDRESS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExplorerUnavailable);
    }

    #[tokio::test]
    async fn test_fetch_connection_error() {
        let client = ExplorerClient::new(ExplorerConfig {
            base_url: Some("http://127.0.0.1:65534/api".to_string()),
            ..Default::default()
        })
        .unwrap();

        let err = client.fetch("sepolia", ADDRESS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExplorerUnavailable);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body(r#"{"status":"1","message":"OK","result":[]}"#);
        });

        let client = ExplorerClient::new(ExplorerConfig {
            base_url: Some(server.url("/api")),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();

        let err = client.fetch("sepolia", ADDRESS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }
}
