use serde::{Deserialize, Serialize};

/// Status message the explorer returns for a successful lookup
pub const STATUS_OK: &str = "OK";

/// Body of a `getsourcecode` response.
///
/// On success `result` is an array of [`SourceRecord`]; on failure the
/// explorer puts a human-readable string there instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(rename = "SourceCode", default)]
    pub source_code: String,
    #[serde(rename = "ContractName", default)]
    pub contract_name: String,
}

impl ExplorerResponse {
    pub fn is_ok(&self) -> bool {
        self.message == STATUS_OK
    }

    /// First source record, if the result is a well-formed array
    pub fn first_record(&self) -> Option<SourceRecord> {
        self.result
            .as_array()
            .and_then(|records| records.first())
            .and_then(|record| serde_json::from_value(record.clone()).ok())
    }

    /// Explorer-provided detail for a failed lookup
    pub fn detail(&self) -> String {
        match self.result.as_str() {
            Some(text) if !text.is_empty() => format!("{} ({})", self.message, text),
            _ => self.message.clone(),
        }
    }
}

/// Verified source returned by the explorer for one address
#[derive(Debug, Clone)]
pub struct RawExplorerPayload {
    pub network: String,
    pub address: String,
    /// `SourceCode` as returned, in one of the three explorer encodings
    pub source_code: String,
    pub contract_name: String,
}
