//! Verified Source Normalizer
//!
//! Explorers return the `SourceCode` of a verified contract in one of three
//! encodings without saying which:
//! 1. A flat source string (flattened contracts)
//! 2. A standard-json input wrapped in an extra pair of braces (multi-file)
//! 3. A valid JSON object keyed by contract file name (some multi-file)
//!
//! [`ParsedSource::decode`] tries the parsers in a fixed order
//! (valid JSON, repaired JSON, flat) and [`ParsedSource::resolve`] extracts
//! the single contract file a challenge expects.

use crate::error::{Result, SubmissionError};
use serde_json::Value;
use std::fmt;

/// Directory prefixes tried, in order, when looking up a multi-file source
const SOURCE_PATH_PREFIXES: &[&str] = &["contracts/", "./contracts/"];

/// A decoded explorer payload, tagged by the encoding that matched
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSource {
    /// Valid JSON keyed directly by contract file name
    ByName(Value),
    /// Standard-json input recovered by stripping the outer braces
    BySourcesPath(Value),
    /// Plain source code
    Flat(String),
}

impl ParsedSource {
    /// Decode a raw `SourceCode` value.
    ///
    /// Order matters: a flat source that happens to start with `{` is
    /// treated as a repaired-JSON candidate and rejected when it does not
    /// parse, rather than being passed through.
    pub fn decode(raw: &str) -> Result<Self> {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return Ok(Self::ByName(value));
        }

        if raw.starts_with('{') {
            let repaired = strip_outer(raw);
            return serde_json::from_str::<Value>(repaired)
                .map(Self::BySourcesPath)
                .map_err(|e| {
                    SubmissionError::MalformedSourcePayload(format!(
                        "source looks like JSON but could not be parsed: {}",
                        e
                    ))
                });
        }

        Ok(Self::Flat(raw.to_string()))
    }

    pub fn encoding(&self) -> &'static str {
        match self {
            Self::ByName(_) => "json",
            Self::BySourcesPath(_) => "standard-json",
            Self::Flat(_) => "flat",
        }
    }

    /// Extract the body of `contract_file_name`
    pub fn resolve(self, contract_file_name: &str) -> Result<NormalizedSource> {
        let content = match self {
            Self::ByName(value) => value
                .get(contract_file_name)
                .and_then(|entry| entry.get("content"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Self::BySourcesPath(value) => {
                let sources = value.get("sources").ok_or_else(|| {
                    SubmissionError::MalformedSourcePayload(
                        "standard-json payload has no `sources` entry".to_string(),
                    )
                })?;
                let found = SOURCE_PATH_PREFIXES.iter().find_map(|prefix| {
                    sources
                        .get(format!("{}{}", prefix, contract_file_name))
                        .and_then(|entry| entry.get("content"))
                        .and_then(Value::as_str)
                });
                match found {
                    Some(content) => Some(content.to_string()),
                    None => {
                        return Err(SubmissionError::MalformedSourcePayload(format!(
                            "no contracts/{} entry in sources",
                            contract_file_name
                        )))
                    }
                }
            }
            Self::Flat(source) => Some(source),
        };

        content
            .and_then(NormalizedSource::new)
            .ok_or_else(|| SubmissionError::EmptyResolvedSource(contract_file_name.to_string()))
    }
}

/// Resolve a raw explorer `SourceCode` value to a single compilable file
pub fn normalize(raw: &str, contract_file_name: &str) -> Result<NormalizedSource> {
    ParsedSource::decode(raw)?.resolve(contract_file_name)
}

/// Drop exactly the first and last character
fn strip_outer(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Contract body ready to be staged. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSource(String);

impl NormalizedSource {
    pub fn new(content: String) -> Option<Self> {
        if content.is_empty() {
            None
        } else {
            Some(Self(content))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const CONTRACT: &str = "YourContract.sol";
    const BODY: &str = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.17;\n\ncontract YourContract {\n    uint256 public counter;\n}\n";

    fn sources_payload(path: &str, content: &str) -> String {
        let inner = serde_json::json!({
            "language": "Solidity",
            "sources": { path: { "content": content } },
            "settings": { "optimizer": { "enabled": true, "runs": 200 } }
        });
        format!("{{{}}}", inner)
    }

    #[test]
    fn test_flat_source() {
        let source = normalize(BODY, CONTRACT).unwrap();
        assert_eq!(source.as_str(), BODY);
    }

    #[test]
    fn test_pseudo_json_source() {
        let raw = sources_payload("contracts/YourContract.sol", BODY);
        assert!(raw.starts_with("{{"));

        let parsed = ParsedSource::decode(&raw).unwrap();
        assert_eq!(parsed.encoding(), "standard-json");
        assert_eq!(parsed.resolve(CONTRACT).unwrap().as_str(), BODY);
    }

    #[test]
    fn test_pseudo_json_dot_prefixed_path() {
        let raw = sources_payload("./contracts/YourContract.sol", BODY);
        assert_eq!(normalize(&raw, CONTRACT).unwrap().as_str(), BODY);
    }

    #[test]
    fn test_valid_json_keyed_by_name() {
        let raw = serde_json::json!({
            "YourContract.sol": { "content": BODY },
            "Ownable.sol": { "content": "contract Ownable {}" }
        })
        .to_string();

        let parsed = ParsedSource::decode(&raw).unwrap();
        assert_eq!(parsed.encoding(), "json");
        assert_eq!(parsed.resolve(CONTRACT).unwrap().as_str(), BODY);
    }

    #[test]
    fn test_flat_fallback_returns_raw_unchanged() {
        let raw = "  pragma solidity ^0.8.0; contract A { function f() public {} }";
        let parsed = ParsedSource::decode(raw).unwrap();
        assert_eq!(parsed, ParsedSource::Flat(raw.to_string()));
        assert_eq!(normalize(raw, CONTRACT).unwrap().as_str(), raw);
    }

    #[test]
    fn test_brace_prefixed_garbage_is_malformed() {
        let err = normalize("{not json}", CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSourcePayload);
    }

    #[test]
    fn test_repaired_json_without_expected_path_is_malformed() {
        let raw = sources_payload("contracts/SomethingElse.sol", BODY);
        let err = normalize(&raw, CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSourcePayload);
    }

    #[test]
    fn test_repaired_json_without_sources_is_malformed() {
        let raw = r#"{{"language":"Solidity"}}"#;
        let err = normalize(raw, CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSourcePayload);
    }

    #[test]
    fn test_empty_content_is_empty_resolved_source() {
        let raw = serde_json::json!({ "YourContract.sol": { "content": "" } }).to_string();
        let err = normalize(&raw, CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResolvedSource);

        let raw = sources_payload("contracts/YourContract.sol", "");
        let err = normalize(&raw, CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResolvedSource);
    }

    #[test]
    fn test_valid_json_missing_name_is_empty_resolved_source() {
        let raw = serde_json::json!({ "Other.sol": { "content": BODY } }).to_string();
        let err = normalize(&raw, CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResolvedSource);
    }

    #[test]
    fn test_empty_raw_is_empty_resolved_source() {
        let err = normalize("", CONTRACT).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResolvedSource);
    }
}
