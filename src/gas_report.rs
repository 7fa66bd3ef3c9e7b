//! Gas report extraction
//!
//! Reads the per-function table printed by `forge test --gas-report` out of
//! harness stdout. The raw output is always returned untouched; this is an
//! additional structured view for clients that want it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasReportEntry {
    /// Contract the function belongs to, as named in the table header
    pub contract: Option<String>,
    pub function_name: String,
    /// Median gas used across calls
    pub gas_used: u64,
    pub calls: u64,
}

/// Parse every function row of every gas table in `stdout`.
///
/// Understands the markdown-style tables of Foundry 1.x and the older
/// box-drawing layout. Border and separator lines are skipped; any other
/// line that is not a table row ends the current table. Output without a
/// gas table yields an empty list.
pub fn parse_gas_report(stdout: &str) -> Vec<GasReportEntry> {
    let mut entries = Vec::new();
    let mut contract: Option<String> = None;
    let mut in_functions = false;

    for line in stdout.lines() {
        let line = line.trim();
        if is_border(line) {
            continue;
        }
        let cells = match table_cells(line) {
            Some(cells) => cells,
            None => {
                contract = None;
                in_functions = false;
                continue;
            }
        };

        let first = cells[0];
        if let Some(name) = strip_suffix_ignore_case(first, " contract") {
            // `src/YourContract.sol:YourContract Contract`
            let name = name.rsplit(':').next().unwrap_or(name);
            contract = Some(name.trim().to_string());
            in_functions = false;
        } else if first.eq_ignore_ascii_case("Function Name") {
            in_functions = true;
        } else if in_functions {
            // | name | min | avg | median | max | # calls |
            let median = cells.get(3).and_then(|c| c.parse::<u64>().ok());
            let calls = cells.get(5).and_then(|c| c.parse::<u64>().ok());
            match (median, calls) {
                (Some(gas_used), Some(calls)) => entries.push(GasReportEntry {
                    contract: contract.clone(),
                    function_name: first.to_string(),
                    gas_used,
                    calls,
                }),
                _ => in_functions = false,
            }
        }
    }

    entries
}

/// Frame, header rule or row separator: a non-empty line carrying no text
fn is_border(line: &str) -> bool {
    !line.is_empty() && !line.chars().any(char::is_alphanumeric)
}

/// Split a table row into trimmed cells
fn table_cells(line: &str) -> Option<Vec<&str>> {
    const OUTER: [char; 2] = ['|', '│'];
    const INNER: [char; 3] = ['|', '│', '┆'];

    let inner = line.strip_prefix(OUTER)?;
    let inner = inner.strip_suffix(OUTER).unwrap_or(inner);
    Some(inner.split(INNER).map(str::trim).collect())
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    let tail = text.get(split..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        text.get(..split)
    } else {
        None
    }
}
