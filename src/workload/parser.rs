/*!
 * Workload Parser
 *
 * Record format, one process per line:
 *
 * ```text
 * # id  arrival  burst1  blocks  block_duration  burst2
 * P1    0        5       0       0               0
 * P2    0        2       1       3               2
 * ```
 *
 * A bad record is rejected on its own; every other record is kept.
 */

use crate::core::IngestError;
use crate::process::ProcessSpec;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const FIELDS: usize = 6;

/// Outcome of ingesting a workload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingest {
    /// Accepted descriptors in input order
    pub accepted: Vec<ProcessSpec>,
    /// Rejected records with the reason for each
    pub rejected: Vec<IngestError>,
}

impl Ingest {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Accept `spec` unless its id was already taken
    fn push(&mut self, seen: &mut HashSet<String>, line: usize, spec: ProcessSpec) {
        if seen.insert(spec.id.clone()) {
            self.accepted.push(spec);
        } else {
            self.reject(IngestError::DuplicateProcess { line, id: spec.id });
        }
    }

    fn reject(&mut self, err: IngestError) {
        debug!(error = %err, "Workload record rejected");
        self.rejected.push(err);
    }
}

/// Parse whitespace-separated records, skipping blanks and `#` comments
pub fn parse_records(input: &str) -> Ingest {
    let mut ingest = Ingest::default();
    let mut seen = HashSet::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let record = raw.split('#').next().unwrap_or_default().trim();
        if record.is_empty() {
            continue;
        }
        match parse_record(line, record) {
            Ok(spec) => ingest.push(&mut seen, line, spec),
            Err(err) => ingest.reject(err),
        }
    }

    debug!(
        accepted = ingest.accepted.len(),
        rejected = ingest.rejected.len(),
        "Parsed workload records"
    );
    ingest
}

/// Parse a JSON array of descriptors
///
/// Elements are decoded one by one so a bad element does not discard the
/// rest; `line` in errors is the 1-based element index.
pub fn parse_json(input: &str) -> Result<Ingest, IngestError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(input)?;
    let mut ingest = Ingest::default();
    let mut seen = HashSet::new();

    for (index, value) in values.into_iter().enumerate() {
        let line = index + 1;
        match serde_json::from_value::<ProcessSpec>(value) {
            Ok(spec) => ingest.push(&mut seen, line, spec),
            Err(e) => ingest.reject(IngestError::MalformedInput {
                line,
                reason: e.to_string(),
            }),
        }
    }
    Ok(ingest)
}

/// Load a workload file; `.json` selects JSON, anything else the record format
pub fn load(path: impl AsRef<Path>) -> Result<Ingest, IngestError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        parse_json(&contents)
    } else {
        Ok(parse_records(&contents))
    }
}

fn parse_record(line: usize, record: &str) -> Result<ProcessSpec, IngestError> {
    let fields: Vec<&str> = record.split_whitespace().collect();
    if fields.len() != FIELDS {
        return Err(IngestError::MalformedInput {
            line,
            reason: format!("expected {} fields, found {}", FIELDS, fields.len()),
        });
    }

    Ok(ProcessSpec {
        id: fields[0].to_string(),
        arrival: number(line, "arrival", fields[1])?,
        burst1: number(line, "burst1", fields[2])?,
        blocks: flag(line, fields[3])?,
        block_duration: number(line, "block_duration", fields[4])?,
        burst2: number(line, "burst2", fields[5])?,
    })
}

fn number<T: FromStr>(line: usize, name: &str, raw: &str) -> Result<T, IngestError> {
    raw.parse().map_err(|_| IngestError::MalformedInput {
        line,
        reason: format!("{} '{}' is not a non-negative integer", name, raw),
    })
}

fn flag(line: usize, raw: &str) -> Result<bool, IngestError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(IngestError::MalformedInput {
            line,
            reason: format!("blocks '{}' must be 0, 1, true or false", raw),
        }),
    }
}
