/*!
 * Workload Module
 * Ingestion of process descriptors from record text or JSON
 */

pub mod parser;

pub use parser::{load, parse_json, parse_records, Ingest};
