/*!
 * rrsim - Main Entry Point
 *
 * Loads a workload file (default `entrada.txt`), runs the threaded
 * simulation with the environment configuration and prints the report.
 * Set RRSIM_REPORT_JSON=1 for a JSON report on stdout.
 */

use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use rr_core_sim::{init_tracing, load, SimConfig, Simulation};

const DEFAULT_WORKLOAD: &str = "entrada.txt";

fn main() -> Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_WORKLOAD.to_string());
    info!(path = %path, "Loading workload");

    let ingest = load(&path)?;
    for rejected in &ingest.rejected {
        warn!(error = %rejected, "Skipping workload record");
    }
    info!(
        accepted = ingest.accepted.len(),
        rejected = ingest.rejected.len(),
        "Workload loaded"
    );

    let config = SimConfig::from_env()?;
    let report = Simulation::new(config, ingest.accepted)?.run()?;

    let as_json = std::env::var("RRSIM_REPORT_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);
    if as_json {
        println!("{}", report.to_json().into_diagnostic()?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
