//! CSV-based scenario loader
//!
//! One scenario per row:
//! `annual_appreciation,closing_cost_pct,exit_year,fmv_override`
//! An empty `fmv_override` cell means no override.

use csv::Reader;
use std::path::Path;

use super::ScenarioAssumptions;
use crate::error::ValuationResult;

/// Default path to the scenario file
pub const DEFAULT_SCENARIOS_PATH: &str = "data/scenarios.csv";

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> ValuationResult<Vec<ScenarioAssumptions>> {
    let mut reader = Reader::from_path(path)?;
    collect_scenarios(&mut reader)
}

/// Load scenarios from any reader (e.g., string buffer, network stream)
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> ValuationResult<Vec<ScenarioAssumptions>> {
    let mut csv_reader = Reader::from_reader(reader);
    collect_scenarios(&mut csv_reader)
}

fn collect_scenarios<R: std::io::Read>(reader: &mut Reader<R>) -> ValuationResult<Vec<ScenarioAssumptions>> {
    let mut scenarios = Vec::new();

    for result in reader.deserialize() {
        let scenario: ScenarioAssumptions = result?;
        scenarios.push(scenario);
    }

    log::debug!("loaded {} scenarios", scenarios.len());
    Ok(scenarios)
}
