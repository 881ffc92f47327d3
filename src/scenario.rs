//! Scenario runner for batch valuations
//!
//! Holds one set of deal terms and values it under many market scenarios.
//! The engine is pure, so batches run in parallel and still return results
//! identical to a sequential run, in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::ScenarioAssumptions;
use crate::deal::DealTerms;
use crate::error::ValuationResult;
use crate::hash::{hash_serializable, valuation_key};
use crate::valuation::{compute_deal, DealResults};

/// One valuated scenario with its provenance hashes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub assumptions: ScenarioAssumptions,
    pub results: DealResults,

    /// Hash of the terms and assumptions that produced `results`
    pub input_hash: String,

    /// Hash of `results`
    pub output_hash: String,
}

/// Batch valuation of a single deal
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(DealTerms::reference_deal());
///
/// for outcome in runner.exit_year_sweep(0.04, &[3.0, 5.0, 7.0])? {
///     println!("{} -> {}", outcome.assumptions.exit_year, outcome.results.isa_settlement);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    terms: DealTerms,
}

impl ScenarioRunner {
    pub fn new(terms: DealTerms) -> Self {
        Self { terms }
    }

    /// Value the deal under a single scenario
    pub fn run(&self, assumptions: &ScenarioAssumptions) -> ValuationResult<ScenarioOutcome> {
        let results = compute_deal(&self.terms, assumptions);
        Ok(ScenarioOutcome {
            input_hash: valuation_key(&self.terms, assumptions)?,
            output_hash: hash_serializable(&results)?,
            assumptions: assumptions.clone(),
            results,
        })
    }

    /// Value the deal under many scenarios in parallel; output order matches input order
    pub fn run_batch(&self, scenarios: &[ScenarioAssumptions]) -> ValuationResult<Vec<ScenarioOutcome>> {
        log::debug!("running {} scenarios", scenarios.len());
        scenarios.par_iter().map(|assumptions| self.run(assumptions)).collect()
    }

    /// Same appreciation, different exit years
    pub fn exit_year_sweep(
        &self,
        annual_appreciation: f64,
        exit_years: &[f64],
    ) -> ValuationResult<Vec<ScenarioOutcome>> {
        let scenarios: Vec<_> = exit_years
            .iter()
            .map(|&exit_year| ScenarioAssumptions {
                annual_appreciation,
                exit_year,
                ..ScenarioAssumptions::standard()
            })
            .collect();
        self.run_batch(&scenarios)
    }

    /// Every appreciation crossed with every exit year, appreciation-major
    pub fn grid(&self, appreciations: &[f64], exit_years: &[f64]) -> ValuationResult<Vec<ScenarioOutcome>> {
        let scenarios: Vec<_> = appreciations
            .iter()
            .flat_map(|&annual_appreciation| {
                exit_years.iter().map(move |&exit_year| ScenarioAssumptions {
                    annual_appreciation,
                    exit_year,
                    ..ScenarioAssumptions::standard()
                })
            })
            .collect();
        self.run_batch(&scenarios)
    }

    pub fn terms(&self) -> &DealTerms {
        &self.terms
    }
}
