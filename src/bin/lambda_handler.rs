//! AWS Lambda handler for deal valuations
//!
//! Accepts deal terms and scenario assumptions as JSON and returns the
//! settlement results with provenance hashes and, on request, the
//! month-by-month vesting schedule.

use chrono::{DateTime, Utc};
use deal_valuation::valuation::vesting_schedule;
use deal_valuation::{
    compute_deal_checked, exit_advisories, hash_serializable, valuation_key, DealResults, DealTerms,
    ExitAdvisory, ScenarioAssumptions, VestingPoint,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

/// Input for one valuation
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    pub terms: DealTerms,

    /// Defaults to the standard scenario when omitted
    #[serde(default)]
    pub assumptions: ScenarioAssumptions,

    /// Include the vesting schedule in the response
    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Serialize)]
pub struct ValuationResponse {
    pub results: DealResults,
    pub advisories: Vec<ExitAdvisory>,
    pub input_hash: String,
    pub output_hash: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<VestingPoint>>,

    pub generated_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

async fn handler(event: LambdaEvent<ValuationRequest>) -> Result<ValuationResponse, Error> {
    let start = std::time::Instant::now();
    let (request, context) = event.into_parts();
    log::info!("valuation request {}", context.request_id);

    let terms = request.terms;
    let assumptions = request.assumptions;

    let results = compute_deal_checked(&terms, &assumptions)?;
    let advisories = exit_advisories(&terms, &assumptions);
    let input_hash = valuation_key(&terms, &assumptions)?;
    let output_hash = hash_serializable(&results)?;

    let schedule = request
        .include_schedule
        .then(|| vesting_schedule(&terms, &assumptions));

    Ok(ValuationResponse {
        results,
        advisories,
        input_hash,
        output_hash,
        schedule,
        generated_at: Utc::now(),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
