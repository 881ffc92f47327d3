//! Value one deal across a file of market scenarios, or across a generated
//! grid of appreciation rates and exit years
//!
//! Scenarios run in parallel; the output CSV keeps the input row order and
//! carries the input/output hashes of every valuation.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use deal_valuation::assumptions::{load_scenarios, DEFAULT_SCENARIOS_PATH};
use deal_valuation::deal::{load_terms, loader::DEFAULT_TERMS_PATH};
use deal_valuation::{ScenarioAssumptions, ScenarioOutcome, ScenarioRunner};

#[derive(Debug, Parser)]
#[command(name = "scenario_grid", version, about = "Run a deal across many market scenarios")]
struct Args {
    /// Deal terms JSON file
    #[arg(long, default_value = DEFAULT_TERMS_PATH)]
    terms: PathBuf,

    /// Scenario CSV file (ignored when --exit-years is given)
    #[arg(long, default_value = DEFAULT_SCENARIOS_PATH)]
    scenarios: PathBuf,

    /// Comma-separated appreciation rates to cross with --exit-years
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    appreciations: Option<Vec<f64>>,

    /// Comma-separated exit years; without --appreciations, sweeps at the standard rate
    #[arg(long, value_delimiter = ',')]
    exit_years: Option<Vec<f64>>,

    /// Write per-scenario results to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Flat CSV row: scenario inputs, headline results, provenance
#[derive(Debug, Serialize)]
struct GridRow<'a> {
    annual_appreciation: f64,
    closing_cost_pct: f64,
    exit_year: f64,
    fmv_override: Option<f64>,
    projected_fmv: f64,
    vested_equity_percentage: f64,
    isa_pre_floor_cap: f64,
    isa_settlement: f64,
    dyf_applied: bool,
    investor_profit: f64,
    investor_multiple: f64,
    investor_irr_annual: f64,
    input_hash: &'a str,
    output_hash: &'a str,
}

impl<'a> From<&'a ScenarioOutcome> for GridRow<'a> {
    fn from(outcome: &'a ScenarioOutcome) -> Self {
        let a = &outcome.assumptions;
        let r = &outcome.results;
        Self {
            annual_appreciation: a.annual_appreciation,
            closing_cost_pct: a.closing_cost_pct,
            exit_year: a.exit_year,
            fmv_override: a.fmv_override,
            projected_fmv: r.projected_fmv,
            vested_equity_percentage: r.vested_equity_percentage,
            isa_pre_floor_cap: r.isa_pre_floor_cap,
            isa_settlement: r.isa_settlement,
            dyf_applied: r.dyf_applied,
            investor_profit: r.investor_profit,
            investor_multiple: r.investor_multiple,
            investor_irr_annual: r.investor_irr_annual,
            input_hash: &outcome.input_hash,
            output_hash: &outcome.output_hash,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let terms = load_terms(&args.terms)
        .with_context(|| format!("loading deal terms from {}", args.terms.display()))?;
    terms.validate().context("validating deal terms")?;
    let runner = ScenarioRunner::new(terms);

    let start = Instant::now();
    let outcomes = match (&args.appreciations, &args.exit_years) {
        (Some(rates), Some(years)) => {
            validate_axes(rates, years)?;
            println!("Running {}x{} scenario grid...", rates.len(), years.len());
            runner.grid(rates, years)?
        }
        (None, Some(years)) => {
            let rate = ScenarioAssumptions::standard().annual_appreciation;
            validate_axes(&[rate], years)?;
            println!("Sweeping {} exit years at {:.2}% appreciation...", years.len(), rate * 100.0);
            runner.exit_year_sweep(rate, years)?
        }
        (Some(_), None) => bail!("--appreciations requires --exit-years"),
        (None, None) => {
            let scenarios = load_scenarios(&args.scenarios)
                .with_context(|| format!("loading scenarios from {}", args.scenarios.display()))?;
            for (i, scenario) in scenarios.iter().enumerate() {
                scenario
                    .validate()
                    .with_context(|| format!("scenario row {}", i + 1))?;
            }
            println!("Running {} scenarios...", scenarios.len());
            runner.run_batch(&scenarios)?
        }
    };

    println!("Completed in {:?}\n", start.elapsed());

    println!(
        "{:>8} {:>6} {:>14} {:>14} {:>14} {:>8} {:>9}  {}",
        "Apprec", "Exit", "FMV", "Settlement", "Profit", "Multiple", "IRR", "Input hash"
    );
    println!("{}", "-".repeat(100));
    for outcome in &outcomes {
        let a = &outcome.assumptions;
        let r = &outcome.results;
        println!(
            "{:>7.2}% {:>6} {:>14.2} {:>14.2} {:>14.2} {:>7.2}x {:>8.2}%  {}",
            a.annual_appreciation * 100.0,
            a.exit_year,
            r.projected_fmv,
            r.isa_settlement,
            r.investor_profit,
            r.investor_multiple,
            r.investor_irr_annual * 100.0,
            &outcome.input_hash[..12],
        );
    }

    if let Some(path) = &args.output {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        for outcome in &outcomes {
            writer.serialize(GridRow::from(outcome))?;
        }
        writer.flush()?;
        println!("\nResults written to: {}", path.display());
    }

    Ok(())
}

/// Reject rates or exit years that no standard scenario could be built from
fn validate_axes(appreciations: &[f64], exit_years: &[f64]) -> Result<()> {
    for &annual_appreciation in appreciations {
        for &exit_year in exit_years {
            ScenarioAssumptions { annual_appreciation, exit_year, ..ScenarioAssumptions::standard() }
                .validate()
                .with_context(|| format!("appreciation {} at exit year {}", annual_appreciation, exit_year))?;
        }
    }
    Ok(())
}
