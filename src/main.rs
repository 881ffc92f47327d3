//! Deal Valuation CLI
//!
//! Values one deal under one scenario and prints the settlement breakdown

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

use deal_valuation::deal::{load_terms, loader::DEFAULT_TERMS_PATH};
use deal_valuation::valuation::{vesting_schedule, write_schedule_csv};
use deal_valuation::{
    compute_deal_checked, exit_advisories, hash_serializable, valuation_key, DealResults,
    ExitAdvisory, ScenarioAssumptions,
};

#[derive(Debug, Parser)]
#[command(name = "deal_valuation", version, about = "Value a fractional home-equity deal at exit")]
struct Args {
    /// Deal terms JSON file
    #[arg(long, default_value = DEFAULT_TERMS_PATH)]
    terms: PathBuf,

    /// Annual property appreciation (e.g. 0.04)
    #[arg(long, default_value_t = 0.04, allow_hyphen_values = true)]
    appreciation: f64,

    /// Exit time in contract years
    #[arg(long, default_value_t = 7.0)]
    exit_year: f64,

    /// FMV at exit, bypassing the growth projection
    #[arg(long)]
    fmv_override: Option<f64>,

    /// Closing cost fraction (advisory)
    #[arg(long, default_value_t = 0.02)]
    closing_cost: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the month-by-month vesting schedule to this CSV file
    #[arg(long)]
    schedule: Option<PathBuf>,
}

#[derive(Serialize)]
struct ValuationReport<'a> {
    generated_at: DateTime<Utc>,
    assumptions: &'a ScenarioAssumptions,
    results: &'a DealResults,
    advisories: &'a [ExitAdvisory],
    input_hash: String,
    output_hash: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let terms = load_terms(&args.terms)
        .with_context(|| format!("loading deal terms from {}", args.terms.display()))?;

    let assumptions = ScenarioAssumptions {
        annual_appreciation: args.appreciation,
        closing_cost_pct: args.closing_cost,
        exit_year: args.exit_year,
        fmv_override: args.fmv_override,
    };

    let results = compute_deal_checked(&terms, &assumptions).context("valuing deal")?;
    let advisories = exit_advisories(&terms, &assumptions);

    let report = ValuationReport {
        generated_at: Utc::now(),
        assumptions: &assumptions,
        results: &results,
        advisories: &advisories,
        input_hash: valuation_key(&terms, &assumptions)?,
        output_hash: hash_serializable(&results)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = &args.schedule {
        let schedule = vesting_schedule(&terms, &assumptions);
        let file = File::create(path)
            .with_context(|| format!("creating schedule file {}", path.display()))?;
        write_schedule_csv(file, &schedule)?;
        if !args.json {
            println!("\nVesting schedule ({} months) written to: {}", schedule.len(), path.display());
        }
    }

    Ok(())
}

fn print_report(report: &ValuationReport) {
    let r = report.results;
    let a = report.assumptions;

    println!("Deal Valuation v{}", r.compute_version);
    println!("======================\n");

    println!("Scenario:");
    println!("  Appreciation: {:.2}%", a.annual_appreciation * 100.0);
    println!("  Exit Year:    {}", a.exit_year);
    if let Some(fmv) = a.effective_fmv_override() {
        println!("  FMV Override: ${:.2}", fmv);
    }
    println!();

    println!("Settlement:");
    println!("  {:<28} {:>16.2}", "Invested capital (IBA)", r.invested_capital_total);
    println!("  {:<28} {:>16.6}", "Vested equity", r.vested_equity_percentage);
    println!("  {:<28} {:>16.2}", "Projected FMV", r.projected_fmv);
    println!("  {:<28} {:>16.2}", "Base equity value", r.base_equity_value);
    println!("  {:<28} {:>16.2}", "Gain above capital", r.gain_above_capital);
    println!("  {:<28} {:>16.2}", "Pre floor/cap settlement", r.isa_pre_floor_cap);
    println!("  {:<28} {:>16.2}", "Floor", r.floor_amount);
    println!("  {:<28} {:>16.2}", "Ceiling", r.ceiling_amount);
    if r.dyf_floor_amount > 0.0 {
        println!(
            "  {:<28} {:>16.2} ({})",
            "Duration yield floor",
            r.dyf_floor_amount,
            if r.dyf_applied { "applied" } else { "not binding" }
        );
    }
    println!("  {:<28} {:>16.2}", "Final settlement", r.isa_settlement);
    println!();

    println!("Investor returns:");
    println!("  Profit:   ${:.2}", r.investor_profit);
    println!("  Multiple: {:.2}x", r.investor_multiple);
    println!("  IRR:      {:.2}%", r.investor_irr_annual * 100.0);

    if !report.advisories.is_empty() {
        println!("\nAdvisories:");
        for advisory in report.advisories {
            println!("  {:?}", advisory);
        }
    }

    println!("\nInput hash:  {}", report.input_hash);
    println!("Output hash: {}", report.output_hash);
    println!("Generated:   {}", report.generated_at.to_rfc3339());
}
