//! Month-by-month vesting schedule up to exit

use serde::{Deserialize, Serialize};

use crate::assumptions::ScenarioAssumptions;
use crate::deal::DealTerms;
use crate::rounding::round_money;
use super::cashflows::{elapsed_months, investor_cashflows, payments_made};
use super::engine::{compute_deal, monthly_equity, property_value_at};

/// A single month of the vesting schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VestingPoint {
    /// Month index from contract start (0 = origination)
    pub month: usize,

    /// Contract year as a fraction (month / 12)
    pub year: f64,

    /// Projected property value at this month
    pub property_value: f64,

    /// Cumulative vested equity share
    pub vested_equity: f64,

    /// Cumulative invested capital
    pub invested_capital: f64,

    /// Investor cashflow this month (settlement included at exit)
    pub cashflow: f64,
}

/// Vesting schedule from origination through the exit month.
///
/// Uses the same per-month pricing and cashflows as [`compute_deal`], so the final
/// row agrees with the valuation's vested equity and invested capital.
/// Empty when the exit lies beyond the cashflow horizon.
pub fn vesting_schedule(terms: &DealTerms, assumptions: &ScenarioAssumptions) -> Vec<VestingPoint> {
    let exit_months = elapsed_months(assumptions.exit_year);
    let payments_made = payments_made(terms, exit_months);
    let settlement = compute_deal(terms, assumptions).isa_settlement;
    let Some(cashflows) = investor_cashflows(terms, payments_made, exit_months, settlement) else {
        return Vec::new();
    };

    let upfront_equity = terms.upfront_payment / terms.property_value;
    let mut monthly_equity_total = 0.0;

    cashflows
        .iter()
        .enumerate()
        .map(|(month, &cashflow)| {
            if month >= 1 && month <= payments_made {
                monthly_equity_total += monthly_equity(terms, assumptions.annual_appreciation, month);
            }
            let payments_to_date = month.min(payments_made) as f64;
            let year = month as f64 / 12.0;

            VestingPoint {
                month,
                year,
                property_value: round_money(property_value_at(terms, assumptions.annual_appreciation, year)),
                vested_equity: upfront_equity + monthly_equity_total,
                invested_capital: round_money(terms.upfront_payment + terms.monthly_payment * payments_to_date),
                cashflow,
            }
        })
        .collect()
}

/// Write a vesting schedule as CSV
pub fn write_schedule_csv<W: std::io::Write>(
    writer: W,
    schedule: &[VestingPoint],
) -> crate::error::ValuationResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in schedule {
        csv_writer.serialize(point)?;
    }
    csv_writer.flush()?;
    Ok(())
}
