//! Deal valuation engine
//!
//! Orchestrates vesting, settlement clamping, the duration yield floor, and
//! cashflow construction, then solves for IRR. Pure and synchronous: the same
//! terms and assumptions always produce bit-identical results.

use crate::assumptions::ScenarioAssumptions;
use crate::deal::{exit_advisories, DealTerms, DownsideMode};
use crate::error::{ValuationError, ValuationResult};
use crate::rounding::round_money;
use super::cashflows::{elapsed_months, investor_cashflows, payments_made};
use super::irr::compute_irr;
use super::results::{DealResults, COMPUTE_VERSION};

/// Value a deal at the scenario's exit.
///
/// Never fails: degenerate terms (e.g. zero property value) propagate as
/// NaN/infinity through the result. Use [`compute_deal_checked`] to reject them.
pub fn compute_deal(terms: &DealTerms, assumptions: &ScenarioAssumptions) -> DealResults {
    let exit_months = elapsed_months(assumptions.exit_year);
    let payments_made = payments_made(terms, exit_months);

    let invested_capital_total =
        round_money(terms.upfront_payment + terms.monthly_payment * payments_made as f64);

    let projected_fmv = round_money(projected_fmv(terms, assumptions));

    let vested_equity_percentage =
        vested_equity(terms, assumptions.annual_appreciation, payments_made);

    let base_equity_value = round_money(projected_fmv * vested_equity_percentage);
    let gain_above_capital = round_money(base_equity_value - invested_capital_total);

    // Timing factor scales the gain only, never the principal
    let timing_factor = terms.timing_factor(assumptions.exit_year);
    let isa_pre_floor_cap = round_money(invested_capital_total + gain_above_capital * timing_factor);

    let floor_amount = round_money(invested_capital_total * terms.floor_multiple);
    let ceiling_amount = round_money(invested_capital_total * terms.ceiling_multiple);

    let standard_settlement = round_money(clamp_settlement(
        terms.downside_mode,
        isa_pre_floor_cap,
        floor_amount,
        ceiling_amount,
    ));

    let (isa_settlement, dyf_floor_amount, dyf_applied) = apply_duration_yield_floor(
        terms,
        assumptions.exit_year,
        invested_capital_total,
        standard_settlement,
    );

    let investor_profit = round_money(isa_settlement - invested_capital_total);
    let investor_multiple = round_money(if invested_capital_total > 0.0 {
        isa_settlement / invested_capital_total
    } else {
        0.0
    });

    let investor_irr_annual = match investor_cashflows(terms, payments_made, exit_months, isa_settlement) {
        Some(cashflows) => compute_irr(&cashflows),
        None => {
            log::debug!("exit month {} beyond cashflow horizon, IRR reported as 0", exit_months);
            0.0
        }
    };

    DealResults {
        invested_capital_total,
        vested_equity_percentage,
        projected_fmv,
        base_equity_value,
        gain_above_capital,
        isa_pre_floor_cap,
        floor_amount,
        ceiling_amount,
        isa_settlement,
        dyf_floor_amount,
        dyf_applied,
        investor_profit,
        investor_multiple,
        investor_irr_annual,
        compute_version: COMPUTE_VERSION.to_string(),
    }
}

/// Validate inputs, value the deal, and reject any non-finite result
pub fn compute_deal_checked(
    terms: &DealTerms,
    assumptions: &ScenarioAssumptions,
) -> ValuationResult<DealResults> {
    terms.validate()?;
    assumptions.validate()?;

    for advisory in exit_advisories(terms, assumptions) {
        log::warn!("exit advisory: {:?}", advisory);
    }

    let results = compute_deal(terms, assumptions);

    if let Some((field, value)) = results.first_non_finite() {
        return Err(ValuationError::NonFiniteResult { field, value });
    }

    Ok(results)
}

/// Property value after `years` of compound appreciation
pub(crate) fn property_value_at(terms: &DealTerms, annual_appreciation: f64, years: f64) -> f64 {
    terms.property_value * (1.0 + annual_appreciation).powf(years)
}

/// Equity share bought by one monthly payment, priced at that month's property value
pub(crate) fn monthly_equity(terms: &DealTerms, annual_appreciation: f64, month: usize) -> f64 {
    terms.monthly_payment / property_value_at(terms, annual_appreciation, month as f64 / 12.0)
}

fn projected_fmv(terms: &DealTerms, assumptions: &ScenarioAssumptions) -> f64 {
    match assumptions.effective_fmv_override() {
        Some(fmv) => fmv,
        None => property_value_at(terms, assumptions.annual_appreciation, assumptions.exit_year),
    }
}

fn vested_equity(terms: &DealTerms, annual_appreciation: f64, payments_made: usize) -> f64 {
    let upfront_equity = terms.upfront_payment / terms.property_value;

    let mut monthly_equity_total = 0.0;
    for month in 1..=payments_made {
        monthly_equity_total += monthly_equity(terms, annual_appreciation, month);
    }

    upfront_equity + monthly_equity_total
}

fn clamp_settlement(mode: DownsideMode, pre_floor_cap: f64, floor: f64, ceiling: f64) -> f64 {
    match mode {
        DownsideMode::HardFloor => min_propagating(max_propagating(pre_floor_cap, floor), ceiling),
        DownsideMode::NoFloor => min_propagating(pre_floor_cap, ceiling),
    }
}

/// Raise the standard settlement to the DYF amount once the floor is in effect.
///
/// Applied after the floor/ceiling clamp and not itself capped, so it can lift
/// the settlement above the ceiling.
fn apply_duration_yield_floor(
    terms: &DealTerms,
    exit_year: f64,
    invested_capital_total: f64,
    standard_settlement: f64,
) -> (f64, f64, bool) {
    let Some(dyf) = terms.duration_yield_floor() else {
        return (standard_settlement, 0.0, false);
    };

    let dyf_floor = round_money(invested_capital_total * dyf.min_multiple);

    if exit_year >= dyf.start_year && standard_settlement < dyf_floor {
        (dyf_floor, dyf_floor, true)
    } else {
        (standard_settlement, dyf_floor, false)
    }
}

// f64::max/min drop NaN operands; degenerate input must stay visible in the result
fn max_propagating(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn min_propagating(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::cashflows::MAX_CASHFLOW_MONTHS;
    use crate::assumptions::MAX_EXIT_YEAR;
    use approx::assert_abs_diff_eq;

    fn scenario(annual_appreciation: f64, exit_year: f64) -> ScenarioAssumptions {
        ScenarioAssumptions {
            annual_appreciation,
            closing_cost_pct: 0.02,
            exit_year,
            fmv_override: None,
        }
    }

    fn assert_profit_and_multiple(results: &DealResults) {
        assert_abs_diff_eq!(
            results.investor_profit,
            results.isa_settlement - results.invested_capital_total,
            epsilon = 0.005
        );
        assert_eq!(
            results.investor_multiple,
            round_money(results.isa_settlement / results.invested_capital_total)
        );
    }

    #[test]
    fn test_reference_deal_golden() {
        let results = compute_deal(&DealTerms::reference_deal(), &ScenarioAssumptions::standard());

        assert_eq!(results.compute_version, "10.0.0");
        assert_eq!(results.invested_capital_total, 204_000.00);
        assert_eq!(results.projected_fmv, round_money(600_000.0 * 1.04_f64.powf(7.0)));
        assert_eq!(results.floor_amount, 210_120.00);
        assert_eq!(results.ceiling_amount, 663_000.00);
        assert!(results.isa_settlement >= 210_120.00);
        assert!(results.isa_settlement <= 663_000.00);
        assert!(results.investor_multiple > 1.0);
        assert!(results.investor_irr_annual > 0.0);
        assert!(!results.dyf_applied);
        assert_eq!(results.dyf_floor_amount, 0.0);
    }

    #[test]
    fn test_reference_deal_breakdown_is_consistent() {
        let results = compute_deal(&DealTerms::reference_deal(), &ScenarioAssumptions::standard());

        assert!(results.vested_equity_percentage > 0.0 && results.vested_equity_percentage <= 1.0);
        assert_eq!(
            results.base_equity_value,
            round_money(results.projected_fmv * results.vested_equity_percentage)
        );
        assert_eq!(
            results.gain_above_capital,
            round_money(results.base_equity_value - results.invested_capital_total)
        );
        // Inside the payback window the timing factor is neutral
        assert_eq!(
            results.isa_pre_floor_cap,
            round_money(results.invested_capital_total + results.gain_above_capital)
        );
        assert_profit_and_multiple(&results);
    }

    #[test]
    fn test_money_fields_are_rounded() {
        let results = compute_deal(&DealTerms::reference_deal(), &scenario(0.037, 6.5));
        for (field, value) in results.numeric_fields() {
            if field == "vested_equity_percentage" || field == "investor_irr_annual" {
                continue;
            }
            assert_eq!(value, (value * 100.0).round() / 100.0, "{} not rounded to cents", field);
        }
    }

    #[test]
    fn test_early_exit_applies_early_factor() {
        let results = compute_deal(&DealTerms::reference_deal(), &scenario(0.04, 2.0));

        assert_eq!(results.invested_capital_total, round_money(60_000.0 + 24.0 * 2_000.0));
        assert_eq!(
            results.isa_pre_floor_cap,
            round_money(results.invested_capital_total + results.gain_above_capital * 0.9)
        );
        assert!(results.isa_settlement >= results.floor_amount);
    }

    #[test]
    fn test_late_exit_applies_late_factor() {
        let results = compute_deal(&DealTerms::reference_deal(), &scenario(0.04, 12.0));

        assert_eq!(results.invested_capital_total, 204_000.0);
        assert_eq!(
            results.isa_pre_floor_cap,
            round_money(results.invested_capital_total + results.gain_above_capital * 1.2)
        );
        assert!(results.projected_fmv > round_money(600_000.0 * 1.04_f64.powf(7.0)));
    }

    #[test]
    fn test_ceiling_binds() {
        let terms = DealTerms {
            floor_multiple: 1.0,
            ceiling_multiple: 1.5,
            ..DealTerms::reference_deal()
        };
        let results = compute_deal(&terms, &scenario(0.10, 10.0));

        assert!(results.isa_pre_floor_cap > results.ceiling_amount);
        assert_eq!(results.isa_settlement, results.ceiling_amount);
        assert_eq!(results.ceiling_amount, round_money(results.invested_capital_total * 1.5));
    }

    #[test]
    fn test_hard_floor_protects_investor() {
        let results = compute_deal(&DealTerms::reference_deal(), &scenario(-0.05, 5.0));

        assert!(results.gain_above_capital < 0.0);
        assert_eq!(results.isa_settlement, results.floor_amount);
        assert_eq!(results.floor_amount, round_money(results.invested_capital_total * 1.03));
        assert_profit_and_multiple(&results);
    }

    #[test]
    fn test_no_floor_shares_loss() {
        let terms = DealTerms {
            downside_mode: DownsideMode::NoFloor,
            ..DealTerms::reference_deal()
        };
        let results = compute_deal(&terms, &scenario(-0.10, 5.0));

        assert!(results.isa_settlement < results.invested_capital_total);
        assert!(results.isa_settlement < results.floor_amount);
        assert!(results.isa_settlement <= results.ceiling_amount);
        assert!(results.investor_profit < 0.0);
        assert!(results.investor_multiple < 1.0);
        assert_profit_and_multiple(&results);
    }

    #[test]
    fn test_zero_appreciation() {
        let results = compute_deal(&DealTerms::reference_deal(), &scenario(0.0, 7.0));

        assert_eq!(results.projected_fmv, 600_000.0);
        assert!(results.gain_above_capital.is_finite());
        assert!(results.isa_settlement >= results.floor_amount);
    }

    #[test]
    fn test_fmv_override() {
        let assumptions = ScenarioAssumptions {
            fmv_override: Some(1_000_000.0),
            ..ScenarioAssumptions::standard()
        };
        let results = compute_deal(&DealTerms::reference_deal(), &assumptions);
        assert_eq!(results.projected_fmv, 1_000_000.0);

        let ignored = ScenarioAssumptions {
            fmv_override: Some(0.0),
            ..ScenarioAssumptions::standard()
        };
        let baseline = compute_deal(&DealTerms::reference_deal(), &ScenarioAssumptions::standard());
        assert_eq!(compute_deal(&DealTerms::reference_deal(), &ignored), baseline);
    }

    #[test]
    fn test_duration_yield_floor_raises_settlement() {
        let terms = DealTerms {
            downside_mode: DownsideMode::NoFloor,
            duration_yield_floor_enabled: true,
            duration_yield_floor_start_year: Some(4.0),
            duration_yield_floor_min_multiple: Some(1.0),
            ..DealTerms::reference_deal()
        };
        let results = compute_deal(&terms, &scenario(-0.10, 5.0));

        assert!(results.dyf_applied);
        assert_eq!(results.dyf_floor_amount, results.invested_capital_total);
        assert_eq!(results.isa_settlement, results.dyf_floor_amount);
        assert_eq!(results.investor_profit, 0.0);
        assert_eq!(results.investor_multiple, 1.0);
    }

    #[test]
    fn test_duration_yield_floor_time_gated() {
        let terms = DealTerms {
            downside_mode: DownsideMode::NoFloor,
            duration_yield_floor_enabled: true,
            duration_yield_floor_start_year: Some(4.0),
            duration_yield_floor_min_multiple: Some(1.0),
            ..DealTerms::reference_deal()
        };
        let results = compute_deal(&terms, &scenario(-0.10, 3.0));

        assert!(!results.dyf_applied);
        assert_eq!(results.dyf_floor_amount, results.invested_capital_total);
        assert!(results.isa_settlement < results.dyf_floor_amount);
    }

    #[test]
    fn test_duration_yield_floor_applies_from_start_year() {
        let terms = DealTerms {
            downside_mode: DownsideMode::NoFloor,
            duration_yield_floor_enabled: true,
            duration_yield_floor_start_year: Some(5.0),
            duration_yield_floor_min_multiple: Some(1.0),
            ..DealTerms::reference_deal()
        };

        let at_start = compute_deal(&terms, &scenario(-0.10, 5.0));
        assert!(at_start.dyf_applied);
        assert_eq!(at_start.isa_settlement, at_start.dyf_floor_amount);

        let just_before = compute_deal(&terms, &scenario(-0.10, 59.0 / 12.0));
        assert!(!just_before.dyf_applied);
        assert!(just_before.isa_settlement < just_before.dyf_floor_amount);
    }

    #[test]
    fn test_settlement_invariants_across_scenarios() {
        let hard_floor = DealTerms::reference_deal();
        let no_floor = DealTerms { downside_mode: DownsideMode::NoFloor, ..DealTerms::reference_deal() };
        let with_dyf = |terms: &DealTerms| DealTerms {
            duration_yield_floor_enabled: true,
            duration_yield_floor_start_year: Some(4.0),
            duration_yield_floor_min_multiple: Some(1.1),
            ..terms.clone()
        };
        let deals = [with_dyf(&hard_floor), with_dyf(&no_floor), hard_floor, no_floor];

        for terms in &deals {
            let dyf_enabled = terms.duration_yield_floor().is_some();

            for step in -6..=6 {
                let appreciation = step as f64 * 0.05;

                // Quarter-year steps from origination through year 15
                for quarter in 0..=60 {
                    let assumptions = scenario(appreciation, quarter as f64 * 0.25);
                    let results = compute_deal(terms, &assumptions);
                    let context = format!("{:?} dyf={} {:?}", terms.downside_mode, dyf_enabled, assumptions);

                    if !results.dyf_applied {
                        assert!(results.isa_settlement <= results.ceiling_amount, "above ceiling: {}", context);
                    }
                    if terms.downside_mode == DownsideMode::HardFloor {
                        assert!(results.isa_settlement >= results.floor_amount, "below floor: {}", context);
                    }
                    if dyf_enabled && assumptions.exit_year >= 4.0 {
                        assert!(results.isa_settlement >= results.dyf_floor_amount, "below DYF: {}", context);
                    }
                    if !dyf_enabled {
                        assert!(!results.dyf_applied, "DYF applied while disabled: {}", context);
                    }
                    assert_profit_and_multiple(&results);

                    let repeat = compute_deal(terms, &assumptions);
                    for ((field, a), (_, b)) in results.numeric_fields().iter().zip(repeat.numeric_fields().iter()) {
                        assert_eq!(a.to_bits(), b.to_bits(), "{} not deterministic: {}", field, context);
                    }
                    assert_eq!(results.dyf_applied, repeat.dyf_applied);
                }
            }
        }
    }

    #[test]
    fn test_duration_yield_floor_never_lowers() {
        let terms = DealTerms {
            duration_yield_floor_enabled: true,
            duration_yield_floor_start_year: Some(1.0),
            duration_yield_floor_min_multiple: Some(1.0),
            ..DealTerms::reference_deal()
        };
        let with_dyf = compute_deal(&terms, &ScenarioAssumptions::standard());
        let without = compute_deal(&DealTerms::reference_deal(), &ScenarioAssumptions::standard());

        assert!(!with_dyf.dyf_applied);
        assert_eq!(with_dyf.isa_settlement, without.isa_settlement);
    }

    #[test]
    fn test_duration_yield_floor_can_exceed_ceiling() {
        let terms = DealTerms {
            floor_multiple: 0.5,
            ceiling_multiple: 0.8,
            duration_yield_floor_enabled: true,
            duration_yield_floor_start_year: Some(0.0),
            duration_yield_floor_min_multiple: Some(1.1),
            ..DealTerms::reference_deal()
        };
        let results = compute_deal(&terms, &ScenarioAssumptions::standard());

        assert!(results.dyf_applied);
        assert!(results.isa_settlement > results.ceiling_amount);
    }

    #[test]
    fn test_irr_uses_settlement_cashflows() {
        let terms = DealTerms::reference_deal();
        let results = compute_deal(&terms, &ScenarioAssumptions::standard());
        let cashflows = investor_cashflows(&terms, 72, 84, results.isa_settlement).unwrap();
        assert_eq!(results.investor_irr_annual, compute_irr(&cashflows));
    }

    #[test]
    fn test_exit_at_horizon_still_solves_irr() {
        let terms = DealTerms::reference_deal();
        let results = compute_deal(&terms, &scenario(0.04, f64::from(MAX_EXIT_YEAR)));

        let cashflows =
            investor_cashflows(&terms, 72, MAX_CASHFLOW_MONTHS, results.isa_settlement).unwrap();
        assert_eq!(results.investor_irr_annual, compute_irr(&cashflows));
    }

    #[test]
    fn test_exit_beyond_horizon_degrades_without_panic() {
        let terms = DealTerms::reference_deal();

        let flat = compute_deal(&terms, &scenario(0.0, 1e8));
        assert_eq!(flat.invested_capital_total, 204_000.0);
        assert_eq!(flat.projected_fmv, 600_000.0);
        assert_eq!(flat.investor_irr_annual, 0.0);
        assert_profit_and_multiple(&flat);

        // FMV overflows to infinity and the ceiling binds
        let distant = compute_deal(&terms, &scenario(0.04, 1e300));
        assert_eq!(distant.isa_settlement, distant.ceiling_amount);
        assert_eq!(distant.investor_irr_annual, 0.0);

        let unbounded = compute_deal(&terms, &scenario(0.04, f64::INFINITY));
        assert_eq!(unbounded.investor_irr_annual, 0.0);
    }

    #[test]
    fn test_checked_rejects_exit_beyond_horizon() {
        for exit_year in [f64::from(MAX_EXIT_YEAR) + 0.5, 1e8, 1e300] {
            assert!(matches!(
                compute_deal_checked(&DealTerms::reference_deal(), &scenario(0.04, exit_year)),
                Err(ValuationError::InvalidAssumptions { field: "exit_year", .. })
            ));
        }
    }

    #[test]
    fn test_exit_at_origination() {
        let results = compute_deal(&DealTerms::reference_deal(), &scenario(0.04, 0.0));

        assert_eq!(results.invested_capital_total, 60_000.0);
        assert_eq!(results.projected_fmv, 600_000.0);
        // Single cashflow has no IRR
        assert_eq!(results.investor_irr_annual, 0.0);
    }

    #[test]
    fn test_deterministic_output() {
        let terms = DealTerms::reference_deal();
        let assumptions = ScenarioAssumptions::standard();
        let first = serde_json::to_string(&compute_deal(&terms, &assumptions)).unwrap();
        for _ in 0..10 {
            assert_eq!(serde_json::to_string(&compute_deal(&terms, &assumptions)).unwrap(), first);
        }

        let r5 = compute_deal(&terms, &scenario(0.04, 5.0));
        let r7 = compute_deal(&terms, &scenario(0.04, 7.0));
        assert_ne!(r5.projected_fmv, r7.projected_fmv);
    }

    #[test]
    fn test_zero_property_value_propagates_nan() {
        let terms = DealTerms { property_value: 0.0, ..DealTerms::reference_deal() };
        let results = compute_deal(&terms, &ScenarioAssumptions::standard());

        assert!(results.isa_settlement.is_nan());
        assert!(results.investor_profit.is_nan());
        assert!(results.first_non_finite().is_some());
    }

    #[test]
    fn test_checked_rejects_degenerate_input() {
        let terms = DealTerms { property_value: 0.0, ..DealTerms::reference_deal() };
        assert!(matches!(
            compute_deal_checked(&terms, &ScenarioAssumptions::standard()),
            Err(ValuationError::InvalidTerms { field: "property_value", .. })
        ));

        let assumptions = ScenarioAssumptions { exit_year: f64::NAN, ..ScenarioAssumptions::standard() };
        assert!(matches!(
            compute_deal_checked(&DealTerms::reference_deal(), &assumptions),
            Err(ValuationError::InvalidAssumptions { field: "exit_year", .. })
        ));
    }

    #[test]
    fn test_checked_matches_unchecked() {
        let terms = DealTerms::reference_deal();
        let assumptions = ScenarioAssumptions::standard();
        assert_eq!(
            compute_deal_checked(&terms, &assumptions).unwrap(),
            compute_deal(&terms, &assumptions)
        );
    }

    #[test]
    fn test_propagating_clamp() {
        assert!(clamp_settlement(DownsideMode::HardFloor, f64::NAN, 1.0, 2.0).is_nan());
        assert_eq!(clamp_settlement(DownsideMode::HardFloor, 0.5, 1.0, 2.0), 1.0);
        assert_eq!(clamp_settlement(DownsideMode::HardFloor, 3.0, 1.0, 2.0), 2.0);
        assert_eq!(clamp_settlement(DownsideMode::NoFloor, 0.5, 1.0, 2.0), 0.5);
        assert_eq!(clamp_settlement(DownsideMode::NoFloor, -5.0, 1.0, 2.0), -5.0);
    }
}
