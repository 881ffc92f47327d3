//! Internal Rate of Return (IRR) calculation
//!
//! Used to calculate the investor's annualized return from the monthly deal cashflows.
//! Newton-Raphson runs first; when it cannot make progress the solver falls back to
//! bisection over a fixed bracket. Every path is a pure function of the cashflows.

use crate::rounding::{round_irr_annual, round_irr_monthly};

/// Maximum iterations for each solver phase
pub const MAX_ITERATIONS: usize = 1000;

/// Convergence tolerance on rate steps and NPV magnitude
pub const TOLERANCE: f64 = 1e-10;

/// Derivative magnitude below which a Newton step is meaningless
const FLAT_DERIVATIVE: f64 = 1e-20;

/// Newton-Raphson starting rate (1% per period)
const INITIAL_GUESS: f64 = 0.01;

/// Bisection bracket for the periodic rate
const BISECTION_LOW: f64 = -0.999;
const BISECTION_HIGH: f64 = 10.0;

/// Why Newton-Raphson handed over to bisection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// NPV derivative was numerically zero
    FlatDerivative,
    /// Step landed at or below -100%, where NPV is undefined
    InvalidRate,
    /// Iteration budget exhausted without convergence
    IterationLimit,
}

/// Result of the Newton-Raphson phase
#[derive(Debug, Clone, Copy, PartialEq)]
enum NewtonOutcome {
    Converged(f64),
    Fallback(FallbackReason),
}

/// Solve for the periodic rate that zeroes NPV, rounded to 6 decimal places.
///
/// Cashflows are indexed by period starting at 0 (negative = investor outflow).
/// Returns `None` when fewer than two cashflows are given or no root is bracketed.
pub fn solve_monthly_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.len() < 2 {
        return None;
    }

    match newton_raphson(cashflows) {
        NewtonOutcome::Converged(rate) => Some(round_irr_monthly(rate)),
        NewtonOutcome::Fallback(reason) => {
            log::debug!("newton-raphson fell back to bisection: {:?}", reason);
            bisection(cashflows)
        }
    }
}

/// Convert a periodic (monthly) rate to an annual rate, rounded to 4 decimal places
pub fn annualize_irr(monthly_irr: f64) -> f64 {
    round_irr_annual((1.0 + monthly_irr).powi(12) - 1.0)
}

/// Annualized IRR of monthly cashflows.
///
/// An unsolvable IRR (e.g. every cashflow negative) reports 0 rather than failing,
/// so a total-loss scenario still produces a displayable number.
pub fn compute_irr(cashflows: &[f64]) -> f64 {
    match solve_monthly_irr(cashflows) {
        Some(monthly) => annualize_irr(monthly),
        None => 0.0,
    }
}

fn newton_raphson(cashflows: &[f64]) -> NewtonOutcome {
    let mut rate = INITIAL_GUESS;

    for _ in 0..MAX_ITERATIONS {
        let npv = npv_at_rate(cashflows, rate);
        let dnpv = npv_derivative(cashflows, rate);

        if dnpv.abs() < FLAT_DERIVATIVE {
            return NewtonOutcome::Fallback(FallbackReason::FlatDerivative);
        }

        let new_rate = rate - npv / dnpv;

        if new_rate <= -1.0 {
            return NewtonOutcome::Fallback(FallbackReason::InvalidRate);
        }

        if (new_rate - rate).abs() < TOLERANCE {
            return NewtonOutcome::Converged(new_rate);
        }

        rate = new_rate;
    }

    NewtonOutcome::Fallback(FallbackReason::IterationLimit)
}

fn bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = BISECTION_LOW;
    let mut high = BISECTION_HIGH;

    // No sign change across the bracket means no root inside it
    if npv_at_rate(cashflows, low) * npv_at_rate(cashflows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(round_irr_monthly(mid));
        }

        // Sign test against the current low end, not the original bracket
        if npv_mid * npv_at_rate(cashflows, low) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    None
}

/// NPV at a given periodic rate
fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powf(t as f64))
        .sum()
}

/// First derivative of NPV with respect to the rate
fn npv_derivative(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, &cf)| -(t as f64) * cf / (1.0 + rate).powf(t as f64 + 1.0))
        .sum()
}
