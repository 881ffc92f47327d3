//! Investor cashflow construction and exit timing

use crate::assumptions::MAX_EXIT_YEAR;
use crate::deal::DealTerms;

/// Guard against representation error when converting years to months (e.g. 7.0 / 12.0 * 12.0)
const MONTH_EPSILON: f64 = 1e-9;

/// Longest exit horizon, in months, for which a monthly cashflow series is built
pub const MAX_CASHFLOW_MONTHS: usize = MAX_EXIT_YEAR as usize * 12;

/// Whole months elapsed from contract start to exit.
///
/// Saturates at `usize::MAX` for exit years too large to count in months.
pub fn elapsed_months(exit_year: f64) -> usize {
    let months = exit_year * 12.0;
    if !(months > 0.0) {
        return 0;
    }
    (months + MONTH_EPSILON).floor() as usize
}

/// Scheduled payments made by the exit month; never more than have elapsed
pub fn payments_made(terms: &DealTerms, exit_months: usize) -> usize {
    (terms.number_of_payments as usize).min(exit_months)
}

/// Monthly investor cashflows from month 0 through the exit month inclusive.
///
/// Month 0 carries the upfront payment, months 1..=payments_made the scheduled
/// payments (all negative), and the settlement is added on top of whatever the
/// exit month already holds.
///
/// Returns `None` when the exit month lies beyond [`MAX_CASHFLOW_MONTHS`].
pub fn investor_cashflows(
    terms: &DealTerms,
    payments_made: usize,
    exit_month: usize,
    settlement: f64,
) -> Option<Vec<f64>> {
    if exit_month > MAX_CASHFLOW_MONTHS {
        return None;
    }

    let mut cashflows = vec![0.0; exit_month + 1];

    cashflows[0] = -terms.upfront_payment;
    for cf in cashflows.iter_mut().skip(1).take(payments_made) {
        *cf = -terms.monthly_payment;
    }
    cashflows[exit_month] += settlement;

    Some(cashflows)
}
