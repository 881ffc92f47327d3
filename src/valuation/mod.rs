//! Deal valuation: settlement math, cashflows, and IRR

mod cashflows;
mod engine;
mod irr;
mod results;
mod schedule;

pub use cashflows::{elapsed_months, investor_cashflows, payments_made, MAX_CASHFLOW_MONTHS};
pub use engine::{compute_deal, compute_deal_checked};
pub use irr::{annualize_irr, compute_irr, solve_monthly_irr, FallbackReason, MAX_ITERATIONS, TOLERANCE};
pub use results::{DealResults, COMPUTE_VERSION};
pub use schedule::{vesting_schedule, write_schedule_csv, VestingPoint};
