//! Deal Valuation - Deterministic engine for fractional home-equity investment contracts
//!
//! This library provides:
//! - Settlement math: equity vesting, floor/ceiling clamping, timing factors, duration yield floor
//! - IRR solving (Newton-Raphson with bisection fallback) and annualization
//! - Canonical rounding so every consumer agrees on stored precision
//! - Order-independent JSON hashing for input/output provenance
//! - Batch scenario runs across market assumptions

pub mod rounding;
pub mod error;
pub mod deal;
pub mod assumptions;
pub mod valuation;
pub mod hash;
pub mod scenario;

// Re-export commonly used types
pub use deal::{DealTerms, DownsideMode, ExitAdvisory, exit_advisories};
pub use assumptions::ScenarioAssumptions;
pub use valuation::{compute_deal, compute_deal_checked, compute_irr, DealResults, VestingPoint};
pub use hash::{deterministic_hash, hash_serializable, valuation_key};
pub use error::{ValuationError, ValuationResult};
pub use scenario::{ScenarioOutcome, ScenarioRunner};
