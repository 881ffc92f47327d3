//! Scenario assumptions: market inputs for one valuation run

pub mod loader;

pub use loader::{load_scenarios, load_scenarios_from_reader, DEFAULT_SCENARIOS_PATH};

use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};

/// Longest exit horizon accepted, in contract years
pub const MAX_EXIT_YEAR: u32 = 100;

/// Market assumptions, varied independently of the deal terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    /// Annual property appreciation (negative for depreciation)
    pub annual_appreciation: f64,

    /// Closing cost as a fraction of sale price (advisory, not applied to settlement)
    #[serde(default)]
    pub closing_cost_pct: f64,

    /// Exit time in contract years (fractional allowed)
    pub exit_year: f64,

    /// What-if FMV at exit; used verbatim when strictly positive
    #[serde(default)]
    pub fmv_override: Option<f64>,
}

impl ScenarioAssumptions {
    /// Standard scenario: 4% appreciation, exit at year 7
    pub fn standard() -> Self {
        Self {
            annual_appreciation: 0.04,
            closing_cost_pct: 0.02,
            exit_year: 7.0,
            fmv_override: None,
        }
    }

    /// FMV override if present and strictly positive
    pub fn effective_fmv_override(&self) -> Option<f64> {
        self.fmv_override.filter(|fmv| *fmv > 0.0)
    }

    /// Check the assumptions for values that would make the valuation degenerate
    pub fn validate(&self) -> ValuationResult<()> {
        if !self.exit_year.is_finite() || self.exit_year < 0.0 {
            return Err(ValuationError::assumptions(
                "exit_year",
                format!("must be finite and non-negative, got {}", self.exit_year),
            ));
        }

        if self.exit_year > f64::from(MAX_EXIT_YEAR) {
            return Err(ValuationError::assumptions(
                "exit_year",
                format!("must be at most {} years, got {}", MAX_EXIT_YEAR, self.exit_year),
            ));
        }

        if !self.annual_appreciation.is_finite() || self.annual_appreciation <= -1.0 {
            return Err(ValuationError::assumptions(
                "annual_appreciation",
                format!("must be finite and above -100%, got {}", self.annual_appreciation),
            ));
        }

        if let Some(fmv) = self.fmv_override {
            if !fmv.is_finite() || fmv < 0.0 {
                return Err(ValuationError::assumptions(
                    "fmv_override",
                    format!("must be finite and non-negative, got {}", fmv),
                ));
            }
        }

        Ok(())
    }
}

impl Default for ScenarioAssumptions {
    fn default() -> Self {
        Self::standard()
    }
}
