//! Deal terms: the immutable contract parameters of one home-equity investment

use serde::{Deserialize, Serialize};

use crate::assumptions::ScenarioAssumptions;
use crate::error::{ValuationError, ValuationResult};

/// Downside protection applied when settling the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownsideMode {
    /// Settlement is clamped into [floor, ceiling]
    HardFloor,
    /// Only the ceiling applies; the investor shares downside loss
    NoFloor,
}

/// Contract terms, one per deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealTerms {
    /// Property value at origination
    pub property_value: f64,

    /// Lump sum paid at contract start (month 0)
    pub upfront_payment: f64,

    /// Scheduled monthly payment amount
    pub monthly_payment: f64,

    /// Number of scheduled monthly payments
    pub number_of_payments: u32,

    /// Payback window in contract years (inclusive on both ends)
    pub payback_window_start_year: f64,
    pub payback_window_end_year: f64,

    /// Gain multiplier for exits before the window
    pub timing_factor_early: f64,

    /// Gain multiplier for exits after the window
    pub timing_factor_late: f64,

    /// Minimum settlement as a multiple of invested capital
    pub floor_multiple: f64,

    /// Maximum settlement as a multiple of invested capital
    pub ceiling_multiple: f64,

    pub downside_mode: DownsideMode,

    /// Contract term in years
    #[serde(default)]
    pub contract_maturity_years: Option<f64>,

    /// Year at which the homeowner liquidity trigger fires
    #[serde(default)]
    pub liquidity_trigger_year: Option<f64>,

    /// Minimum holding period in years
    #[serde(default)]
    pub minimum_hold_years: Option<f64>,

    /// Duration yield floor
    #[serde(default)]
    pub duration_yield_floor_enabled: bool,
    #[serde(default)]
    pub duration_yield_floor_start_year: Option<f64>,
    #[serde(default)]
    pub duration_yield_floor_min_multiple: Option<f64>,
}

/// Active duration yield floor parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationYieldFloor {
    pub start_year: f64,
    pub min_multiple: f64,
}

impl DealTerms {
    /// Reference deal used by the pricing team's default scenario
    pub fn reference_deal() -> Self {
        Self {
            property_value: 600_000.0,
            upfront_payment: 60_000.0,
            monthly_payment: 2_000.0,
            number_of_payments: 72,
            payback_window_start_year: 4.0,
            payback_window_end_year: 8.0,
            timing_factor_early: 0.9,
            timing_factor_late: 1.2,
            floor_multiple: 1.03,
            ceiling_multiple: 3.25,
            downside_mode: DownsideMode::HardFloor,
            contract_maturity_years: Some(30.0),
            liquidity_trigger_year: Some(13.0),
            minimum_hold_years: Some(2.0),
            duration_yield_floor_enabled: false,
            duration_yield_floor_start_year: None,
            duration_yield_floor_min_multiple: None,
        }
    }

    /// DYF parameters when the floor is enabled and fully specified
    pub fn duration_yield_floor(&self) -> Option<DurationYieldFloor> {
        if !self.duration_yield_floor_enabled {
            return None;
        }
        match (
            self.duration_yield_floor_start_year,
            self.duration_yield_floor_min_multiple,
        ) {
            (Some(start_year), Some(min_multiple)) => Some(DurationYieldFloor { start_year, min_multiple }),
            _ => None,
        }
    }

    /// Gain multiplier for an exit at the given year
    pub fn timing_factor(&self, exit_year: f64) -> f64 {
        if exit_year < self.payback_window_start_year {
            self.timing_factor_early
        } else if exit_year > self.payback_window_end_year {
            self.timing_factor_late
        } else {
            1.0
        }
    }

    /// Check the terms for values that would make the valuation degenerate
    pub fn validate(&self) -> ValuationResult<()> {
        if !self.property_value.is_finite() || self.property_value <= 0.0 {
            return Err(ValuationError::terms(
                "property_value",
                format!("must be finite and positive, got {}", self.property_value),
            ));
        }

        for (field, value) in [
            ("upfront_payment", self.upfront_payment),
            ("monthly_payment", self.monthly_payment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValuationError::terms(
                    field,
                    format!("must be finite and non-negative, got {}", value),
                ));
            }
        }

        for (field, value) in [
            ("timing_factor_early", self.timing_factor_early),
            ("timing_factor_late", self.timing_factor_late),
            ("floor_multiple", self.floor_multiple),
            ("ceiling_multiple", self.ceiling_multiple),
            ("payback_window_start_year", self.payback_window_start_year),
            ("payback_window_end_year", self.payback_window_end_year),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValuationError::terms(
                    field,
                    format!("must be finite and non-negative, got {}", value),
                ));
            }
        }

        if self.floor_multiple > self.ceiling_multiple {
            return Err(ValuationError::terms(
                "floor_multiple",
                format!(
                    "floor {} exceeds ceiling {}",
                    self.floor_multiple, self.ceiling_multiple
                ),
            ));
        }

        if self.payback_window_start_year > self.payback_window_end_year {
            return Err(ValuationError::terms(
                "payback_window_start_year",
                format!(
                    "window start {} is after window end {}",
                    self.payback_window_start_year, self.payback_window_end_year
                ),
            ));
        }

        if let Some(dyf) = self.duration_yield_floor() {
            if !dyf.min_multiple.is_finite() || dyf.min_multiple < 0.0 {
                return Err(ValuationError::terms(
                    "duration_yield_floor_min_multiple",
                    format!("must be finite and non-negative, got {}", dyf.min_multiple),
                ));
            }
            if !dyf.start_year.is_finite() {
                return Err(ValuationError::terms(
                    "duration_yield_floor_start_year",
                    format!("must be finite, got {}", dyf.start_year),
                ));
            }
        }

        Ok(())
    }
}

/// Non-blocking notes about where an exit falls relative to the contract horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitAdvisory {
    /// Exit happens before the minimum holding period ends
    BeforeMinimumHold { exit_year: f64, minimum_hold_years: f64 },
    /// Exit happens after the contract has matured
    AfterContractMaturity { exit_year: f64, contract_maturity_years: f64 },
    /// Exit happens at or after the liquidity trigger
    PastLiquidityTrigger { exit_year: f64, liquidity_trigger_year: f64 },
}

/// Horizon advisories for an exit; never affects the numbers
pub fn exit_advisories(terms: &DealTerms, assumptions: &ScenarioAssumptions) -> Vec<ExitAdvisory> {
    let exit_year = assumptions.exit_year;
    let mut advisories = Vec::new();

    if let Some(minimum_hold_years) = terms.minimum_hold_years {
        if exit_year < minimum_hold_years {
            advisories.push(ExitAdvisory::BeforeMinimumHold { exit_year, minimum_hold_years });
        }
    }
    if let Some(contract_maturity_years) = terms.contract_maturity_years {
        if exit_year > contract_maturity_years {
            advisories.push(ExitAdvisory::AfterContractMaturity { exit_year, contract_maturity_years });
        }
    }
    if let Some(liquidity_trigger_year) = terms.liquidity_trigger_year {
        if exit_year >= liquidity_trigger_year {
            advisories.push(ExitAdvisory::PastLiquidityTrigger { exit_year, liquidity_trigger_year });
        }
    }

    advisories
}
