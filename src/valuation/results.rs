//! Valuation output record

use serde::{Deserialize, Serialize};

/// Engine version tag stamped on every result
pub const COMPUTE_VERSION: &str = "10.0.0";

/// Complete outcome of one deal valuation.
///
/// Fully determined by the terms and assumptions it was computed from.
/// Monetary fields are rounded to cents; the IRR is rounded to 4 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealResults {
    /// Upfront plus monthly payments made by exit (IBA)
    pub invested_capital_total: f64,

    /// Investor's vested share of the property (unrounded, not clamped to 1)
    pub vested_equity_percentage: f64,

    /// Property value at exit
    pub projected_fmv: f64,

    /// Projected FMV times vested equity
    pub base_equity_value: f64,

    /// Base equity value less invested capital (may be negative)
    pub gain_above_capital: f64,

    /// Invested capital plus timing-adjusted gain, before floor/ceiling
    pub isa_pre_floor_cap: f64,

    pub floor_amount: f64,
    pub ceiling_amount: f64,

    /// Final settlement paid to the investor
    pub isa_settlement: f64,

    /// Duration yield floor amount (0 when the floor is inactive)
    pub dyf_floor_amount: f64,

    /// Whether the duration yield floor raised the settlement
    pub dyf_applied: bool,

    pub investor_profit: f64,
    pub investor_multiple: f64,

    /// Annualized IRR (0 when no root exists)
    pub investor_irr_annual: f64,

    pub compute_version: String,
}

impl DealResults {
    /// Numeric fields by name, in output order
    pub fn numeric_fields(&self) -> [(&'static str, f64); 13] {
        [
            ("invested_capital_total", self.invested_capital_total),
            ("vested_equity_percentage", self.vested_equity_percentage),
            ("projected_fmv", self.projected_fmv),
            ("base_equity_value", self.base_equity_value),
            ("gain_above_capital", self.gain_above_capital),
            ("isa_pre_floor_cap", self.isa_pre_floor_cap),
            ("floor_amount", self.floor_amount),
            ("ceiling_amount", self.ceiling_amount),
            ("isa_settlement", self.isa_settlement),
            ("dyf_floor_amount", self.dyf_floor_amount),
            ("investor_profit", self.investor_profit),
            ("investor_multiple", self.investor_multiple),
            ("investor_irr_annual", self.investor_irr_annual),
        ]
    }

    /// First NaN or infinite field, if any
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        self.numeric_fields()
            .into_iter()
            .find(|(_, value)| !value.is_finite())
    }
}
