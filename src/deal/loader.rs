//! Load deal terms from JSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::DealTerms;
use crate::error::ValuationResult;

/// Default path to the reference deal terms
pub const DEFAULT_TERMS_PATH: &str = "data/reference_deal.json";

/// Load deal terms from a JSON file
pub fn load_terms<P: AsRef<Path>>(path: P) -> ValuationResult<DealTerms> {
    let file = File::open(path)?;
    load_terms_from_reader(BufReader::new(file))
}

/// Load deal terms from any reader (e.g., request body, string buffer)
pub fn load_terms_from_reader<R: Read>(reader: R) -> ValuationResult<DealTerms> {
    let terms: DealTerms = serde_json::from_reader(reader)?;
    log::debug!(
        "loaded terms: property_value={} upfront={} monthly={}x{}",
        terms.property_value,
        terms.upfront_payment,
        terms.monthly_payment,
        terms.number_of_payments
    );
    Ok(terms)
}
