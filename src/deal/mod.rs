//! Deal terms, validation, and loading

mod terms;
pub mod loader;

pub use terms::{DealTerms, DownsideMode, DurationYieldFloor, ExitAdvisory, exit_advisories};
pub use loader::{load_terms, load_terms_from_reader};
