//! Update decision logic
//!
//! Selects which direct dependencies get upgraded.

mod candidates;

pub use candidates::{select_candidates, CandidateSet};
