//! Gap analysis and improvement suggestions.
//!
//! - `gaps`: Which must-have / nice-to-have keywords a resume lacks
//! - `suggestions`: Turns gaps, or a target role, into tip lines
//! - `tables`: Tip and role-keyword tables (YAML data)

mod gaps;
mod suggestions;
mod tables;

pub use gaps::{gaps, gaps_with, GapResult};
pub use suggestions::{suggest_improvements, suggestions_from_gaps, Suggestions};
pub use tables::{AdviceError, AdviceTables, Tip};
