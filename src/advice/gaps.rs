use serde::{Deserialize, Serialize};

use crate::scoring::KeywordSet;

/// Keywords with no whole-word match in the resume, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapResult {
    #[serde(default)]
    pub missing_must: Vec<String>,
    #[serde(default)]
    pub missing_nice: Vec<String>,
}

impl GapResult {
    pub fn is_empty(&self) -> bool {
        self.missing_must.is_empty() && self.missing_nice.is_empty()
    }
}

/// Gap analysis with the same matching rule as keyword coverage.
pub fn gaps<S: AsRef<str>>(resume_text: &str, must_have: &[S], nice_to_have: &[S]) -> GapResult {
    gaps_with(
        resume_text,
        &KeywordSet::new(must_have),
        &KeywordSet::new(nice_to_have),
    )
}

/// Like [`gaps`], reusing already compiled keyword sets.
pub fn gaps_with(resume_text: &str, must: &KeywordSet, nice: &KeywordSet) -> GapResult {
    GapResult {
        missing_must: must.missing(resume_text),
        missing_nice: nice.missing(resume_text),
    }
}
