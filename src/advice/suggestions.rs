//! Rule-based improvement suggestions.
//!
//! When nothing is missing the tip list still holds exactly one encouragement
//! line; `all_clear` tells that case apart from a single genuine suggestion.

use serde::{Deserialize, Serialize};

use crate::advice::gaps::GapResult;
use crate::advice::tables::{AdviceTables, Tip};
use crate::scoring::KeywordSet;

const ALL_CLEAR_TIP: &str =
    "Strong coverage already. Consider tightening bullets, quantifying impact, and linking to work.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub lines: Vec<String>,
    /// True when no gaps were found and `lines` holds only the fallback message
    pub all_clear: bool,
}

impl Suggestions {
    fn from_lines(lines: Vec<String>, fallback: impl FnOnce() -> String) -> Self {
        if lines.is_empty() {
            Self {
                lines: vec![fallback()],
                all_clear: true,
            }
        } else {
            Self {
                lines,
                all_clear: false,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Tips for every gap, must-have first, using the built-in tables.
pub fn suggestions_from_gaps(gaps: &GapResult) -> Suggestions {
    AdviceTables::builtin().suggestions_from_gaps(gaps)
}

/// Role-based tips using the built-in tables.
pub fn suggest_improvements(resume_text: &str, target_role: &str) -> Suggestions {
    AdviceTables::builtin().suggest_improvements(resume_text, target_role)
}

impl AdviceTables {
    pub fn suggestions_from_gaps(&self, gaps: &GapResult) -> Suggestions {
        let lines = gaps
            .missing_must
            .iter()
            .chain(&gaps.missing_nice)
            .map(|keyword| {
                let tip = match self.tip(keyword) {
                    Tip::Canned(tip) => tip.to_string(),
                    Tip::Generic => format!(
                        "Add concrete evidence of {keyword} (projects, metrics, or links)."
                    ),
                };
                format!("{}: {tip}", title_case(keyword))
            })
            .collect();

        Suggestions::from_lines(lines, || ALL_CLEAR_TIP.to_string())
    }

    /// Suggest expected keywords of `target_role` that the resume lacks.
    ///
    /// Uses the same whole-word rule as gap analysis. Unknown roles get the
    /// fallback message.
    pub fn suggest_improvements(&self, resume_text: &str, target_role: &str) -> Suggestions {
        let lines = match self.role_keywords(target_role) {
            Some(expected) => KeywordSet::new(expected)
                .missing(resume_text)
                .into_iter()
                .map(|keyword| {
                    format!(
                        "Consider adding experience with {keyword} to strengthen your {target_role} resume."
                    )
                })
                .collect(),
            None => {
                log::debug!("no keyword table for role {target_role:?}");
                Vec::new()
            }
        };

        Suggestions::from_lines(lines, || {
            format!("Your resume already looks good for a {target_role} role.")
        })
    }
}

/// Upper-case letters that follow a non-letter, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
