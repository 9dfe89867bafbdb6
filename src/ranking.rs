//! Candidate ranking by total score.

use std::cmp::Ordering;

use serde::Serialize;

use crate::advice::GapResult;
use crate::scoring::ScoreResult;

/// A scored resume awaiting ranking.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub score: ScoreResult,
    pub gaps: GapResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    /// 1-based position
    pub rank: usize,
    pub name: String,
    #[serde(flatten)]
    pub score: ScoreResult,
    #[serde(flatten)]
    pub gaps: GapResult,
}

/// Descending order on totals with NaN below every number.
fn by_total_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Sort by total score descending. Ties keep input order (stable sort).
/// Non-finite weights can yield NaN totals; those rank last.
pub fn rank(candidates: Vec<Candidate>) -> Vec<RankedCandidate> {
    let mut candidates = candidates;
    candidates.sort_by(|a, b| by_total_desc(a.score.total_score, b.score.total_score));

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| RankedCandidate {
            rank: i + 1,
            name: c.name,
            score: c.score,
            gaps: c.gaps,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, total: f32) -> Candidate {
        Candidate {
            name: name.to_string(),
            score: ScoreResult {
                must_coverage: 0.0,
                nice_coverage: 0.0,
                embedding_sim: 0.0,
                tfidf_sim: 0.0,
                semantic_sim: 0.0,
                total_score: total,
                lexical_only: false,
            },
            gaps: GapResult::default(),
        }
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(vec![
            candidate("a.pdf", 0.82),
            candidate("b.pdf", 0.55),
            candidate("c.pdf", 0.91),
        ]);

        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c.pdf", "a.pdf", "b.pdf"]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(vec![
            candidate("first", 0.5),
            candidate("top", 0.9),
            candidate("second", 0.5),
            candidate("third", 0.5),
        ]);

        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_nan_totals_rank_last() {
        let candidates: Vec<Candidate> = (0..64)
            .map(|i| {
                let total = if i % 3 == 0 { f32::NAN } else { i as f32 / 64.0 };
                candidate(&format!("r{i}"), total)
            })
            .collect();

        let ranked = rank(candidates);
        assert_eq!(ranked.len(), 64);

        let finite: Vec<f32> = ranked
            .iter()
            .map(|r| r.score.total_score)
            .take_while(|t| !t.is_nan())
            .collect();
        assert_eq!(finite.len(), 42);
        assert!(finite.windows(2).all(|w| w[0] > w[1]));

        let nan_names: Vec<&str> = ranked[42..].iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<String> = (0..64).filter(|i| i % 3 == 0).map(|i| format!("r{i}")).collect();
        assert_eq!(nan_names, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(ranked[42..].iter().all(|r| r.score.total_score.is_nan()));
    }

    #[test]
    fn test_empty() {
        assert!(rank(vec![]).is_empty());
    }
}
