//! Ranking report export (CSV and JSON).

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ranking::RankedCandidate;

/// One flat row per ranked resume; gap lists are joined with ", ".
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub rank: usize,
    pub filename: String,
    pub total_score: f32,
    pub must_coverage: f32,
    pub nice_coverage: f32,
    pub embedding_sim: f32,
    pub tfidf_sim: f32,
    pub semantic_sim: f32,
    pub missing_must: String,
    pub missing_nice: String,
}

impl From<&RankedCandidate> for ReportRow {
    fn from(c: &RankedCandidate) -> Self {
        Self {
            rank: c.rank,
            filename: c.name.clone(),
            total_score: c.score.total_score,
            must_coverage: c.score.must_coverage,
            nice_coverage: c.score.nice_coverage,
            embedding_sim: c.score.embedding_sim,
            tfidf_sim: c.score.tfidf_sim,
            semantic_sim: c.score.semantic_sim,
            missing_must: c.gaps.missing_must.join(", "),
            missing_nice: c.gaps.missing_nice.join(", "),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub lexical_only: bool,
    pub candidates: &'a [RankedCandidate],
}

pub fn write_csv<W: Write>(writer: W, ranked: &[RankedCandidate]) -> Result<(), csv::Error> {
    let mut wrt = csv::Writer::from_writer(writer);
    for candidate in ranked {
        wrt.serialize(ReportRow::from(candidate))?;
    }
    wrt.flush()?;
    Ok(())
}

pub fn to_json(ranked: &[RankedCandidate]) -> serde_json::Result<String> {
    let report = JsonReport {
        generated_at: Utc::now(),
        lexical_only: ranked.iter().any(|c| c.score.lexical_only),
        candidates: ranked,
    };
    serde_json::to_string_pretty(&report)
}

/// Fixed-width table for terminal output. `label` heads the name column.
pub fn render_table(ranked: &[RankedCandidate], label: &str) -> String {
    let name_width = ranked
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(label.chars().count());

    let mut out = format!(
        "{:>4}  {:<name_width$}  {:>6}  {:>8}  {:>6}  {:>6}  {}\n",
        "#", label, "total", "semantic", "must", "nice", "missing must-have"
    );
    for c in ranked {
        out.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>6.3}  {:>8.3}  {:>6.2}  {:>6.2}  {}\n",
            c.rank,
            c.name,
            c.score.total_score,
            c.score.semantic_sim,
            c.score.must_coverage,
            c.score.nice_coverage,
            c.gaps.missing_must.join(", "),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::GapResult;
    use crate::ranking::{rank, Candidate};
    use crate::scoring::{ScoreResult, WeightSet};

    fn ranked() -> Vec<RankedCandidate> {
        let weights = WeightSet::default();
        rank(vec![
            Candidate {
                name: "low.txt".to_string(),
                score: ScoreResult::compose(0.5, 0.0, 0.2, 0.1, &weights),
                gaps: GapResult {
                    missing_must: vec!["sql".to_string(), "statistics".to_string()],
                    missing_nice: vec!["aws".to_string()],
                },
            },
            Candidate {
                name: "high.pdf".to_string(),
                score: ScoreResult::compose(1.0, 1.0, 0.8, 0.6, &weights),
                gaps: GapResult::default(),
            },
        ])
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &ranked()).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "rank,filename,total_score,must_coverage,nice_coverage,embedding_sim,tfidf_sim,semantic_sim,missing_must,missing_nice"
        );
        assert!(lines[1].starts_with("1,high.pdf,"));
        assert!(lines[2].starts_with("2,low.txt,"));
        assert!(lines[2].ends_with(",\"sql, statistics\",aws"));
    }

    #[test]
    fn test_json_export() {
        let json = to_json(&ranked()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["lexical_only"], false);
        assert_eq!(value["candidates"][0]["name"], "high.pdf");
        assert_eq!(value["candidates"][1]["missing_nice"][0], "aws");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_table_has_row_per_candidate() {
        let table = render_table(&ranked(), "resume");
        assert_eq!(table.lines().count(), 3);
        assert!(table.starts_with("   #  resume"));
        assert!(table.lines().nth(1).unwrap().contains("high.pdf"));
    }
}
