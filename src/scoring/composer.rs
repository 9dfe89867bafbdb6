//! Composite relevance scoring.
//!
//! `semantic = 0.5 * embedding + 0.5 * tfidf` is fixed; only the outer blend
//! between the semantic signal and keyword coverage is caller-controlled:
//!
//!   total = w.embeddings * semantic + w.keyword_must * must + w.keyword_nice * nice

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scoring::embeddings::{dot, EmbeddingBackend, EmbeddingError};
use crate::scoring::keywords::KeywordSet;
use crate::scoring::lexical::LexicalScorer;
use crate::scoring::weights::WeightSet;

/// Share of the embedding signal inside the semantic blend.
pub const EMBEDDING_BLEND: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("embedding backend unavailable: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Every intermediate signal plus the weighted total for one (resume, job) pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub must_coverage: f32,
    pub nice_coverage: f32,
    pub embedding_sim: f32,
    pub tfidf_sim: f32,
    pub semantic_sim: f32,
    pub total_score: f32,
    /// Set when the embedding backend was unavailable and the semantic
    /// signal is TF-IDF alone
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub lexical_only: bool,
}

impl ScoreResult {
    /// Blend the three raw signals under `weights`.
    pub fn compose(
        must_coverage: f32,
        nice_coverage: f32,
        embedding_sim: f32,
        tfidf_sim: f32,
        weights: &WeightSet,
    ) -> Self {
        let semantic_sim = EMBEDDING_BLEND * embedding_sim + (1.0 - EMBEDDING_BLEND) * tfidf_sim;
        let total_score = weights.embeddings * semantic_sim
            + weights.keyword_must * must_coverage
            + weights.keyword_nice * nice_coverage;

        Self {
            must_coverage,
            nice_coverage,
            embedding_sim,
            tfidf_sim,
            semantic_sim,
            total_score,
            lexical_only: false,
        }
    }

    /// Lexical-only variant: the semantic signal is the TF-IDF similarity.
    fn compose_lexical(
        must_coverage: f32,
        nice_coverage: f32,
        tfidf_sim: f32,
        weights: &WeightSet,
    ) -> Self {
        let total_score = weights.embeddings * tfidf_sim
            + weights.keyword_must * must_coverage
            + weights.keyword_nice * nice_coverage;

        Self {
            must_coverage,
            nice_coverage,
            embedding_sim: 0.0,
            tfidf_sim,
            semantic_sim: tfidf_sim,
            total_score,
            lexical_only: true,
        }
    }
}

/// Scores resumes against a job description.
///
/// Holds the injected embedding backend; everything else is stateless.
pub struct ScoreComposer {
    backend: Arc<dyn EmbeddingBackend>,
    lexical: LexicalScorer,
    lexical_fallback: bool,
}

impl ScoreComposer {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            lexical: LexicalScorer::default(),
            lexical_fallback: false,
        }
    }

    pub fn with_lexical(mut self, lexical: LexicalScorer) -> Self {
        self.lexical = lexical;
        self
    }

    /// Degrade to lexical-only scoring instead of failing when the backend errors.
    pub fn with_lexical_fallback(mut self, enabled: bool) -> Self {
        self.lexical_fallback = enabled;
        self
    }

    /// Dot product of the two texts' unit embeddings.
    pub fn semantic_similarity(&self, resume_text: &str, job_text: &str) -> Result<f32, ScoringError> {
        let vectors = self
            .backend
            .embed_batch(&[job_text.to_string(), resume_text.to_string()])?;
        match vectors.as_slice() {
            [job, resume] => Ok(dot(resume, job)),
            _ => Err(EmbeddingError::EmbeddingFailed(format!(
                "expected 2 embeddings, got {}",
                vectors.len()
            ))
            .into()),
        }
    }

    pub fn lexical_similarity(&self, resume_text: &str, job_text: &str) -> f32 {
        self.lexical.similarity(resume_text, job_text)
    }

    /// Score one resume.
    pub fn score<S: AsRef<str>>(
        &self,
        resume_text: &str,
        job_text: &str,
        weights: &WeightSet,
        must_have: &[S],
        nice_to_have: &[S],
    ) -> Result<ScoreResult, ScoringError> {
        let mut results = self.score_batch(
            job_text,
            &[resume_text],
            weights,
            must_have,
            nice_to_have,
        )?;
        results.pop().ok_or_else(|| {
            EmbeddingError::EmbeddingFailed("no score produced".to_string()).into()
        })
    }

    /// Score many resumes against one job.
    ///
    /// The job and every resume are embedded in a single backend call; keyword
    /// and TF-IDF scoring run per pair in parallel. Results keep input order.
    pub fn score_batch<S: AsRef<str>, R: AsRef<str> + Sync>(
        &self,
        job_text: &str,
        resumes: &[R],
        weights: &WeightSet,
        must_have: &[S],
        nice_to_have: &[S],
    ) -> Result<Vec<ScoreResult>, ScoringError> {
        if resumes.is_empty() {
            return Ok(vec![]);
        }

        let embedding_sims = match self.embedding_sims(job_text, resumes) {
            Ok(sims) => Some(sims),
            Err(e) if self.lexical_fallback => {
                log::warn!("embedding backend unavailable, scoring lexical-only: {e}");
                None
            }
            Err(e) => return Err(e),
        };

        let must = KeywordSet::new(must_have);
        let nice = KeywordSet::new(nice_to_have);

        let results = resumes
            .par_iter()
            .enumerate()
            .map(|(i, resume)| {
                let resume = resume.as_ref();
                let must_cov = must.coverage(resume);
                let nice_cov = nice.coverage(resume);
                let tfidf = self.lexical.similarity(resume, job_text);

                match &embedding_sims {
                    Some(sims) => ScoreResult::compose(must_cov, nice_cov, sims[i], tfidf, weights),
                    None => ScoreResult::compose_lexical(must_cov, nice_cov, tfidf, weights),
                }
            })
            .collect();

        Ok(results)
    }

    fn embedding_sims<R: AsRef<str>>(
        &self,
        job_text: &str,
        resumes: &[R],
    ) -> Result<Vec<f32>, ScoringError> {
        let mut texts = Vec::with_capacity(resumes.len() + 1);
        texts.push(job_text.to_string());
        texts.extend(resumes.iter().map(|r| r.as_ref().to_string()));

        let vectors = self.backend.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            ))
            .into());
        }

        match vectors.split_first() {
            Some((job, rest)) => Ok(rest.iter().map(|resume| dot(resume, job)).collect()),
            None => Ok(vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::embeddings::DisabledBackend;

    /// Every text maps to the same unit vector.
    struct ConstantBackend;

    impl EmbeddingBackend for ConstantBackend {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> Result<usize, EmbeddingError> {
            Ok(2)
        }
    }

    #[test]
    fn test_compose_formula() {
        let weights = WeightSet {
            keyword_must: 0.5,
            keyword_nice: 0.25,
            embeddings: 1.0,
        };
        let r = ScoreResult::compose(1.0, 0.5, 0.8, 0.4, &weights);

        assert!((r.semantic_sim - 0.6).abs() < 1e-6);
        assert!((r.total_score - (0.6 + 0.5 + 0.125)).abs() < 1e-6);
        assert!(!r.lexical_only);
    }

    #[test]
    fn test_weights_are_not_normalized() {
        let weights = WeightSet {
            keyword_must: 1.0,
            keyword_nice: 1.0,
            embeddings: 1.0,
        };
        let r = ScoreResult::compose(1.0, 1.0, 1.0, 1.0, &weights);
        assert!((r.total_score - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_weights_pass_through() {
        let weights = WeightSet {
            keyword_must: -1.0,
            keyword_nice: 0.0,
            embeddings: 0.0,
        };
        let r = ScoreResult::compose(1.0, 0.0, 0.0, 0.0, &weights);
        assert_eq!(r.total_score, -1.0);
    }

    #[test]
    fn test_backend_failure_propagates_by_default() {
        let composer = ScoreComposer::new(Arc::new(DisabledBackend));
        let result = composer.score("python", "python", &WeightSet::default(), &["python"], &[]);
        assert!(matches!(result, Err(ScoringError::Embedding(EmbeddingError::Disabled))));
    }

    #[test]
    fn test_lexical_fallback() {
        let composer = ScoreComposer::new(Arc::new(DisabledBackend)).with_lexical_fallback(true);
        let r = composer
            .score("python sql", "python sql", &WeightSet::default(), &["python"], &["aws"])
            .unwrap();

        assert!(r.lexical_only);
        assert_eq!(r.embedding_sim, 0.0);
        assert_eq!(r.semantic_sim, r.tfidf_sim);
        assert!(r.tfidf_sim >= 0.99);
        let expected = 0.40 * r.tfidf_sim + 0.45;
        assert!((r.total_score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_batch_matches_single() {
        let composer = ScoreComposer::new(Arc::new(ConstantBackend));
        let job = "python sql statistics";
        let resumes = ["python developer", "sql analyst with statistics", "baker"];
        let must = ["python", "sql"];
        let nice = ["statistics"];
        let weights = WeightSet::default();

        let batch = composer.score_batch(job, &resumes, &weights, &must, &nice).unwrap();
        assert_eq!(batch.len(), 3);

        for (resume, from_batch) in resumes.iter().zip(&batch) {
            let single = composer.score(resume, job, &weights, &must, &nice).unwrap();
            assert_eq!(&single, from_batch);
        }
    }

    #[test]
    fn test_empty_batch() {
        let composer = ScoreComposer::new(Arc::new(DisabledBackend));
        let empty: [&str; 0] = [];
        let results = composer
            .score_batch("job", &empty, &WeightSet::default(), &["a"], &["b"])
            .unwrap();
        assert!(results.is_empty());
    }
}
