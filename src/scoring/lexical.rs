//! Lexical (TF-IDF) similarity between a resume and a job description.
//!
//! The corpus is exactly the two documents being compared. Terms are
//! lower-cased runs of two or more word characters, English stop words are
//! dropped, and the vocabulary is capped to the most frequent terms.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// TF-IDF scorer over a two-document corpus.
#[derive(Debug, Clone, Copy)]
pub struct LexicalScorer {
    max_features: usize,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl LexicalScorer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
        }
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Cosine similarity of the TF-IDF vectors of `resume_text` and `job_text`.
    ///
    /// Returns 0.0 when either vector is all zeros.
    pub fn similarity(&self, resume_text: &str, job_text: &str) -> f32 {
        let job_tf = term_frequencies(job_text);
        let resume_tf = term_frequencies(resume_text);

        let vocabulary = self.vocabulary(&job_tf, &resume_tf);
        if vocabulary.is_empty() {
            return 0.0;
        }

        let job_vec = weigh(&vocabulary, &job_tf, &resume_tf, Side::Left);
        let resume_vec = weigh(&vocabulary, &job_tf, &resume_tf, Side::Right);

        cosine(&job_vec, &resume_vec)
    }

    /// Top `max_features` terms by corpus frequency, ties broken alphabetically.
    /// Returned in alphabetical order.
    fn vocabulary<'a>(
        &self,
        a: &'a BTreeMap<String, u32>,
        b: &'a BTreeMap<String, u32>,
    ) -> Vec<&'a str> {
        let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
        for (term, n) in a.iter().chain(b.iter()) {
            *totals.entry(term.as_str()).or_default() += n;
        }

        let mut terms: Vec<(&str, u32)> = totals.into_iter().collect();
        if terms.len() > self.max_features {
            terms.sort_by(|x, y| y.1.cmp(&x.1).then_with(|| x.0.cmp(y.0)));
            terms.truncate(self.max_features);
        }

        let mut vocabulary: Vec<&str> = terms.into_iter().map(|(t, _)| t).collect();
        vocabulary.sort_unstable();
        vocabulary
    }
}

/// TF-IDF similarity with the default vocabulary cap.
pub fn lexical_similarity(resume_text: &str, job_text: &str) -> f32 {
    LexicalScorer::default().similarity(resume_text, job_text)
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
}

fn term_frequencies(text: &str) -> BTreeMap<String, u32> {
    let mut tf = BTreeMap::new();
    for token in tokenize(text) {
        *tf.entry(token).or_insert(0) += 1;
    }
    tf
}

/// Raw tf times smoothed idf: ln((1 + n) / (1 + df)) + 1 with n = 2.
fn weigh(
    vocabulary: &[&str],
    left: &BTreeMap<String, u32>,
    right: &BTreeMap<String, u32>,
    side: Side,
) -> Vec<f64> {
    const N_DOCS: f64 = 2.0;

    vocabulary
        .iter()
        .map(|term| {
            let l = left.get(*term).copied().unwrap_or(0);
            let r = right.get(*term).copied().unwrap_or(0);
            let df = (l > 0) as u32 + (r > 0) as u32;
            let idf = ((1.0 + N_DOCS) / (1.0 + df as f64)).ln() + 1.0;
            let tf = match side {
                Side::Left => l,
                Side::Right => r,
            };
            tf as f64 * idf
        })
        .collect()
}

fn cosine(a: &[f64], b: &[f64]) -> f32 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;

    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0) as f32
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];
