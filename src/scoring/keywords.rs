//! Whole-word keyword matching against resume text.
//!
//! A keyword matches when it occurs case-insensitively and the characters
//! immediately around the occurrence are not word characters. Keywords are
//! taken literally; multi-word phrases tolerate any run of whitespace between
//! their words.

use regex::{Regex, RegexBuilder};

/// A single compiled keyword.
#[derive(Debug, Clone)]
pub struct Keyword {
    /// Keyword as supplied by the caller
    pub text: String,
    /// None for blank keywords, which never match
    pattern: Option<Regex>,
}

impl Keyword {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pattern: compile(text),
        }
    }

    /// True if the keyword occurs at least once as a whole word.
    pub fn is_present(&self, text: &str) -> bool {
        self.occurrences(text).next().is_some()
    }

    /// Number of non-overlapping whole-word occurrences.
    pub fn count(&self, text: &str) -> usize {
        self.occurrences(text).count()
    }

    fn occurrences<'t>(&'t self, text: &'t str) -> Occurrences<'t> {
        Occurrences {
            pattern: self.pattern.as_ref(),
            text,
            pos: 0,
        }
    }
}

/// A keyword list compiled once, reusable across many resumes.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| Keyword::new(k.as_ref())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    /// Fraction of keywords found at least once.
    ///
    /// The denominator is floored at 1, so an empty list has coverage 0.0.
    pub fn coverage(&self, text: &str) -> f32 {
        let hits = self.keywords.iter().filter(|k| k.is_present(text)).count();
        hits as f32 / self.keywords.len().max(1) as f32
    }

    /// Total occurrences across all keywords, not deduplicated.
    pub fn count(&self, text: &str) -> usize {
        self.keywords.iter().map(|k| k.count(text)).sum()
    }

    /// Keywords with no whole-word occurrence, in input order.
    pub fn missing(&self, text: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| !k.is_present(text))
            .map(|k| k.text.clone())
            .collect()
    }
}

/// Coverage of `keywords` in `text`. See [`KeywordSet::coverage`].
pub fn coverage<S: AsRef<str>>(text: &str, keywords: &[S]) -> f32 {
    KeywordSet::new(keywords).coverage(text)
}

/// Total whole-word occurrences of `keywords` in `text`.
pub fn count<S: AsRef<str>>(text: &str, keywords: &[S]) -> usize {
    KeywordSet::new(keywords).count(text)
}

fn compile(keyword: &str) -> Option<Regex> {
    let words: Vec<String> = keyword.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }

    // Escaped input always compiles; a failure here would be a regex size limit.
    match RegexBuilder::new(&words.join(r"\s+"))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("keyword {keyword:?} could not be compiled: {e}");
            None
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Iterator over boundary-respecting matches.
///
/// A candidate rejected for its boundaries does not consume the text after
/// it, so an overlapping valid occurrence is still found.
struct Occurrences<'t> {
    pattern: Option<&'t Regex>,
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for Occurrences<'t> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let pattern = self.pattern?;

        while self.pos <= self.text.len() {
            let m = pattern.find_at(self.text, self.pos)?;
            let (start, end) = (m.start(), m.end());

            let before_ok = self.text[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !is_word_char(c));
            let after_ok = self.text[end..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));

            if before_ok && after_ok && end > start {
                self.pos = end;
                return Some((start, end));
            }

            // step one char past the rejected start
            self.pos = start
                + self.text[start..]
                    .chars()
                    .next()
                    .map_or(1, |c| c.len_utf8());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_only() {
        assert_eq!(coverage("Experienced in Java.", &["java"]), 1.0);
        assert_eq!(coverage("JavaScript only", &["java"]), 0.0);
        assert_eq!(coverage("sqlite user", &["sql"]), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(coverage("PYTHON and Sql", &["python", "SQL"]), 1.0);
    }

    #[test]
    fn test_empty_list_has_zero_coverage() {
        let empty: [&str; 0] = [];
        assert_eq!(coverage("anything at all", &empty), 0.0);
        assert_eq!(coverage("", &empty), 0.0);
    }

    #[test]
    fn test_partial_coverage() {
        let cov = coverage("python and docker", &["python", "sql", "docker", "aws"]);
        assert!((cov - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_duplicates_count_in_denominator() {
        let cov = coverage("python", &["python", "python", "rust"]);
        assert!((cov - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert_eq!(coverage("I write C++ daily", &["c++"]), 1.0);
        assert_eq!(coverage("I write C daily", &["c++"]), 0.0);
        assert_eq!(coverage("built on .NET core", &[".net"]), 1.0);
        assert_eq!(coverage("a.b.c", &["a*"]), 0.0);
    }

    #[test]
    fn test_multi_word_phrase() {
        assert_eq!(coverage("Applied machine learning at scale", &["machine learning"]), 1.0);
        assert_eq!(coverage("machine\n  learning", &["machine learning"]), 1.0);
        assert_eq!(coverage("machine vision and deep learning", &["machine learning"]), 0.0);
    }

    #[test]
    fn test_blank_keyword_never_matches() {
        assert_eq!(coverage("some text", &["", "   "]), 0.0);
        assert_eq!(count("some text", &[""]), 0);
    }

    #[test]
    fn test_count_not_deduplicated() {
        let text = "SQL, more sql, and Python. sql!";
        assert_eq!(count(text, &["sql"]), 3);
        assert_eq!(count(text, &["sql", "python"]), 4);
        assert_eq!(count(text, &["sql", "sql"]), 6);
    }

    #[test]
    fn test_rejected_candidate_does_not_hide_later_match() {
        // first "go" is inside "going"; the standalone one must still count
        assert_eq!(count("going to go", &["go"]), 1);
        assert_eq!(count("aa aa", &["aa"]), 2);
    }

    #[test]
    fn test_unicode_boundaries() {
        assert_eq!(coverage("café owner", &["café"]), 1.0);
        assert_eq!(coverage("cafés", &["café"]), 0.0);
    }

    #[test]
    fn test_missing_preserves_order() {
        let set = KeywordSet::new(&["aws", "python", "kubernetes"]);
        assert_eq!(set.missing("python developer"), vec!["aws", "kubernetes"]);
    }
}
