use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
    // Matched after lowercasing, so "I" never fires. Kept as listed.
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the", "be", "to", "of", "and", "a", "in", "that", "have",
            "I", "it", "for", "not", "on", "with", "he", "as", "you",
            "do", "at", "this", "but", "his", "by", "from", "wikipedia",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Reduces a lowercased, punctuation-free word to its stem.
///
/// Implementations must be deterministic: the same input always yields the same stem.
pub trait Stem: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

impl Stem for Stemmer {
    fn stem(&self, word: &str) -> String {
        Stemmer::stem(self, word).into_owned()
    }
}

/// Leaves every word untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStem;

impl Stem for NoStem {
    fn stem(&self, word: &str) -> String { word.to_string() }
}

/// Text normalization pipeline shared by documents and queries.
///
/// Whitespace split, lowercase, strip ASCII punctuation, drop stopwords,
/// stem, drop empties. Stopwords are matched before stemming.
#[derive(Clone)]
pub struct Analyzer {
    stemmer: Arc<dyn Stem>,
}

impl Analyzer {
    pub fn new(stemmer: Arc<dyn Stem>) -> Self {
        Self { stemmer }
    }

    /// Snowball English stemming.
    pub fn english() -> Self {
        Self::new(Arc::new(Stemmer::create(Algorithm::English)))
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(str::to_lowercase)
            .map(|token| PUNCTUATION.replace_all(&token, "").into_owned())
            .filter(|token| !is_stopword(token))
            .map(|token| self.stemmer.stem(&token))
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self { Self::english() }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_inside_tokens() {
        let a = Analyzer::new(Arc::new(NoStem));
        assert_eq!(a.analyze("Don't stop-believing!"), vec!["dont", "stopbelieving"]);
    }

    #[test]
    fn stopwords_removed_after_lowercasing() {
        let a = Analyzer::new(Arc::new(NoStem));
        assert_eq!(a.analyze("The Wikipedia article, AND its history"), vec!["article", "its", "history"]);
    }

    #[test]
    fn stopword_with_punctuation_is_removed() {
        let a = Analyzer::new(Arc::new(NoStem));
        assert!(a.analyze("(the) \"of\" and,").is_empty());
    }

    #[test]
    fn pure_punctuation_is_dropped() {
        let a = Analyzer::english();
        assert!(a.analyze("... !!! --").is_empty());
    }

    #[test]
    fn uppercase_i_entry_does_not_match_lowercased_token() {
        let a = Analyzer::new(Arc::new(NoStem));
        assert_eq!(a.analyze("I"), vec!["i"]);
    }
}
