use quarry_core::{Analyzer, NoStem};
use std::sync::Arc;

#[test]
fn it_normalizes_and_stems() {
    let words = Analyzer::english().analyze("Running Runners RUN! The chess-club's menu.");
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"chessclub".to_string()));
    assert!(!words.iter().any(|w| w.chars().any(|c| c.is_ascii_punctuation())));
}

#[test]
fn it_filters_stopwords() {
    let words = Analyzer::english().analyze("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words.len(), 5);
}

#[test]
fn plural_and_article_reduce_to_same_stem() {
    let a = Analyzer::english();
    let breweries = a.analyze("The Breweries");
    assert_eq!(breweries.len(), 1);
    assert_eq!(breweries, a.analyze("brewery"));
}

#[test]
fn order_is_preserved_and_repeats_kept() {
    let a = Analyzer::new(Arc::new(NoStem));
    assert_eq!(a.analyze("beer, London; beer"), vec!["beer", "london", "beer"]);
}

#[test]
fn deterministic_across_instances() {
    let text = "Wikipedia: the free encyclopedia's abstracts, parsed & indexed";
    assert_eq!(Analyzer::english().analyze(text), Analyzer::english().analyze(text));
}

#[test]
fn empty_and_whitespace_text() {
    let a = Analyzer::english();
    assert!(a.analyze("").is_empty());
    assert!(a.analyze(" \t\n ").is_empty());
}
