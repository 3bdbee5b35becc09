use proptest::prelude::*;
use quarry_core::{Abstract, Analyzer, Index, IndexBuilder, SearchMode};
use std::collections::HashSet;

const WORDS: &[&str] = &[
    "chess", "Chess!", "clubs", "club", "bread", "baking", "the", "and", "of",
    "breweries", "brewery", "london", "beer", "...", "I", "girl", "hello", "memes",
];

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..8).prop_map(|w| w.join(" "))
}

fn corpus() -> impl Strategy<Value = Vec<Abstract>> {
    prop::collection::vec(text(), 1..12).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, fulltext)| Abstract { id: i as u32 + 1, fulltext, filename: format!("{}.png", i + 1), url: None })
            .collect()
    })
}

proptest! {
    #[test]
    fn postings_match_analyzed_text(docs in corpus()) {
        let analyzer = Analyzer::english();
        let index = Index::build(analyzer.clone(), docs.clone());
        let vocab: HashSet<String> = WORDS.iter().flat_map(|w| analyzer.analyze(w)).collect();
        for doc in &docs {
            let tokens: HashSet<String> = analyzer.analyze(&doc.fulltext).into_iter().collect();
            for term in &vocab {
                let posted = index.postings(term).is_some_and(|p| p.contains(&doc.id));
                prop_assert_eq!(posted, tokens.contains(term));
            }
        }
    }

    #[test]
    fn indexing_twice_changes_nothing(docs in corpus()) {
        let once = Index::build(Analyzer::english(), docs.clone());
        let mut builder = IndexBuilder::new(Analyzer::english());
        builder.index_documents(docs.clone());
        builder.index_documents(docs.clone());
        let twice = builder.finish();
        prop_assert_eq!(once.document_count(), twice.document_count());
        prop_assert_eq!(once.term_count(), twice.term_count());
        for doc in &docs {
            for term in Analyzer::english().analyze(&doc.fulltext) {
                prop_assert_eq!(once.postings(&term), twice.postings(&term));
                let tf_once = once.document(doc.id).map(|d| d.term_frequency(&term));
                let tf_twice = twice.document(doc.id).map(|d| d.term_frequency(&term));
                prop_assert_eq!(tf_once, tf_twice);
            }
        }
    }

    #[test]
    fn and_results_are_subset_of_or(docs in corpus(), query in text()) {
        let index = Index::build(Analyzer::english(), docs);
        let and = index.evaluate(&query, SearchMode::And).matches().unwrap_or_default();
        let or = index.evaluate(&query, SearchMode::Or).matches().unwrap_or_default();
        prop_assert!(and.is_subset(&or));
    }

    #[test]
    fn ranking_is_ordered_by_score_then_id(docs in corpus(), query in text()) {
        let index = Index::build(Analyzer::english(), docs);
        if let Some(hits) = index.search(&query, SearchMode::Or).matches() {
            for pair in hits.windows(2) {
                prop_assert!(pair[0].score.is_finite());
                prop_assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score && pair[0].doc_id < pair[1].doc_id)
                );
            }
        }
    }
}
