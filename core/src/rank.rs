use std::cmp::Ordering;
use std::collections::HashSet;

use crate::document::{Indexable, IndexedDocument};
use crate::index::Index;
use crate::DocId;

/// A candidate document with its relevance score.
#[derive(Debug)]
pub struct Ranked<'a, D> {
    pub doc: &'a IndexedDocument<D>,
    pub score: f64,
}

impl<D> Index<D> {
    /// `log10(N / df)`, or 0 for a term no document contains.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.document_frequency(term);
        if df == 0 {
            return 0.0;
        }
        (self.document_count() as f64 / df as f64).log10()
    }
}

impl<D: Indexable> Index<D> {
    /// Scores each candidate by the sum of `tf * idf` over `tokens` (repeats count again)
    /// and orders by score descending, then by ascending ID.
    pub fn rank<'a>(&'a self, tokens: &[String], candidates: &HashSet<DocId>) -> Vec<Ranked<'a, D>> {
        let idfs: Vec<(&str, f64)> = tokens.iter().map(|t| (t.as_str(), self.idf(t))).collect();
        let mut ranked: Vec<Ranked<'a, D>> = candidates
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|doc| {
                let score = idfs
                    .iter()
                    .map(|&(term, idf)| doc.term_frequency(term) as f64 * idf)
                    .sum();
                Ranked { doc, score }
            })
            .collect();
        ranked.sort_by(by_score_then_id);
        ranked
    }
}

fn by_score_then_id<D: Indexable>(a: &Ranked<'_, D>, b: &Ranked<'_, D>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.doc.id().cmp(&b.doc.id()))
}
