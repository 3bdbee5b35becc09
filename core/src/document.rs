use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analyzer::Analyzer;
use crate::DocId;

/// Anything the index can ingest: a stable ID, text to analyze, and a locator to show.
pub trait Indexable {
    fn id(&self) -> DocId;
    fn fulltext(&self) -> &str;
    fn locator(&self) -> &str;
}

/// One corpus record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abstract {
    pub id: DocId,
    pub fulltext: String,
    pub filename: String,
    pub url: Option<String>,
}

impl Indexable for Abstract {
    fn id(&self) -> DocId { self.id }
    fn fulltext(&self) -> &str { &self.fulltext }
    fn locator(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.filename)
    }
}

/// A record that has been through the analyzer exactly once.
#[derive(Debug, Clone)]
pub struct IndexedDocument<D> {
    doc: D,
    term_frequencies: HashMap<String, u32>,
}

impl<D: Indexable> IndexedDocument<D> {
    pub(crate) fn analyze(doc: D, analyzer: &Analyzer) -> Self {
        let mut term_frequencies = HashMap::new();
        for token in analyzer.analyze(doc.fulltext()) {
            *term_frequencies.entry(token).or_insert(0) += 1;
        }
        Self { doc, term_frequencies }
    }

    pub fn id(&self) -> DocId { self.doc.id() }

    pub fn term_frequency(&self, term: &str) -> u32 {
        self.term_frequencies.get(term).copied().unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.term_frequencies.keys().map(String::as_str)
    }
}

impl<D> IndexedDocument<D> {
    pub fn doc(&self) -> &D { &self.doc }

    pub fn into_inner(self) -> D { self.doc }
}

/// Insert-once map from ID to analyzed document.
#[derive(Debug)]
pub struct DocumentStore<D> {
    docs: HashMap<DocId, IndexedDocument<D>>,
}

impl<D> Default for DocumentStore<D> {
    fn default() -> Self { Self { docs: HashMap::new() } }
}

impl<D: Indexable> DocumentStore<D> {
    pub fn new() -> Self { Self::default() }

    /// Analyzes and stores `doc` unless its ID is already present.
    /// Returns the stored entry when the insert happened.
    pub fn insert(&mut self, doc: D, analyzer: &Analyzer) -> Option<&IndexedDocument<D>> {
        use std::collections::hash_map::Entry;
        match self.docs.entry(doc.id()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => Some(slot.insert(IndexedDocument::analyze(doc, analyzer))),
        }
    }
}

impl<D> DocumentStore<D> {
    pub fn get(&self, id: DocId) -> Option<&IndexedDocument<D>> { self.docs.get(&id) }

    pub fn contains(&self, id: DocId) -> bool { self.docs.contains_key(&id) }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::NoStem;
    use std::sync::Arc;

    fn doc(id: DocId, text: &str) -> Abstract {
        Abstract { id, fulltext: text.into(), filename: format!("{id}.png"), url: None }
    }

    #[test]
    fn locator_prefers_url() {
        let mut d = doc(1, "x");
        assert_eq!(d.locator(), "1.png");
        d.url = Some("https://example.com/1".into());
        assert_eq!(d.locator(), "https://example.com/1");
    }

    #[test]
    fn term_frequencies_count_analyzed_tokens() {
        let analyzer = Analyzer::new(Arc::new(NoStem));
        let indexed = IndexedDocument::analyze(doc(1, "Chess and chess, CLUBS"), &analyzer);
        assert_eq!(indexed.term_frequency("chess"), 2);
        assert_eq!(indexed.term_frequency("clubs"), 1);
        assert_eq!(indexed.term_frequency("and"), 0);
        assert_eq!(indexed.term_frequency("bread"), 0);
    }

    #[test]
    fn second_insert_of_same_id_is_ignored() {
        let analyzer = Analyzer::new(Arc::new(NoStem));
        let mut store = DocumentStore::new();
        assert!(store.insert(doc(7, "first"), &analyzer).is_some());
        assert!(store.insert(doc(7, "second text"), &analyzer).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(7).map(|d| d.doc().fulltext.as_str()), Some("first"));
    }
}
