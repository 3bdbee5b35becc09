use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::analyzer::Analyzer;
use crate::document::{DocumentStore, Indexable, IndexedDocument};
use crate::DocId;

/// Called with the running document count every `progress_every` documents.
pub type ProgressHook = Arc<dyn Fn(usize) + Send + Sync>;
/// Called with a stage name and how long it took.
pub type TimingHook = Arc<dyn Fn(&'static str, Duration) + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Report progress every N documents; 0 disables reporting.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}
fn default_progress_every() -> usize { 5000 }

impl Default for BuildOptions {
    fn default() -> Self { Self { progress_every: default_progress_every() } }
}

/// token -> IDs of every document whose analyzed text contains it.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, HashSet<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    fn add<'a>(&mut self, doc_id: DocId, terms: impl Iterator<Item = &'a str>) {
        for term in terms {
            match self.postings.get_mut(term) {
                Some(set) => { set.insert(doc_id); }
                None => { self.postings.insert(term.to_string(), HashSet::from([doc_id])); }
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&HashSet<DocId>> { self.postings.get(term) }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, HashSet::len)
    }

    pub fn term_count(&self) -> usize { self.postings.len() }
}

/// An index still accepting documents. Call [`IndexBuilder::finish`] to start serving queries.
pub struct IndexBuilder<D> {
    analyzer: Analyzer,
    store: DocumentStore<D>,
    postings: InvertedIndex,
    options: BuildOptions,
    progress: Option<ProgressHook>,
    timing: Option<TimingHook>,
}

impl<D: Indexable> IndexBuilder<D> {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            store: DocumentStore::new(),
            postings: InvertedIndex::new(),
            options: BuildOptions::default(),
            progress: None,
            timing: None,
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Receives the running count every `progress_every` documents.
    pub fn with_progress(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(hook));
        self
    }

    /// The hook is carried over to the finished [`Index`] and also times each search.
    pub fn with_timing(mut self, hook: impl Fn(&'static str, Duration) + Send + Sync + 'static) -> Self {
        self.timing = Some(Arc::new(hook));
        self
    }

    /// Analyzes and posts `doc` the first time its ID is seen; later calls with
    /// the same ID change nothing. Returns whether the document was new.
    pub fn index_document(&mut self, doc: D) -> bool {
        let Some(indexed) = self.store.insert(doc, &self.analyzer) else {
            return false;
        };
        self.postings.add(indexed.id(), indexed.terms());
        true
    }

    /// Indexes every document in order and returns how many were processed.
    pub fn index_documents<I>(&mut self, docs: I) -> usize
    where
        I: IntoIterator<Item = D>,
    {
        match self.try_index_documents(docs.into_iter().map(Ok::<D, Infallible>)) {
            Ok(n) => n,
            Err(never) => match never {},
        }
    }

    /// Like [`index_documents`](Self::index_documents) over a fallible stream.
    /// The first error stops ingestion and is returned; documents before it stay indexed.
    pub fn try_index_documents<I, E>(&mut self, docs: I) -> Result<usize, E>
    where
        I: IntoIterator<Item = Result<D, E>>,
    {
        let start = Instant::now();
        let every = self.options.progress_every;
        let mut processed = 0usize;
        for doc in docs {
            self.index_document(doc?);
            processed += 1;
            if every > 0 && processed % every == 0 {
                tracing::debug!(processed, "indexing progress");
                if let Some(hook) = &self.progress {
                    hook(processed);
                }
            }
        }
        if let Some(hook) = &self.timing {
            hook("index_documents", start.elapsed());
        }
        Ok(processed)
    }

    pub fn document_count(&self) -> usize { self.store.len() }

    /// Ends the build phase.
    pub fn finish(self) -> Index<D> {
        tracing::info!(
            num_docs = self.store.len(),
            num_terms = self.postings.term_count(),
            "index build complete"
        );
        Index {
            analyzer: self.analyzer,
            store: self.store,
            postings: self.postings,
            timing: self.timing,
        }
    }
}

impl<D> fmt::Debug for IndexBuilder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("num_docs", &self.store.len())
            .field("num_terms", &self.postings.term_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A fully built, read-only index. Safe to share across threads for concurrent queries.
pub struct Index<D> {
    pub(crate) analyzer: Analyzer,
    pub(crate) store: DocumentStore<D>,
    pub(crate) postings: InvertedIndex,
    pub(crate) timing: Option<TimingHook>,
}

impl<D: Indexable> Index<D> {
    /// Builds an index from a complete corpus in one go.
    pub fn build<I>(analyzer: Analyzer, docs: I) -> Self
    where
        I: IntoIterator<Item = D>,
    {
        let mut builder = IndexBuilder::new(analyzer);
        builder.index_documents(docs);
        builder.finish()
    }
}

impl<D> Index<D> {
    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    pub fn document(&self, id: DocId) -> Option<&IndexedDocument<D>> { self.store.get(id) }

    pub fn document_count(&self) -> usize { self.store.len() }

    pub fn term_count(&self) -> usize { self.postings.term_count() }

    pub fn postings(&self, term: &str) -> Option<&HashSet<DocId>> { self.postings.get(term) }

    pub fn document_frequency(&self, term: &str) -> usize { self.postings.document_frequency(term) }

    pub(crate) fn record_timing(&self, stage: &'static str, elapsed: Duration) {
        if let Some(hook) = &self.timing {
            hook(stage, elapsed);
        }
    }
}

impl<D> fmt::Debug for Index<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("num_docs", &self.store.len())
            .field("num_terms", &self.postings.term_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::NoStem;
    use crate::Abstract;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc(id: DocId, text: &str) -> Abstract {
        Abstract { id, fulltext: text.into(), filename: format!("{id}.jpg"), url: None }
    }

    fn builder() -> IndexBuilder<Abstract> {
        IndexBuilder::new(Analyzer::new(Arc::new(NoStem)))
    }

    #[test]
    fn postings_follow_analyzed_tokens() {
        let mut b = builder();
        b.index_document(doc(1, "chess and chess clubs"));
        b.index_document(doc(2, "chess results"));
        let index = b.finish();
        assert_eq!(index.postings("chess"), Some(&HashSet::from([1, 2])));
        assert_eq!(index.postings("clubs"), Some(&HashSet::from([1])));
        assert!(index.postings("and").is_none());
        assert_eq!(index.document_frequency("results"), 1);
        assert_eq!(index.document_frequency("missing"), 0);
    }

    #[test]
    fn reindexing_same_id_is_noop() {
        let mut b = builder();
        assert!(b.index_document(doc(1, "chess clubs")));
        assert!(!b.index_document(doc(1, "chess clubs")));
        assert!(!b.index_document(doc(1, "bread")));
        let index = b.finish();
        assert_eq!(index.document_count(), 1);
        assert!(index.postings("bread").is_none());
        assert_eq!(index.document(1).map(|d| d.term_frequency("chess")), Some(1));
    }

    #[test]
    fn progress_hook_fires_every_n() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut b = builder()
            .with_options(BuildOptions { progress_every: 2 })
            .with_progress(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        let n = b.index_documents((1..=5).map(|i| doc(i, "word")));
        assert_eq!(n, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stream_error_stops_ingestion() {
        let mut b = builder();
        let stream = vec![Ok(doc(1, "a b")), Err("boom"), Ok(doc(3, "c"))];
        assert_eq!(b.try_index_documents(stream), Err("boom"));
        assert_eq!(b.document_count(), 1);
    }

    #[test]
    fn timing_hook_sees_build_stage() {
        let stages = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = stages.clone();
        let mut b = builder().with_timing(move |stage, _| sink.lock().push(stage));
        b.index_documents(vec![doc(1, "x")]);
        assert_eq!(stages.lock().as_slice(), ["index_documents"]);
    }
}
