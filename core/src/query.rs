use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::document::Indexable;
use crate::index::Index;
use crate::DocId;

/// How per-term postings are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Every query term must occur.
    #[default]
    #[serde(rename = "AND")]
    And,
    /// At least one query term must occur.
    #[serde(rename = "OR")]
    Or,
}

impl FromStr for SearchMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(SearchMode::And),
            "OR" => Ok(SearchMode::Or),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMode::And => "AND",
            SearchMode::Or => "OR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized search mode {0:?}, expected AND or OR")]
pub struct UnknownMode(pub String);

/// Result of a query. `EmptyQuery` means nothing was asked, as opposed to nothing found.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    EmptyQuery,
    Matches(T),
}

impl<T> SearchOutcome<T> {
    pub fn is_empty_query(&self) -> bool { matches!(self, SearchOutcome::EmptyQuery) }

    pub fn matches(self) -> Option<T> {
        match self {
            SearchOutcome::EmptyQuery => None,
            SearchOutcome::Matches(t) => Some(t),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SearchOutcome<U> {
        match self {
            SearchOutcome::EmptyQuery => SearchOutcome::EmptyQuery,
            SearchOutcome::Matches(t) => SearchOutcome::Matches(f(t)),
        }
    }
}

/// One ranked match, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub locator: String,
    pub score: f64,
}

impl<D: Indexable> Index<D> {
    /// Boolean retrieval: the IDs of documents matching `query` under `mode`.
    ///
    /// A query whose analysis yields no tokens matches nothing under either mode.
    pub fn evaluate(&self, query: &str, mode: SearchMode) -> SearchOutcome<HashSet<DocId>> {
        if query.is_empty() {
            return SearchOutcome::EmptyQuery;
        }
        let tokens = self.analyzer.analyze(query);
        SearchOutcome::Matches(self.combine(&tokens, mode))
    }

    fn combine(&self, tokens: &[String], mode: SearchMode) -> HashSet<DocId> {
        let empty = HashSet::new();
        let mut sets = tokens.iter().map(|t| self.postings.get(t).unwrap_or(&empty));
        let Some(first) = sets.next() else {
            return HashSet::new();
        };
        let mut acc = first.clone();
        for set in sets {
            match mode {
                SearchMode::And => acc.retain(|id| set.contains(id)),
                SearchMode::Or => acc.extend(set.iter().copied()),
            }
        }
        acc
    }

    /// Evaluates and ranks `query`, returning locators by descending tf-idf score.
    pub fn search(&self, query: &str, mode: SearchMode) -> SearchOutcome<Vec<Hit>> {
        if query.is_empty() {
            return SearchOutcome::EmptyQuery;
        }
        let start = Instant::now();
        let tokens = self.analyzer.analyze(query);
        let candidates = self.combine(&tokens, mode);
        let hits: Vec<Hit> = self
            .rank(&tokens, &candidates)
            .into_iter()
            .map(|r| Hit { doc_id: r.doc.id(), locator: r.doc.doc().locator().to_string(), score: r.score })
            .collect();
        tracing::debug!(query, %mode, num_tokens = tokens.len(), num_hits = hits.len(), "search");
        self.record_timing("search", start.elapsed());
        SearchOutcome::Matches(hits)
    }

    /// [`search`](Self::search) with the mode given as text. Anything other than
    /// `"AND"` or `"OR"` is logged and matches nothing.
    pub fn search_str(&self, query: &str, mode: &str) -> SearchOutcome<Vec<Hit>> {
        if query.is_empty() {
            return SearchOutcome::EmptyQuery;
        }
        match mode.parse::<SearchMode>() {
            Ok(mode) => self.search(query, mode),
            Err(err) => {
                tracing::warn!(%err, "invalid search mode");
                SearchOutcome::Matches(Vec::new())
            }
        }
    }

    /// Matching documents without scoring, in ascending ID order.
    pub fn search_unranked(&self, query: &str, mode: SearchMode) -> SearchOutcome<Vec<&D>> {
        self.evaluate(query, mode).map(|ids| {
            let mut ids: Vec<DocId> = ids.into_iter().collect();
            ids.sort_unstable();
            ids.into_iter().filter_map(|id| self.store.get(id)).map(|d| d.doc()).collect()
        })
    }
}
