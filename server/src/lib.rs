use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use quarry_core::{Abstract, Analyzer, Corpus, Hit, Index, IndexBuilder, SearchOutcome, SharedIndex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_mode() -> String { "AND".into() }
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: String,
    pub empty_query: bool,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Clone)]
pub struct AppState {
    pub corpus_path: PathBuf,
    pub index: Arc<SharedIndex<Abstract>>,
    pub admin_token: Option<String>,
}

/// Streams the corpus at `path` into a fresh index.
pub fn load_index(path: &std::path::Path) -> Result<Index<Abstract>> {
    let corpus = Corpus::open(path).with_context(|| format!("opening corpus {}", path.display()))?;
    let mut builder = IndexBuilder::new(Analyzer::english())
        .with_progress(|n| tracing::info!(indexed = n, "indexing"))
        .with_timing(|stage, took| tracing::debug!(stage, took_s = took.as_secs_f64(), "timing"));
    builder.try_index_documents(corpus.documents())?;
    Ok(builder.finish())
}

pub fn build_app(corpus: String) -> Result<Router> {
    // Build once at startup; queries only ever read the current snapshot.
    let corpus_path = PathBuf::from(&corpus);
    let index = load_index(&corpus_path)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { corpus_path, index: Arc::new(SharedIndex::new(index)), admin_token };
    Ok(router(app_state))
}

pub fn router(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = state.index.current();
    let (empty_query, mut results) = match index.search_str(&params.q, &params.mode) {
        SearchOutcome::EmptyQuery => (true, Vec::new()),
        SearchOutcome::Matches(hits) => (false, hits),
    };
    let total_hits = results.len();
    results.truncate(params.k.clamp(1, 100));

    let elapsed = start.elapsed();
    Json(SearchResponse {
        query: params.q,
        mode: params.mode,
        empty_query,
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results,
    })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let index = state.index.current();
    let doc = index
        .document(doc_id)
        .ok_or((StatusCode::NOT_FOUND, format!("document {doc_id} not found")))?
        .doc();
    Ok(Json(serde_json::json!({
        "doc_id": doc.id,
        "filename": doc.filename,
        "url": doc.url,
        "fulltext": doc.fulltext,
    })))
}

/// Re-scans the corpus into a new index and swaps it in. In-flight searches keep the old one.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let path = state.corpus_path.clone();
    let index = tokio::task::spawn_blocking(move || load_index(&path))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let num_docs = index.document_count();
    let num_terms = index.term_count();
    state.index.swap(index);
    tracing::info!(num_docs, num_terms, "index reloaded");
    Ok(Json(serde_json::json!({ "num_docs": num_docs, "num_terms": num_terms })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
