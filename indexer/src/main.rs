use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quarry_core::{Abstract, Analyzer, BuildOptions, Corpus, Hit, Index, IndexBuilder, SearchOutcome};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "quarry-indexer")]
#[command(about = "Build an in-memory tf-idf index from a JSONL corpus and query it", long_about = None)]
struct Cli {
    /// Corpus path (a .jsonl file or a directory of them)
    #[arg(long, global = true, default_value = "./corpus")]
    input: String,
    /// Log indexing progress every N documents (0 disables)
    #[arg(long, global = true, default_value_t = 5000)]
    progress_every: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus and print document and term counts
    Stats,
    /// Index the corpus, run one query, and print ranked locators
    Search {
        /// Query text
        #[arg(long, short)]
        q: String,
        /// AND or OR
        #[arg(long, default_value = "AND")]
        mode: String,
        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Stats {
    num_docs: usize,
    num_terms: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let index = build_index(&cli.input, BuildOptions { progress_every: cli.progress_every })?;

    match cli.command {
        Commands::Stats => {
            let stats = Stats { num_docs: index.document_count(), num_terms: index.term_count() };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Search { q, mode, limit, json } => {
            match index.search_str(&q, &mode) {
                SearchOutcome::EmptyQuery => println!("Query is empty"),
                SearchOutcome::Matches(hits) => print_hits(&hits, limit, json)?,
            }
        }
    }
    Ok(())
}

fn build_index(input: &str, options: BuildOptions) -> Result<Index<Abstract>> {
    let corpus = Corpus::open(input).with_context(|| format!("opening corpus {input}"))?;
    let mut builder = IndexBuilder::new(Analyzer::english())
        .with_options(options)
        .with_progress(|n| tracing::info!(indexed = n, "indexing"))
        .with_timing(log_timing);
    let processed = builder.try_index_documents(corpus.documents())?;
    tracing::info!(processed, input, "corpus ingested");
    Ok(builder.finish())
}

fn log_timing(stage: &'static str, elapsed: Duration) {
    tracing::info!(stage, took_s = elapsed.as_secs_f64(), "timing");
}

fn print_hits(hits: &[Hit], limit: usize, json: bool) -> Result<()> {
    let shown = &hits[..hits.len().min(limit)];
    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }
    for hit in shown {
        println!("{:.4}\t{}", hit.score, hit.locator);
    }
    eprintln!("{} results", hits.len());
    Ok(())
}
