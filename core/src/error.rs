use std::path::PathBuf;

/// Failures while streaming a corpus. Any of these aborts ingestion.
#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("corpus path {0} is neither a file nor a directory")]
    NotFound(PathBuf),
}
