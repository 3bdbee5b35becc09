use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::document::Abstract;
use crate::error::CorpusError;
use crate::DocId;

#[derive(Debug, Deserialize)]
struct InputRecord {
    fulltext: String,
    filename: String,
    #[serde(default)]
    url: Option<String>,
}

/// Missing, empty and the literal "None" all mean no URL.
fn normalize_url(url: Option<String>) -> Option<String> {
    url.filter(|u| !u.is_empty() && u != "None")
}

/// Streams [`Abstract`]s from JSON Lines, one record in memory at a time.
/// IDs start at `first_id` and increase by one per emitted record.
pub struct CorpusReader<R> {
    path: PathBuf,
    lines: Lines<R>,
    line_no: usize,
    next_id: DocId,
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>, first_id: DocId) -> Self {
        Self { path: path.into(), lines: reader.lines(), line_no: 0, next_id: first_id }
    }

    pub fn next_id(&self) -> DocId { self.next_id }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    type Item = Result<Abstract, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => return Some(Err(CorpusError::Io { path: self.path.clone(), source })),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record: InputRecord = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(source) => {
                    return Some(Err(CorpusError::Parse { path: self.path.clone(), line: self.line_no, source }))
                }
            };
            let id = self.next_id;
            self.next_id += 1;
            return Some(Ok(Abstract {
                id,
                fulltext: record.fulltext,
                filename: record.filename,
                url: normalize_url(record.url),
            }));
        }
    }
}

/// A corpus on disk: a single `.jsonl` file or a directory tree of them.
#[derive(Debug, Clone)]
pub struct Corpus {
    files: Vec<PathBuf>,
}

impl Corpus {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let mut files = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| CorpusError::Io {
                    path: e.path().unwrap_or(path).to_path_buf(),
                    source: e.into(),
                })?;
                let p = entry.path();
                if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                    files.push(p.to_path_buf());
                }
            }
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            return Err(CorpusError::NotFound(path.to_path_buf()));
        }
        Ok(Self { files })
    }

    pub fn files(&self) -> &[PathBuf] { &self.files }

    /// A single pass over every record, IDs assigned from 1 in emission order.
    pub fn documents(&self) -> Documents {
        Documents { files: self.files.clone().into_iter(), current: None, next_id: 1 }
    }
}

/// Iterator returned by [`Corpus::documents`]. Files are opened lazily, one at a time.
pub struct Documents {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<CorpusReader<BufReader<File>>>,
    next_id: DocId,
}

impl Iterator for Documents {
    type Item = Result<Abstract, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(reader) = self.current.as_mut() {
                match reader.next() {
                    Some(item) => {
                        self.next_id = reader.next_id();
                        return Some(item);
                    }
                    None => self.current = None,
                }
            }
            let path = self.files.next()?;
            tracing::debug!(path = %path.display(), "reading corpus file");
            match File::open(&path) {
                Ok(f) => self.current = Some(CorpusReader::new(BufReader::new(f), path, self.next_id)),
                Err(source) => return Some(Err(CorpusError::Io { path, source })),
            }
        }
    }
}
