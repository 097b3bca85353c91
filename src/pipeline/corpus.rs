// Corpus records in and annotated records out.
//
// Input is a CSV with at least a text column. Every other column is carried
// through untouched so the annotated export looks like the input with two
// extra columns.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use serde::Serialize;

/// One input record. `text` is missing when the source had no text for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: Option<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
        }
    }
}

/// An input record after labeling. Unconsidered documents have neither a
/// cluster nor a topic; fit-mode runs have clusters but no curated topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedDocument {
    pub id: String,
    pub text: Option<String>,
    pub cluster: Option<usize>,
    pub topic: Option<String>,
}

/// A parsed corpus CSV: the raw rows plus the documents extracted from them.
#[derive(Debug, Clone)]
pub struct CorpusTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    pub documents: Vec<Document>,
}

/// Read a corpus CSV. The text column is required; when the id column is
/// absent, the 0-based row number is used as the id.
pub fn read_csv<R: Read>(reader: R, id_column: &str, text_column: &str) -> Result<CorpusTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();

    let text_idx = headers
        .iter()
        .position(|h| h == text_column)
        .with_context(|| format!("Input has no '{text_column}' column (set MURMUR_TEXT_COLUMN)"))?;
    let id_idx = headers.iter().position(|h| h == id_column);

    let mut rows = Vec::new();
    let mut documents = Vec::new();
    for (row_no, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read CSV row {}", row_no + 1))?;
        let id = id_idx
            .and_then(|i| row.get(i))
            .map(String::from)
            .unwrap_or_else(|| row_no.to_string());
        let text = row
            .get(text_idx)
            .filter(|t| !t.is_empty())
            .map(String::from);
        documents.push(Document { id, text });
        rows.push(row);
    }

    Ok(CorpusTable {
        headers,
        rows,
        documents,
    })
}

pub fn read_csv_path(path: &Path, id_column: &str, text_column: &str) -> Result<CorpusTable> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_csv(file, id_column, text_column)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Texts worth clustering, deduplicated in first-seen order.
///
/// Drops missing texts, the literal "None" some exports write for nulls, and
/// anything of `min_chars` characters or fewer.
pub fn select_texts(documents: &[Document], min_chars: usize) -> Vec<&str> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter_map(|d| d.text.as_deref())
        .filter(|t| *t != "None" && t.chars().count() > min_chars)
        .filter(|t| seen.insert(*t))
        .collect()
}
