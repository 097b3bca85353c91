// File export of the topic table and labeled corpus, as CSV or JSON.
//
// The topic CSV uses the column names analysts already work with, so the
// same file can be edited into a curated topic-name table and fed back in
// for apply runs.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use csv::StringRecord;
use serde::Serialize;

use crate::pipeline::corpus::{AnnotatedDocument, CorpusTable};
use crate::topics::summary::TopicRecord;

pub const TOPICS_FILE_STEM: &str = "topics";
pub const LABELED_FILE_STEM: &str = "labeled";

const TOPIC_HEADERS: [&str; 6] = [
    "topic number",
    "topic",
    "keywords",
    "example",
    "frequency (%)",
    "number of responses",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Write the topic table as CSV.
pub fn write_topics_csv<W: Write>(writer: W, topics: &[TopicRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TOPIC_HEADERS)?;
    for topic in topics {
        csv_writer.write_record([
            topic.cluster.to_string(),
            topic.topic_name.clone().unwrap_or_default(),
            topic.keywords_text(),
            topic.examples_text(),
            format!("{:.2}", topic.frequency_pct),
            topic.responses.to_string(),
        ])?;
    }
    csv_writer.flush().context("Failed to flush topic CSV")?;
    Ok(())
}

/// Write the labeled corpus as CSV: every input column, then `topic number`
/// and `topic`. Unlabeled rows get empty cells.
pub fn write_labeled_csv<W: Write>(
    writer: W,
    table: &CorpusTable,
    documents: &[AnnotatedDocument],
) -> Result<()> {
    anyhow::ensure!(
        table.rows.len() == documents.len(),
        "Labeled {} documents but the input has {} rows",
        documents.len(),
        table.rows.len()
    );

    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let mut headers = table.headers.clone();
    headers.push_field("topic number");
    headers.push_field("topic");
    csv_writer.write_record(&headers)?;

    for (row, doc) in table.rows.iter().zip(documents) {
        let mut record: StringRecord = row.clone();
        record.push_field(&doc.cluster.map(|c| c.to_string()).unwrap_or_default());
        record.push_field(doc.topic.as_deref().unwrap_or(""));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush().context("Failed to flush labeled CSV")?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(writer, value).context("Failed to serialize JSON")
}

/// Write both outputs into `dir`, returning the paths written.
pub fn export_all(
    dir: &Path,
    format: ExportFormat,
    topics: &[TopicRecord],
    table: &CorpusTable,
    documents: &[AnnotatedDocument],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let topics_path = dir.join(format!("{TOPICS_FILE_STEM}.{}", format.extension()));
    let labeled_path = dir.join(format!("{LABELED_FILE_STEM}.{}", format.extension()));

    let topics_file = File::create(&topics_path)
        .with_context(|| format!("Failed to create {}", topics_path.display()))?;
    let labeled_file = File::create(&labeled_path)
        .with_context(|| format!("Failed to create {}", labeled_path.display()))?;

    match format {
        ExportFormat::Csv => {
            write_topics_csv(topics_file, topics)?;
            write_labeled_csv(labeled_file, table, documents)?;
        }
        ExportFormat::Json => {
            write_json(topics_file, topics)?;
            write_json(labeled_file, documents)?;
        }
    }

    Ok(vec![topics_path, labeled_path])
}
