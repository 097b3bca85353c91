// Curated topic names, an analyst-maintained table of cluster id -> name.
//
// After a model is trained, someone reads the keyword lists and examples and
// writes a short name for each cluster ("vaccine access", "weather"). The
// table is a CSV with `topic number` and `topic` columns. Older exports wrote
// the cluster id as a float ("3.0"), so both forms are accepted.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::{PipelineError, Result};

#[derive(Debug, Deserialize)]
struct NameRow {
    #[serde(rename = "topic number")]
    cluster: String,
    #[serde(rename = "topic")]
    name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicNames {
    names: BTreeMap<usize, String>,
}

impl TopicNames {
    /// Parse a topic-name CSV. Rows with an empty name are skipped.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let mut names = BTreeMap::new();
        for (row_no, row) in csv_reader.deserialize::<NameRow>().enumerate() {
            let row = row.map_err(|e| PipelineError::Table(format!("row {}: {e}", row_no + 1)))?;
            let cluster = parse_cluster_id(&row.cluster).ok_or_else(|| {
                PipelineError::Table(format!(
                    "row {}: '{}' is not a topic number",
                    row_no + 1,
                    row.cluster
                ))
            })?;
            if let Some(name) = row.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
                names.insert(cluster, name);
            }
        }
        Ok(Self { names })
    }

    pub fn get(&self, cluster: usize) -> Option<&str> {
        self.names.get(&cluster).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(usize, String)> for TopicNames {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// "3" or "3.0" -> 3. Negative or fractional ids are rejected.
fn parse_cluster_id(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<usize>() {
        return Some(id);
    }
    let value = raw.parse::<f64>().ok()?;
    (value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64).then_some(value as usize)
}
