// Topic table — one row per cluster, plus labels pushed back onto documents.
//
// Frequency is the share of *considered* documents in the cluster: texts
// that were selected, deduplicated and survived normalization. Clusters with
// no members still get a row (frequency 0, no examples) so a topic table
// always has K rows and curated names never silently lose their cluster.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use super::names::TopicNames;
use crate::cluster::Assignment;
use crate::pipeline::corpus::{AnnotatedDocument, Document};

/// A considered document with its best cluster.
#[derive(Debug, Clone)]
pub struct ScoredText<'a> {
    pub text: &'a str,
    pub assignment: Assignment,
}

/// One discovered topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRecord {
    pub cluster: usize,
    /// Readable keywords, most frequent first
    pub keywords: Vec<String>,
    /// Highest-scoring member texts, best first
    pub examples: Vec<String>,
    /// Share of considered documents, 0-100
    pub frequency_pct: f64,
    pub responses: usize,
    /// Curated name, when one exists for this cluster
    pub topic_name: Option<String>,
}

impl TopicRecord {
    /// The curated name, or the top keywords when there is none.
    pub fn label(&self) -> String {
        match &self.topic_name {
            Some(name) => name.clone(),
            None => generate_cluster_label(&self.keywords),
        }
    }

    pub fn keywords_text(&self) -> String {
        self.keywords.join(", ")
    }

    pub fn examples_text(&self) -> String {
        self.examples.join(";")
    }
}

/// Generate a human-readable label from a cluster's top keywords.
///
/// Takes the first 3 keywords and joins them with " / ".
pub fn generate_cluster_label(keywords: &[String]) -> String {
    let label_words: Vec<&str> = keywords.iter().take(3).map(|s| s.as_str()).collect();
    label_words.join(" / ")
}

/// Build the topic table for `k` clusters, sorted by frequency descending.
///
/// `keywords` is indexed by cluster id; clusters past its end get none.
pub fn summarize(
    k: usize,
    documents: &[ScoredText<'_>],
    keywords: &[Vec<String>],
    max_examples: usize,
) -> Vec<TopicRecord> {
    let total = documents.len();

    let mut records: Vec<TopicRecord> = (0..k)
        .map(|cluster| {
            let mut members: Vec<&ScoredText<'_>> = documents
                .iter()
                .filter(|d| d.assignment.cluster == cluster)
                .collect();
            let responses = members.len();

            // Stable sort keeps corpus order among equal scores.
            members.sort_by(|a, b| b.assignment.score.total_cmp(&a.assignment.score));
            let mut seen = HashSet::new();
            let examples: Vec<String> = members
                .iter()
                .filter(|d| seen.insert(d.text))
                .take(max_examples)
                .map(|d| d.text.to_string())
                .collect();

            let frequency_pct = if total == 0 {
                0.0
            } else {
                responses as f64 / total as f64 * 100.0
            };

            TopicRecord {
                cluster,
                keywords: keywords.get(cluster).cloned().unwrap_or_default(),
                examples,
                frequency_pct,
                responses,
                topic_name: None,
            }
        })
        .collect();

    records.sort_by(|a, b| b.frequency_pct.total_cmp(&a.frequency_pct));
    records
}

/// Left-join curated names onto the table. Clusters without a name keep
/// `topic_name: None`.
pub fn join_names(records: Vec<TopicRecord>, names: &TopicNames) -> Vec<TopicRecord> {
    let joined: Vec<TopicRecord> = records
        .into_iter()
        .map(|record| TopicRecord {
            topic_name: names.get(record.cluster).map(String::from),
            ..record
        })
        .collect();

    let unnamed: Vec<usize> = joined
        .iter()
        .filter(|r| r.topic_name.is_none())
        .map(|r| r.cluster)
        .collect();
    if !unnamed.is_empty() {
        warn!(clusters = ?unnamed, "No curated topic name for some clusters");
    }
    joined
}

/// Label every input document with its cluster and topic name.
///
/// `assigned` maps a considered text to its cluster; documents whose text
/// was not considered (missing, too short, empty after normalization) stay
/// unlabeled. Duplicate texts share a label.
pub fn annotate(
    documents: &[Document],
    assigned: &HashMap<&str, usize>,
    topics: &[TopicRecord],
) -> Vec<AnnotatedDocument> {
    let names: HashMap<usize, &str> = topics
        .iter()
        .filter_map(|t| t.topic_name.as_deref().map(|n| (t.cluster, n)))
        .collect();

    documents
        .iter()
        .map(|doc| {
            let cluster = doc
                .text
                .as_deref()
                .and_then(|text| assigned.get(text).copied());
            AnnotatedDocument {
                id: doc.id.clone(),
                text: doc.text.clone(),
                cluster,
                topic: cluster.and_then(|c| names.get(&c).map(|n| n.to_string())),
            }
        })
        .collect()
}
