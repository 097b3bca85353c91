// ClusterModel — the state of a Dirichlet-multinomial mixture.
//
// K clusters, each holding the number of documents assigned to it, the total
// number of tokens in those documents, and per-word occurrence counts. The
// model is an explicit value: fitting mutates one instance, scoring only
// reads it, and nothing lives in process-wide state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Cluster capacity and Dirichlet priors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Upper bound on the number of clusters (empty clusters are allowed)
    pub k: usize,
    /// Prior weight on cluster popularity
    pub alpha: f64,
    /// Prior weight on each word within a cluster
    pub beta: f64,
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(PipelineError::config("K must be at least 1"));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(PipelineError::config(format!(
                "alpha must be a positive number, got {}",
                self.alpha
            )));
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(PipelineError::config(format!(
                "beta must be a positive number, got {}",
                self.beta
            )));
        }
        Ok(())
    }
}

/// One latent cluster and the statistics of the documents assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub doc_count: usize,
    pub word_total: usize,
    pub word_counts: BTreeMap<String, usize>,
}

impl Cluster {
    fn new(id: usize) -> Self {
        Self {
            id,
            doc_count: 0,
            word_total: 0,
            word_counts: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    pub fn count(&self, word: &str) -> usize {
        self.word_counts.get(word).copied().unwrap_or(0)
    }

    /// The `n` most frequent words, highest count first, ties alphabetical.
    pub fn top_words(&self, n: usize) -> Vec<(&str, usize)> {
        let mut words: Vec<(&str, usize)> = self
            .word_counts
            .iter()
            .map(|(w, c)| (w.as_str(), *c))
            .collect();
        // BTreeMap iteration is alphabetical and the sort is stable.
        words.sort_by(|a, b| b.1.cmp(&a.1));
        words.truncate(n);
        words
    }

    fn add(&mut self, doc: &[String]) {
        self.doc_count += 1;
        self.word_total += doc.len();
        for word in doc {
            *self.word_counts.entry(word.clone()).or_insert(0) += 1;
        }
    }

    fn remove(&mut self, doc: &[String]) {
        self.doc_count -= 1;
        self.word_total -= doc.len();
        for word in doc {
            if let Some(count) = self.word_counts.get_mut(word) {
                *count -= 1;
                if *count == 0 {
                    self.word_counts.remove(word);
                }
            }
        }
    }
}

/// The full fitted model: hyperparameters, K clusters, the vocabulary seen
/// during fitting, and the cluster each training document ended up in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    params: Hyperparameters,
    clusters: Vec<Cluster>,
    vocabulary: BTreeSet<String>,
    assignments: Vec<usize>,
}

impl ClusterModel {
    /// An untrained model: K empty clusters over a fixed vocabulary.
    pub(crate) fn empty(params: Hyperparameters, vocabulary: BTreeSet<String>) -> Self {
        Self {
            params,
            clusters: (0..params.k).map(Cluster::new).collect(),
            vocabulary,
            assignments: Vec::new(),
        }
    }

    pub fn params(&self) -> Hyperparameters {
        self.params
    }

    pub fn k(&self) -> usize {
        self.params.k
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, id: usize) -> Option<&Cluster> {
        self.clusters.get(id)
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    /// Cluster of each training document, in training order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn document_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of clusters holding at least one document.
    pub fn populated_clusters(&self) -> usize {
        self.clusters.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn knows(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    pub(crate) fn add_document(&mut self, cluster: usize, doc: &[String]) {
        self.clusters[cluster].add(doc);
    }

    pub(crate) fn remove_document(&mut self, cluster: usize, doc: &[String]) {
        self.clusters[cluster].remove(doc);
    }

    pub(crate) fn set_assignments(&mut self, assignments: Vec<usize>) {
        self.assignments = assignments;
    }

    /// Unnormalized log-probability of `doc` joining each cluster.
    ///
    /// log(m_z + alpha)
    ///   + sum_i log(n_z[w_i] + beta + r_i)
    ///   - sum_i log(n_z + V*beta + i)
    ///
    /// where r_i counts earlier occurrences of w_i in the same document.
    pub fn log_weights(&self, doc: &[String]) -> Vec<f64> {
        let alpha = self.params.alpha;
        let beta = self.params.beta;
        let v_beta = self.vocabulary.len() as f64 * beta;
        let ranks = repeat_ranks(doc);

        self.clusters
            .iter()
            .map(|cluster| {
                let mut lp = (cluster.doc_count as f64 + alpha).ln();
                for (i, (word, rank)) in doc.iter().zip(&ranks).enumerate() {
                    lp += (cluster.count(word) as f64 + beta + *rank as f64).ln();
                    lp -= (cluster.word_total as f64 + v_beta + i as f64).ln();
                }
                lp
            })
            .collect()
    }

    /// Normalized probability of `doc` joining each cluster.
    pub fn posterior(&self, doc: &[String]) -> Vec<f64> {
        normalize_log_weights(&self.log_weights(doc))
    }

    /// Check the bookkeeping invariants a loaded model must satisfy.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.params.validate().map_err(|e| e.to_string())?;
        if self.clusters.len() != self.params.k {
            return Err(format!(
                "model declares K={} but holds {} clusters",
                self.params.k,
                self.clusters.len()
            ));
        }
        let mut members = vec![0usize; self.params.k];
        for &z in &self.assignments {
            if z >= self.params.k {
                return Err(format!("document assigned to unknown cluster {z}"));
            }
            members[z] += 1;
        }
        for (idx, cluster) in self.clusters.iter().enumerate() {
            if cluster.id != idx {
                return Err(format!("cluster at position {idx} has id {}", cluster.id));
            }
            if cluster.doc_count != members[idx] {
                return Err(format!(
                    "cluster {idx} counts {} documents but {} are assigned to it",
                    cluster.doc_count, members[idx]
                ));
            }
            let total: usize = cluster.word_counts.values().sum();
            if total != cluster.word_total || cluster.word_counts.values().any(|&c| c == 0) {
                return Err(format!("cluster {idx} word counts are inconsistent"));
            }
            if let Some(word) = cluster.word_counts.keys().find(|w| !self.knows(w)) {
                return Err(format!("cluster {idx} holds '{word}' outside the vocabulary"));
            }
        }
        Ok(())
    }
}

/// For each position, how many times the same token appeared before it.
fn repeat_ranks(doc: &[String]) -> Vec<usize> {
    doc.iter()
        .enumerate()
        .map(|(i, word)| doc[..i].iter().filter(|w| *w == word).count())
        .collect()
}

/// Turn log-weights into probabilities without underflow.
pub(crate) fn normalize_log_weights(log_weights: &[f64]) -> Vec<f64> {
    let max = log_weights
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = log_weights.iter().map(|lp| (lp - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    if sum.is_finite() && sum > 0.0 {
        exp.into_iter().map(|p| p / sum).collect()
    } else {
        let k = log_weights.len().max(1) as f64;
        vec![1.0 / k; log_weights.len()]
    }
}
