// Collapsed Gibbs sampling for the Dirichlet-multinomial mixture (GSDMM).
//
// Each document belongs to exactly one cluster. A pass visits documents in
// corpus order: take the document out of its cluster, compute the posterior
// over all K clusters from everyone else's current assignments, sample a new
// cluster, and put the document back. Later documents in a pass see the
// updated counts of earlier ones, so the loop is strictly sequential.
//
// There is no convergence test. The pass budget is the only stopping rule;
// per-pass transfer counts are reported so callers can see whether it settled.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::model::{ClusterModel, Hyperparameters};
use crate::error::{PipelineError, Result};

/// Everything `fit` needs besides the documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    pub params: Hyperparameters,
    pub iterations: usize,
    /// RNG seed — same seed and corpus give the same model
    pub seed: u64,
}

/// Statistics reported after every sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// 1-based pass number
    pub iteration: usize,
    pub iterations: usize,
    /// Documents that moved to a different cluster during this pass
    pub transfers: usize,
    pub populated_clusters: usize,
}

/// Best cluster for a document and how strongly it belongs there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub cluster: usize,
    /// Posterior probability of `cluster` (1/K when nothing is known)
    pub score: f64,
}

/// Fit a model to canonical-token documents.
pub fn fit(documents: &[Vec<String>], settings: &FitSettings) -> Result<ClusterModel> {
    fit_with_progress(documents, settings, |_| {})
}

/// Fit a model, calling `on_pass` after every sampling pass.
pub fn fit_with_progress<F>(
    documents: &[Vec<String>],
    settings: &FitSettings,
    mut on_pass: F,
) -> Result<ClusterModel>
where
    F: FnMut(PassStats),
{
    settings.params.validate()?;
    if documents.is_empty() {
        return Err(PipelineError::config(
            "cannot fit a topic model on an empty corpus",
        ));
    }

    let vocabulary: BTreeSet<String> = documents.iter().flatten().cloned().collect();
    let k = settings.params.k;

    info!(
        documents = documents.len(),
        vocabulary = vocabulary.len(),
        k,
        alpha = settings.params.alpha,
        beta = settings.params.beta,
        iterations = settings.iterations,
        "Fitting topic model"
    );

    let mut model = ClusterModel::empty(settings.params, vocabulary);
    let mut rng = StdRng::seed_from_u64(settings.seed);

    // Uniform random start.
    let mut assignments: Vec<usize> = Vec::with_capacity(documents.len());
    for doc in documents {
        let z = rng.random_range(0..k);
        model.add_document(z, doc);
        assignments.push(z);
    }

    for iteration in 1..=settings.iterations {
        let mut transfers = 0;
        for (d, doc) in documents.iter().enumerate() {
            let old = assignments[d];
            model.remove_document(old, doc);

            let posterior = model.posterior(doc);
            let new = sample(&posterior, &mut rng);

            model.add_document(new, doc);
            assignments[d] = new;
            if new != old {
                transfers += 1;
            }
        }

        let stats = PassStats {
            iteration,
            iterations: settings.iterations,
            transfers,
            populated_clusters: model.populated_clusters(),
        };
        debug!(
            iteration,
            transfers,
            populated = stats.populated_clusters,
            "Gibbs pass complete"
        );
        on_pass(stats);
    }

    model.set_assignments(assignments);

    info!(
        populated = model.populated_clusters(),
        k, "Topic model fitted"
    );
    Ok(model)
}

/// Score a document against a fitted model without touching its counts.
///
/// A document with no token in the fitted vocabulary carries no evidence, so
/// it gets a flat 1/K and lands in cluster 0.
pub fn score(document: &[String], model: &ClusterModel) -> Assignment {
    let k = model.k();
    if !document.iter().any(|w| model.knows(w)) {
        return Assignment {
            cluster: 0,
            score: 1.0 / k as f64,
        };
    }

    let posterior = model.posterior(document);
    // First maximum wins so ties resolve to the lowest cluster id.
    let mut best = Assignment {
        cluster: 0,
        score: posterior[0],
    };
    for (cluster, &p) in posterior.iter().enumerate().skip(1) {
        if p > best.score {
            best = Assignment { cluster, score: p };
        }
    }
    best
}

/// Draw an index from a normalized distribution.
fn sample<R: Rng>(probabilities: &[f64], rng: &mut R) -> usize {
    let target: f64 = rng.random::<f64>();
    let mut cumulative = 0.0;
    for (idx, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if target < cumulative {
            return idx;
        }
    }
    // Rounding can leave the cumulative sum a hair under 1.0.
    probabilities.len() - 1
}
