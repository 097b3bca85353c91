// Label reconstruction — canonical cluster words back to readable keywords.
//
// Cluster statistics are kept over stems ("vaccin", "peopl"), which are fine
// for counting and useless for a person reading the topic table. For each
// cluster we take its most frequent stems and, for each, scan the corpus in
// order for the first real word that normalizes to that stem. The hit then
// goes through the spelling corrector. A stem with no matching word is kept
// as is.

use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use super::spelling::SpellCorrector;
use crate::cluster::ClusterModel;
use crate::text::mapping::TokenMap;
use crate::text::normalize::Normalizer;

pub struct LabelReconstructor<'a> {
    normalizer: &'a Normalizer,
    corrector: &'a dyn SpellCorrector,
    /// Keywords per cluster
    top_n: usize,
}

/// The distinct words of a corpus in first-seen order.
///
/// Stemming every word for every stem looked up is the slow part of label
/// reconstruction, so each distinct word is stemmed at most once, and only
/// when a stem is missing from the token map.
pub struct CorpusWords<'n> {
    normalizer: &'n Normalizer,
    words: Vec<String>,
    /// Canonical form -> index of the first word producing it
    by_canonical: OnceCell<HashMap<String, usize>>,
}

impl<'n> CorpusWords<'n> {
    pub fn new<S: AsRef<str>>(normalizer: &'n Normalizer, corpus: &[S]) -> Self {
        let mut seen = HashSet::new();
        let words = corpus
            .iter()
            .flat_map(|text| normalizer.words(text.as_ref()))
            .filter(|word| seen.insert(word.clone()))
            .collect();
        Self {
            normalizer,
            words,
            by_canonical: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First word in corpus order that is one of `candidates`.
    fn first_of(&self, candidates: &BTreeSet<String>) -> Option<&str> {
        self.words
            .iter()
            .find(|word| candidates.contains(word.as_str()))
            .map(|word| word.as_str())
    }

    /// First word in corpus order whose canonical form is `stem`.
    fn first_with_canonical(&self, stem: &str) -> Option<&str> {
        let index = self.by_canonical.get_or_init(|| {
            let mut index = HashMap::new();
            for (i, word) in self.words.iter().enumerate() {
                index.entry(self.normalizer.canonical(word)).or_insert(i);
            }
            index
        });
        index.get(stem).map(|&i| self.words[i].as_str())
    }
}

impl<'a> LabelReconstructor<'a> {
    pub fn new(normalizer: &'a Normalizer, corrector: &'a dyn SpellCorrector, top_n: usize) -> Self {
        Self {
            normalizer,
            corrector,
            top_n,
        }
    }

    /// Human-readable keywords for every cluster, indexed by cluster id.
    /// A cluster holding no words gets an empty list, never a missing one.
    /// Stems that correct to the same word appear once.
    pub fn reconstruct<S: AsRef<str>>(
        &self,
        model: &ClusterModel,
        corpus: &[S],
        token_map: &TokenMap,
    ) -> Vec<Vec<String>> {
        let corpus_words = CorpusWords::new(self.normalizer, corpus);

        model
            .clusters()
            .iter()
            .map(|cluster| {
                let mut keywords: Vec<String> = Vec::new();
                for (stem, _) in cluster.top_words(self.top_n) {
                    let keyword = match self.find_original(stem, &corpus_words, token_map) {
                        Some(word) => self.corrector.correct(word),
                        None => {
                            debug!(cluster = cluster.id, stem, "No corpus word for stem, keeping it");
                            stem.to_string()
                        }
                    };
                    if !keywords.contains(&keyword) {
                        keywords.push(keyword);
                    }
                }
                keywords
            })
            .collect()
    }

    /// First word in corpus order whose canonical form is `stem`.
    ///
    /// Words the token map already pairs with `stem` are found without
    /// stemming; the corpus is only stemmed for stems the map does not know.
    pub fn find_original<'c>(
        &self,
        stem: &str,
        corpus_words: &'c CorpusWords<'_>,
        token_map: &TokenMap,
    ) -> Option<&'c str> {
        token_map
            .originals(stem)
            .and_then(|known| corpus_words.first_of(known))
            .or_else(|| corpus_words.first_with_canonical(stem))
    }
}
