// Topic pipeline: raw records in, topic table and labeled records out.
//
// Two modes share every step except where the model comes from:
//   - Fit: train a new model on this corpus and persist it.
//   - Apply: load the persisted model and score this corpus against it,
//     then join the curated topic names.
//
// Steps: select texts -> normalize -> reconcile token mappings -> fit or
// load -> score each text -> reconstruct keywords -> summarize -> annotate.

use std::collections::HashMap;

use tracing::{info, warn};

use super::corpus::{select_texts, AnnotatedDocument, Document};
use crate::cluster::{self, ClusterModel, PassStats};
use crate::config::Config;
use crate::error::Result;
use crate::store::{self, ModelStore};
use crate::text::mapping::{reconcile, TokenMap};
use crate::text::normalize::Normalizer;
use crate::topics::labels::LabelReconstructor;
use crate::topics::names::TopicNames;
use crate::topics::spelling::{SpellCorrector, SymSpell};
use crate::topics::summary::{annotate, join_names, summarize, ScoredText, TopicRecord};

/// Edit distance used for the corpus-built spelling dictionary.
const SPELL_EDIT_DISTANCE: usize = 2;

/// How much more frequent a corpus word must be to absorb a known neighbour.
const CORPUS_SPELL_DOMINANCE: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Train a new model from scratch and persist it
    Fit,
    /// Score against a previously persisted model
    Apply,
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Every input document, labeled where possible
    pub documents: Vec<AnnotatedDocument>,
    /// One row per cluster, most frequent first
    pub topics: Vec<TopicRecord>,
    pub model: ClusterModel,
    pub token_map: TokenMap,
    /// Documents that made it into frequency denominators
    pub considered: usize,
}

pub struct TopicPipeline<'a> {
    config: &'a Config,
    store: &'a dyn ModelStore,
    normalizer: Normalizer,
    /// When unset, a dictionary is built from the corpus on each run
    corrector: Option<Box<dyn SpellCorrector>>,
}

impl<'a> TopicPipeline<'a> {
    pub fn new(config: &'a Config, store: &'a dyn ModelStore) -> Self {
        Self {
            config,
            store,
            normalizer: Normalizer::from_config(config),
            corrector: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_corrector(mut self, corrector: Box<dyn SpellCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn run(&self, mode: Mode, documents: &[Document]) -> Result<PipelineOutput> {
        self.run_with_progress(mode, documents, |_| {})
    }

    /// Run the pipeline, reporting Gibbs passes to `on_pass` in fit mode.
    pub fn run_with_progress<F>(
        &self,
        mode: Mode,
        documents: &[Document],
        on_pass: F,
    ) -> Result<PipelineOutput>
    where
        F: FnMut(PassStats),
    {
        // Step 1: pick the texts to cluster and normalize them
        let selected = select_texts(documents, self.config.min_text_chars);
        let mut texts: Vec<&str> = Vec::with_capacity(selected.len());
        let mut token_docs: Vec<Vec<String>> = Vec::with_capacity(selected.len());
        let mut mappings = Vec::with_capacity(selected.len());
        for &text in &selected {
            let normalized = self.normalizer.normalize(text);
            if normalized.is_empty() {
                continue;
            }
            texts.push(text);
            token_docs.push(normalized.tokens);
            mappings.push(normalized.mapping);
        }
        info!(
            records = documents.len(),
            selected = selected.len(),
            considered = texts.len(),
            "Prepared corpus"
        );

        // Step 2: corpus-wide canonical -> original lookup
        let token_map = reconcile(&mappings);

        // Step 3: fit a new model or load the persisted one
        let model = match mode {
            Mode::Fit => {
                let model =
                    cluster::fit_with_progress(&token_docs, &self.config.fit_settings(), on_pass)?;
                store::save_model(self.store, &self.config.model_key, &model)?;
                model
            }
            Mode::Apply => store::load_model(self.store, &self.config.model_key)?,
        };

        // Step 4: best cluster for every considered text
        let scored: Vec<ScoredText<'_>> = texts
            .iter()
            .copied()
            .zip(&token_docs)
            .map(|(text, tokens)| ScoredText {
                text,
                assignment: cluster::score(tokens, &model),
            })
            .collect();

        // Step 5: readable keywords per cluster
        let corpus_dictionary;
        let corrector: &dyn SpellCorrector = match &self.corrector {
            Some(corrector) => corrector.as_ref(),
            None => {
                // Only kept words, so a rare word cannot be "corrected"
                // into a stopword.
                corpus_dictionary = SymSpell::from_words(
                    texts
                        .iter()
                        .flat_map(|t| self.normalizer.words(t))
                        .filter(|w| self.normalizer.keeps(w)),
                    SPELL_EDIT_DISTANCE,
                )
                .with_dominance(CORPUS_SPELL_DOMINANCE);
                &corpus_dictionary
            }
        };
        let keywords = LabelReconstructor::new(&self.normalizer, corrector, self.config.top_keywords)
            .reconstruct(&model, &texts, &token_map);

        // Step 6: topic table, with curated names in apply mode
        let mut topics = summarize(model.k(), &scored, &keywords, self.config.max_examples);
        if mode == Mode::Apply {
            match self.load_topic_names()? {
                Some(names) => topics = join_names(topics, &names),
                None => warn!(
                    key = %self.config.topic_names_key,
                    "No curated topic-name table in the store; topics stay unnamed"
                ),
            }
        }

        // Step 7: push labels back onto every input record
        let assigned: HashMap<&str, usize> = scored
            .iter()
            .map(|s| (s.text, s.assignment.cluster))
            .collect();
        let annotated = annotate(documents, &assigned, &topics);

        Ok(PipelineOutput {
            documents: annotated,
            topics,
            considered: texts.len(),
            model,
            token_map,
        })
    }

    fn load_topic_names(&self) -> Result<Option<TopicNames>> {
        match self.store.get(&self.config.topic_names_key)? {
            Some(bytes) => Ok(Some(TopicNames::from_csv(bytes.as_slice())?)),
            None => Ok(None),
        }
    }
}
