// Normalizer — raw text to canonical (lemmatized + stemmed) tokens.
//
// Each surviving token also records which literal word it came from, so the
// clustering vocabulary ("vaccin", "peopl") can be turned back into readable
// words once topics are found. The mapping is per document only: the
// corpus-wide reconciliation happens in `mapping.rs`.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::{get, LANGUAGE};

use super::clean::clean_text;
use super::lemma::{Lemmatizer, VerbLemmatizer};
use crate::config::Config;

/// Shortest and longest word the tokenizer emits before filtering.
const MIN_WORD_CHARS: usize = 2;
const MAX_WORD_CHARS: usize = 15;

/// Tokens this short or shorter never survive normalization.
pub const MAX_DISCARDED_CHARS: usize = 2;

/// One surviving token: the canonical form and the word it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedToken {
    pub canonical: String,
    pub original: String,
}

/// Canonical token -> original word for a single document.
///
/// If two words in the same document stem to the same token, the later one
/// wins but keeps the earlier one's position in the iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMapping {
    pairs: Vec<(String, String)>,
}

impl DocumentMapping {
    pub fn insert(&mut self, canonical: &str, original: &str) {
        match self.pairs.iter_mut().find(|(c, _)| c == canonical) {
            Some(pair) => pair.1 = original.to_string(),
            None => self.pairs.push((canonical.to_string(), original.to_string())),
        }
    }

    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(c, _)| c == canonical)
            .map(|(_, o)| o.as_str())
    }

    /// (canonical, original) pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(c, o)| (c.as_str(), o.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Result of normalizing one document.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDocument {
    /// Canonical tokens in text order, repeats kept
    pub tokens: Vec<String>,
    pub mapping: DocumentMapping,
}

impl NormalizedDocument {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub struct Normalizer {
    stemmer: Stemmer,
    lemmatizer: Box<dyn Lemmatizer>,
    stopwords: HashSet<String>,
    noise: Vec<String>,
}

impl Normalizer {
    /// Build a normalizer with an explicit stopword set.
    pub fn new(stopwords: HashSet<String>, noise: Vec<String>) -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            lemmatizer: Box::new(VerbLemmatizer::new()),
            stopwords,
            noise,
        }
    }

    /// English stopwords from the stop-words crate plus domain extensions.
    pub fn english(extra_stopwords: &[String], noise: Vec<String>) -> Self {
        let mut stopwords: HashSet<String> = get(LANGUAGE::English)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        stopwords.extend(extra_stopwords.iter().map(|w| w.to_lowercase()));
        Self::new(stopwords, noise)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::english(&config.extra_stopwords, config.noise_substrings.clone())
    }

    pub fn with_lemmatizer(mut self, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        self.lemmatizer = lemmatizer;
        self
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Cleaned, lowercased alphabetic words of `text`, before any filtering.
    pub fn words(&self, text: &str) -> Vec<String> {
        clean_text(text)
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| {
                let len = w.chars().count();
                (MIN_WORD_CHARS..=MAX_WORD_CHARS).contains(&len)
            })
            .map(String::from)
            .collect()
    }

    /// Whether a word survives the length, noise and stopword filters.
    pub fn keeps(&self, word: &str) -> bool {
        word.chars().count() > MAX_DISCARDED_CHARS
            && !self.noise.iter().any(|n| word.contains(n.as_str()))
            && !self.is_stopword(word)
    }

    /// Lemmatize as a verb, then stem.
    pub fn canonical(&self, word: &str) -> String {
        let lemma = self.lemmatizer.lemmatize(word);
        self.stemmer.stem(&lemma).into_owned()
    }

    /// Lazily yield the surviving tokens of `text`. Calling it again on the
    /// same text restarts from the beginning.
    ///
    /// Filters run on the word and again on its canonical form: lemmatizing
    /// can shrink a kept word ("went" -> "go") or turn it into a stopword.
    pub fn tokens<'a>(&'a self, text: &str) -> impl Iterator<Item = NormalizedToken> + 'a {
        self.words(text)
            .into_iter()
            .filter(move |w| self.keeps(w))
            .filter_map(move |original| {
                let canonical = self.canonical(&original);
                self.keeps(&canonical)
                    .then_some(NormalizedToken { canonical, original })
            })
    }

    /// Normalize a whole document into tokens plus its provenance mapping.
    /// A document with no surviving tokens comes back empty, not as an error.
    pub fn normalize(&self, text: &str) -> NormalizedDocument {
        let mut doc = NormalizedDocument::default();
        for token in self.tokens(text) {
            doc.mapping.insert(&token.canonical, &token.original);
            doc.tokens.push(token.canonical);
        }
        doc
    }
}
