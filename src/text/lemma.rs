// Verb-sense lemmatization.
//
// Runs before the stemmer. The Snowball stemmer already folds regular
// inflections ("helping", "helped", "helps" -> "help"), so the lemmatizer only
// has to handle what suffix stripping cannot: irregular verb forms. Without it
// "took" and "taking" would land on different canonical tokens.

use std::collections::HashMap;

/// Maps an inflected word to its lemma. Swap-ready so a dictionary-backed
/// lemmatizer can replace the exception table later.
pub trait Lemmatizer: Send + Sync {
    /// Return the verb lemma for `word`, or `word` unchanged if unknown.
    fn lemmatize(&self, word: &str) -> String;
}

/// Irregular verb forms and their lemmas.
const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("am", "be"), ("are", "be"), ("been", "be"), ("being", "be"), ("is", "be"),
    ("was", "be"), ("were", "be"),
    ("ate", "eat"), ("eaten", "eat"),
    ("began", "begin"), ("begun", "begin"),
    ("bought", "buy"), ("brought", "bring"), ("built", "build"),
    ("caught", "catch"), ("chose", "choose"), ("chosen", "choose"),
    ("came", "come"),
    ("did", "do"), ("does", "do"), ("done", "do"),
    ("drew", "draw"), ("drawn", "draw"),
    ("drove", "drive"), ("driven", "drive"),
    ("dying", "die"),
    ("fell", "fall"), ("fallen", "fall"),
    ("felt", "feel"), ("fought", "fight"), ("found", "find"),
    ("flew", "fly"), ("flown", "fly"),
    ("forgot", "forget"), ("forgotten", "forget"),
    ("gave", "give"), ("given", "give"),
    ("went", "go"), ("gone", "go"), ("goes", "go"),
    ("got", "get"), ("gotten", "get"),
    ("grew", "grow"), ("grown", "grow"),
    ("had", "have"), ("has", "have"), ("having", "have"),
    ("heard", "hear"), ("held", "hold"),
    ("kept", "keep"), ("knew", "know"), ("known", "know"),
    ("led", "lead"), ("left", "leave"), ("lost", "lose"),
    ("lying", "lie"),
    ("made", "make"), ("meant", "mean"), ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"), ("rode", "ride"), ("ridden", "ride"),
    ("rose", "rise"), ("risen", "rise"),
    ("said", "say"), ("saw", "see"), ("seen", "see"),
    ("sent", "send"), ("shot", "shoot"), ("sold", "sell"),
    ("sat", "sit"), ("slept", "sleep"),
    ("spoke", "speak"), ("spoken", "speak"), ("spent", "spend"),
    ("stood", "stand"), ("stole", "steal"), ("stolen", "steal"),
    ("struck", "strike"),
    ("taught", "teach"), ("took", "take"), ("taken", "take"),
    ("thought", "think"), ("threw", "throw"), ("thrown", "throw"),
    ("told", "tell"), ("tore", "tear"), ("torn", "tear"),
    ("tying", "tie"),
    ("understood", "understand"),
    ("woke", "wake"), ("woken", "wake"),
    ("wore", "wear"), ("worn", "wear"), ("won", "win"),
    ("wrote", "write"), ("written", "write"),
];

/// Exception-table lemmatizer for English verbs.
pub struct VerbLemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
}

impl VerbLemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: IRREGULAR_VERBS.iter().copied().collect(),
        }
    }
}

impl Default for VerbLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for VerbLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        self.exceptions
            .get(word)
            .map(|lemma| lemma.to_string())
            .unwrap_or_else(|| word.to_string())
    }
}
