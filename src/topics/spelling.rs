// Spelling correction for reconstructed keywords.
//
// Symmetric-delete lookup (SymSpell): every dictionary word is indexed under
// all the strings reachable by deleting up to `max_edit_distance` characters.
// A query generates its own deletes and intersects, so lookup cost depends on
// the word length rather than the dictionary size. Candidates are then ranked
// by true edit distance, then frequency.
//
// A dictionary counted from the corpus being labeled contains that corpus's
// typos too. With a dominance ratio set, a known word is still replaced by a
// neighbour at least that many times more frequent and sharing its first
// letter, so "vacine" seen once next to "vaccine" seen four times becomes
// "vaccine".

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use anyhow::{Context, Result};

/// Returns the most likely correct spelling of a word.
pub trait SpellCorrector: Send + Sync {
    /// `word` itself when it is already correct or nothing better is known.
    fn correct(&self, word: &str) -> String;
}

/// Leaves every word as is.
pub struct IdentityCorrector;

impl SpellCorrector for IdentityCorrector {
    fn correct(&self, word: &str) -> String {
        word.to_string()
    }
}

pub struct SymSpell {
    /// Delete variant -> ids of the dictionary words it came from
    deletes: HashMap<String, HashSet<usize>>,
    /// (word, frequency) by id
    words: Vec<(String, u64)>,
    index: HashMap<String, usize>,
    max_edit_distance: usize,
    /// Frequency ratio over which a known word yields to a neighbour
    dominance: Option<u64>,
}

impl SymSpell {
    pub fn new(max_edit_distance: usize) -> Self {
        Self {
            deletes: HashMap::new(),
            words: Vec::new(),
            index: HashMap::new(),
            max_edit_distance,
            dominance: None,
        }
    }

    /// Let known words be corrected to neighbours `ratio` times more
    /// frequent. Ratios below 2 are raised to 2.
    pub fn with_dominance(mut self, ratio: u64) -> Self {
        self.dominance = Some(ratio.max(2));
        self
    }

    /// Build a dictionary by counting the given words.
    pub fn from_words<I, S>(words: I, max_edit_distance: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spell = Self::new(max_edit_distance);
        for word in words {
            spell.add_word(word.as_ref(), 1);
        }
        spell
    }

    /// Load a frequency dictionary: one `word count` pair per line.
    /// A line with just a word counts as 1; blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R, max_edit_distance: usize) -> Result<Self> {
        let mut spell = Self::new(max_edit_distance);
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read dictionary line {}", line_no + 1))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let count = match parts.next() {
                Some(raw) => raw.parse::<u64>().with_context(|| {
                    format!("Bad frequency '{raw}' on dictionary line {}", line_no + 1)
                })?,
                None => 1,
            };
            spell.add_word(&word.to_lowercase(), count);
        }
        Ok(spell)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Add `count` occurrences of `word`, indexing it on first sight.
    pub fn add_word(&mut self, word: &str, count: u64) {
        if word.is_empty() {
            return;
        }
        if let Some(&id) = self.index.get(word) {
            self.words[id].1 += count;
            return;
        }
        let id = self.words.len();
        self.words.push((word.to_string(), count));
        self.index.insert(word.to_string(), id);
        for edit in self.generate_edits(word) {
            self.deletes.entry(edit).or_default().insert(id);
        }
    }

    /// Ids of every dictionary word sharing a delete variant with `input`.
    fn lookup(&self, input: &str) -> HashSet<usize> {
        let mut candidates = HashSet::new();
        for edit in self.generate_edits(input) {
            if let Some(ids) = self.deletes.get(&edit) {
                candidates.extend(ids.iter().copied());
            }
        }
        candidates
    }

    /// All strings within `max_edit_distance` deletions, including the word.
    fn generate_edits(&self, word: &str) -> HashSet<String> {
        let mut edits = HashSet::new();
        edits.insert(word.to_string());

        let mut current: HashSet<String> = edits.clone();
        for _ in 0..self.max_edit_distance {
            let mut next = HashSet::new();
            for edit in &current {
                let chars: Vec<char> = edit.chars().collect();
                for i in 0..chars.len() {
                    let variant: String = chars
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, c)| c)
                        .collect();
                    next.insert(variant);
                }
            }
            edits.extend(next.iter().cloned());
            current = next;
        }
        edits
    }
}

impl SpellCorrector for SymSpell {
    fn correct(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        let known_freq = self.index.get(&lower).map(|&id| self.words[id].1);
        let min_freq = match (known_freq, self.dominance) {
            (None, _) => 0,
            (Some(_), None) => return word.to_string(),
            (Some(freq), Some(ratio)) => freq.saturating_mul(ratio),
        };
        let first = lower.chars().next();

        let best = self
            .lookup(&lower)
            .into_iter()
            .map(|id| {
                let (candidate, freq) = &self.words[id];
                (edit_distance(&lower, candidate), *freq, candidate)
            })
            .filter(|(distance, freq, candidate)| {
                *distance <= self.max_edit_distance
                    && *freq >= min_freq
                    && (known_freq.is_none() || candidate.chars().next() == first)
            })
            .min_by(|a, b| {
                a.0.cmp(&b.0)
                    .then_with(|| b.1.cmp(&a.1))
                    .then_with(|| a.2.cmp(b.2))
            });

        match best {
            Some((_, _, candidate)) => candidate.clone(),
            None => word.to_string(),
        }
    }
}

/// Optimal string alignment distance (Levenshtein plus adjacent swaps).
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut d = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        d[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }
    d[a.len()][b.len()]
}
