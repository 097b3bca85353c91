// Mapping reconciler: merge per-document provenance into a corpus lookup.
//
// Within one document a canonical token maps to whichever word was seen last.
// Across the corpus we can do better: count how often each (canonical,
// original) pair occurs and let the majority win. Ties go to whichever
// original was seen first, so the result is deterministic for a fixed corpus
// order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::normalize::DocumentMapping;

/// Corpus-wide canonical -> original lookups. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    /// Canonical token -> most frequently paired original word
    pub one_to_one: BTreeMap<String, String>,
    /// Canonical token -> every original word ever paired with it
    pub one_to_many: BTreeMap<String, BTreeSet<String>>,
}

impl TokenMap {
    pub fn best(&self, canonical: &str) -> Option<&str> {
        self.one_to_one.get(canonical).map(|s| s.as_str())
    }

    pub fn originals(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.one_to_many.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.one_to_one.len()
    }

    pub fn is_empty(&self) -> bool {
        self.one_to_one.is_empty()
    }
}

/// Reconcile per-document mappings into a corpus `TokenMap`.
pub fn reconcile<'a, I>(mappings: I) -> TokenMap
where
    I: IntoIterator<Item = &'a DocumentMapping>,
{
    // canonical -> (original, count), in first-seen order per canonical
    let mut tallies: HashMap<String, Vec<(String, usize)>> = HashMap::new();

    for mapping in mappings {
        for (canonical, original) in mapping.iter() {
            let tally = tallies.entry(canonical.to_string()).or_default();
            match tally.iter_mut().find(|(o, _)| o == original) {
                Some(entry) => entry.1 += 1,
                None => tally.push((original.to_string(), 1)),
            }
        }
    }

    let mut map = TokenMap::default();
    for (canonical, tally) in tallies {
        // Strictly greater keeps the earliest original on a tie.
        let mut best: Option<&(String, usize)> = None;
        for entry in &tally {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        if let Some((original, _)) = best {
            map.one_to_one.insert(canonical.clone(), original.clone());
        }
        map.one_to_many.insert(
            canonical,
            tally.into_iter().map(|(original, _)| original).collect(),
        );
    }
    map
}
