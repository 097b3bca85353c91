// Text normalization: cleaning, lemmatizing, stemming and provenance.

pub mod clean;
pub mod lemma;
pub mod mapping;
pub mod normalize;
