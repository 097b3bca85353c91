// Unit tests for keyword reconstruction, spelling, names and the topic table.
//
// Tests isolated pieces of the topics layer against a small fitted model:
// LabelReconstructor output shape, SymSpell ranking, TopicNames parsing and
// summarize/annotate bookkeeping.

use std::collections::{HashMap, HashSet};

use murmur::cluster::{self, Assignment, FitSettings, Hyperparameters};
use murmur::pipeline::Document;
use murmur::text::mapping::reconcile;
use murmur::text::normalize::Normalizer;
use murmur::topics::labels::LabelReconstructor;
use murmur::topics::names::TopicNames;
use murmur::topics::spelling::{IdentityCorrector, SpellCorrector, SymSpell};
use murmur::topics::summary::{annotate, join_names, summarize, ScoredText};

fn normalizer() -> Normalizer {
    let stopwords: HashSet<String> = ["the", "with", "and"].iter().map(|s| s.to_string()).collect();
    Normalizer::new(stopwords, vec![])
}

// ============================================================
// LabelReconstructor
// ============================================================

#[test]
fn keywords_are_real_corpus_words() {
    let n = normalizer();
    let texts = [
        "vaccines helping people",
        "the vaccine helps",
        "weather turning nicer",
    ];
    let normalized: Vec<_> = texts.iter().map(|t| n.normalize(t)).collect();
    let token_docs: Vec<Vec<String>> = normalized.iter().map(|d| d.tokens.clone()).collect();
    let token_map = reconcile(normalized.iter().map(|d| &d.mapping));

    let settings = FitSettings {
        params: Hyperparameters {
            k: 3,
            alpha: 0.1,
            beta: 0.1,
        },
        iterations: 20,
        seed: 11,
    };
    let model = cluster::fit(&token_docs, &settings).unwrap();

    let corrector = IdentityCorrector;
    let keywords = LabelReconstructor::new(&n, &corrector, 5).reconstruct(&model, &texts, &token_map);

    assert_eq!(keywords.len(), model.k(), "one keyword list per cluster");
    let corpus_words: HashSet<String> = texts.iter().flat_map(|t| n.words(t)).collect();
    for (cluster, words) in keywords.iter().enumerate() {
        let held = model.clusters()[cluster].word_counts.len();
        assert_eq!(words.len(), held.min(5));
        for word in words {
            assert!(corpus_words.contains(word), "'{word}' is not a corpus word");
        }
    }
}

#[test]
fn stem_without_corpus_match_is_kept() {
    let n = normalizer();
    let model = cluster::fit(
        &[vec!["vaccin".to_string()]],
        &FitSettings {
            params: Hyperparameters {
                k: 1,
                alpha: 0.1,
                beta: 0.1,
            },
            iterations: 1,
            seed: 0,
        },
    )
    .unwrap();

    // The corpus handed to reconstruction never mentions vaccines.
    let corrector = IdentityCorrector;
    let keywords = LabelReconstructor::new(&n, &corrector, 5).reconstruct(
        &model,
        &["nothing relevant"],
        &Default::default(),
    );
    assert_eq!(keywords, vec![vec!["vaccin".to_string()]]);
}

// ============================================================
// SymSpell
// ============================================================

#[test]
fn corpus_dictionary_fixes_rare_misspelling() {
    let words = ["vaccine", "vaccine", "vaccine", "vaccine", "vacine", "people"];
    let spell = SymSpell::from_words(words, 2).with_dominance(4);
    assert_eq!(spell.correct("vacine"), "vaccine");
    assert_eq!(spell.correct("vaccne"), "vaccine");
    assert_eq!(spell.correct("people"), "people");
    assert_eq!(spell.len(), 3);
}

#[test]
fn plain_dictionary_trusts_known_words() {
    let words = ["vaccine", "vaccine", "vaccine", "vaccine", "vacine"];
    let spell = SymSpell::from_words(words, 2);
    assert_eq!(spell.correct("vacine"), "vacine");
}

#[test]
fn correction_never_strays_past_max_distance() {
    let spell = SymSpell::from_words(["weather"], 1);
    assert_eq!(spell.correct("wethr"), "wethr");
    assert_eq!(spell.correct("weathr"), "weather");
}

// ============================================================
// TopicNames
// ============================================================

#[test]
fn names_table_tolerates_extra_columns() {
    let csv = "topic number,topic,keywords,example,frequency (%),number of responses\n\
               1.0,vaccine access,\"vaccine, help\",vaccines help,50.00,2\n\
               0,,weather,nice day,50.00,2\n";
    let names = TopicNames::from_csv(csv.as_bytes()).unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names.get(1), Some("vaccine access"));
    assert_eq!(names.get(0), None);
}

#[test]
fn names_table_requires_topic_number_column() {
    let csv = "cluster,topic\n0,weather\n";
    assert!(TopicNames::from_csv(csv.as_bytes()).is_err());
}

// ============================================================
// summarize / annotate
// ============================================================

fn scored(text: &str, cluster: usize) -> ScoredText<'_> {
    ScoredText {
        text,
        assignment: Assignment {
            cluster,
            score: 0.9,
        },
    }
}

#[test]
fn frequencies_sum_to_one_hundred() {
    let docs = vec![
        scored("one", 0),
        scored("two", 1),
        scored("three", 1),
        scored("four", 2),
        scored("five", 1),
        scored("six", 0),
    ];
    let table = summarize(4, &docs, &[], 10);
    let total: f64 = table.iter().map(|t| t.frequency_pct).sum();
    assert!((total - 100.0).abs() < 1e-9, "frequencies sum to {total}");
    let responses: usize = table.iter().map(|t| t.responses).sum();
    assert_eq!(responses, docs.len());
    assert!(table.windows(2).all(|w| w[0].frequency_pct >= w[1].frequency_pct));
}

#[test]
fn examples_are_capped() {
    let texts: Vec<String> = (0..15).map(|i| format!("response number {i}")).collect();
    let docs: Vec<ScoredText<'_>> = texts.iter().map(|t| scored(t, 0)).collect();
    let table = summarize(1, &docs, &[], 10);
    assert_eq!(table[0].examples.len(), 10);
    assert_eq!(table[0].responses, 15);
}

#[test]
fn annotate_labels_duplicates_and_skips_unconsidered() {
    let documents = vec![
        Document::new("a", "vaccines help people"),
        Document::new("b", "vaccines help people"),
        Document::new("c", "ok"),
        Document {
            id: "d".into(),
            text: None,
        },
    ];
    let scored_docs = vec![scored("vaccines help people", 1)];
    let names: TopicNames = [(1usize, "vaccine access".to_string())].into_iter().collect();
    let topics = join_names(summarize(2, &scored_docs, &[], 10), &names);

    let assigned: HashMap<&str, usize> = [("vaccines help people", 1usize)].into_iter().collect();
    let annotated = annotate(&documents, &assigned, &topics);

    assert_eq!(annotated.len(), documents.len());
    assert_eq!(annotated[0].cluster, Some(1));
    assert_eq!(annotated[1].topic.as_deref(), Some("vaccine access"));
    assert_eq!(annotated[2].cluster, None);
    assert_eq!(annotated[3].cluster, None);
    assert_eq!(annotated[3].topic, None);
}
