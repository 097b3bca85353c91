use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::cluster::gsdmm::FitSettings;
use crate::cluster::model::Hyperparameters;
use crate::error::{PipelineError, Result};

/// Default cluster capacity, priors and pass count used for the production fit.
pub const DEFAULT_K: usize = 6;
pub const DEFAULT_ALPHA: f64 = 0.3;
pub const DEFAULT_BETA: f64 = 0.05;
pub const DEFAULT_ITERATIONS: usize = 500;
pub const DEFAULT_SEED: u64 = 2018;

/// Central configuration, parsed from opaque key/value pairs.
///
/// `load()` reads the process environment (the CLI loads `.env` through
/// dotenvy first). Tests and embedders build one with `from_pairs` so no
/// global state is involved. Nothing here is a secret: the model store
/// location is a plain directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub k: usize,
    pub alpha: f64,
    pub beta: f64,
    pub iterations: usize,
    pub seed: u64,
    /// Domain stopwords appended to the base English list
    pub extra_stopwords: Vec<String>,
    /// Tokens containing any of these substrings are dropped (e.g. "haha")
    pub noise_substrings: Vec<String>,
    /// Texts with this many characters or fewer are not clustered
    pub min_text_chars: usize,
    pub top_keywords: usize,
    pub max_examples: usize,
    /// Directory backing the file model store
    pub model_dir: PathBuf,
    pub model_key: String,
    pub topic_names_key: String,
    pub id_column: String,
    pub text_column: String,
    /// Optional `word count` frequency list for the spelling corrector
    pub spell_dictionary: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_pairs(env::vars())
    }

    /// Parse configuration from key/value pairs. Unknown keys are ignored;
    /// every recognised key has a default.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let config = Self {
            k: parse_or(get("MURMUR_K"), "MURMUR_K", DEFAULT_K)?,
            alpha: parse_or(get("MURMUR_ALPHA"), "MURMUR_ALPHA", DEFAULT_ALPHA)?,
            beta: parse_or(get("MURMUR_BETA"), "MURMUR_BETA", DEFAULT_BETA)?,
            iterations: parse_or(get("MURMUR_ITERATIONS"), "MURMUR_ITERATIONS", DEFAULT_ITERATIONS)?,
            seed: parse_or(get("MURMUR_SEED"), "MURMUR_SEED", DEFAULT_SEED)?,
            extra_stopwords: split_list(get("MURMUR_EXTRA_STOPWORDS").unwrap_or("")),
            noise_substrings: match get("MURMUR_NOISE") {
                Some(list) => split_list(list),
                None => vec!["haha".to_string()],
            },
            min_text_chars: parse_or(get("MURMUR_MIN_TEXT_CHARS"), "MURMUR_MIN_TEXT_CHARS", 4)?,
            top_keywords: parse_or(get("MURMUR_TOP_KEYWORDS"), "MURMUR_TOP_KEYWORDS", 5)?,
            max_examples: parse_or(get("MURMUR_MAX_EXAMPLES"), "MURMUR_MAX_EXAMPLES", 10)?,
            model_dir: get("MURMUR_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_model_dir),
            model_key: get("MURMUR_MODEL_KEY")
                .unwrap_or("topic_model.bin")
                .to_string(),
            topic_names_key: get("MURMUR_TOPIC_NAMES_KEY")
                .unwrap_or("keys_to_topics.csv")
                .to_string(),
            id_column: get("MURMUR_ID_COLUMN").unwrap_or("id").to_string(),
            text_column: get("MURMUR_TEXT_COLUMN").unwrap_or("text").to_string(),
            spell_dictionary: get("MURMUR_SPELL_DICTIONARY").map(PathBuf::from),
        };

        config.hyperparameters().validate()?;
        Ok(config)
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            k: self.k,
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    pub fn fit_settings(&self) -> FitSettings {
        FitSettings {
            params: self.hyperparameters(),
            iterations: self.iterations,
            seed: self.seed,
        }
    }
}

/// Returns the default directory for persisted models.
/// Uses the platform data directory: ~/.local/share/murmur/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("murmur")
        .join("models")
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, key: &str, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| PipelineError::config(format!("{key} has an invalid value: '{value}'"))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = Config::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.k, DEFAULT_K);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.noise_substrings, vec!["haha".to_string()]);
        assert_eq!(config.text_column, "text");
    }

    #[test]
    fn test_parses_overrides() {
        let config = Config::from_pairs([
            ("MURMUR_K", "3"),
            ("MURMUR_ALPHA", "0.1"),
            ("MURMUR_EXTRA_STOPWORDS", "Covid, vaccine ,,says"),
            ("UNRELATED", "ignored"),
        ])
        .unwrap();
        assert_eq!(config.k, 3);
        assert!((config.alpha - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.extra_stopwords, vec!["covid", "vaccine", "says"]);
    }

    #[test]
    fn test_rejects_bad_hyperparameters() {
        for (key, value) in [("MURMUR_K", "0"), ("MURMUR_BETA", "-1"), ("MURMUR_ALPHA", "abc")] {
            let result = Config::from_pairs([(key, value)]);
            assert!(
                matches!(result, Err(PipelineError::Configuration(_))),
                "{key}={value} should be a configuration error"
            );
        }
    }
}
