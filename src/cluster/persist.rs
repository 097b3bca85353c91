// Versioned model blob.
//
// Layout: 4-byte magic "MRMR", little-endian u32 format version, then a
// bincode body holding the training timestamp and the ClusterModel. Anything
// that does not decode cleanly, carries another version, or breaks the
// model's bookkeeping invariants is ModelCorrupt. There is no fallback to a
// default model and no attempt to read older layouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::ClusterModel;
use crate::error::{PipelineError, Result};

const MAGIC: &[u8; 4] = b"MRMR";
pub const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Serialize, Deserialize)]
struct Envelope {
    trained_at: DateTime<Utc>,
    model: ClusterModel,
}

/// Metadata readable from a blob without handing back the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub k: usize,
    pub alpha: f64,
    pub beta: f64,
    pub documents: usize,
    pub vocabulary: usize,
    pub populated_clusters: usize,
}

/// Serialize a model into an opaque, versioned blob.
pub fn save(model: &ClusterModel) -> Result<Vec<u8>> {
    let envelope = Envelope {
        trained_at: Utc::now(),
        model: model.clone(),
    };
    let body = bincode::serialize(&envelope)
        .map_err(|e| PipelineError::ModelCorrupt(format!("could not encode model: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a blob produced by `save`.
pub fn load(bytes: &[u8]) -> Result<ClusterModel> {
    let envelope = decode(bytes)?;
    info!(
        trained_at = %envelope.trained_at,
        k = envelope.model.k(),
        documents = envelope.model.document_count(),
        "Loaded topic model"
    );
    Ok(envelope.model)
}

/// Read a blob's metadata.
pub fn inspect(bytes: &[u8]) -> Result<ModelInfo> {
    let envelope = decode(bytes)?;
    let model = &envelope.model;
    Ok(ModelInfo {
        format_version: FORMAT_VERSION,
        trained_at: envelope.trained_at,
        k: model.k(),
        alpha: model.params().alpha,
        beta: model.params().beta,
        documents: model.document_count(),
        vocabulary: model.vocabulary().len(),
        populated_clusters: model.populated_clusters(),
    })
}

fn decode(bytes: &[u8]) -> Result<Envelope> {
    if bytes.len() < HEADER_LEN {
        return Err(PipelineError::ModelCorrupt(format!(
            "blob is {} bytes, shorter than the header",
            bytes.len()
        )));
    }
    if &bytes[..4] != MAGIC {
        return Err(PipelineError::ModelCorrupt(
            "not a murmur model (bad magic bytes)".to_string(),
        ));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[4..HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(PipelineError::ModelCorrupt(format!(
            "format version {version} is not supported (expected {FORMAT_VERSION})"
        )));
    }

    let envelope: Envelope = bincode::deserialize(&bytes[HEADER_LEN..])
        .map_err(|e| PipelineError::ModelCorrupt(format!("could not decode model: {e}")))?;
    envelope.model.validate().map_err(PipelineError::ModelCorrupt)?;
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::gsdmm::{fit, FitSettings};
    use crate::cluster::model::Hyperparameters;

    fn small_model() -> ClusterModel {
        let docs: Vec<Vec<String>> = vec![
            vec!["vaccin".into(), "help".into()],
            vec!["weather".into()],
        ];
        let settings = FitSettings {
            params: Hyperparameters {
                k: 2,
                alpha: 0.1,
                beta: 0.1,
            },
            iterations: 10,
            seed: 3,
        };
        fit(&docs, &settings).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let model = small_model();
        let loaded = load(&save(&model).unwrap()).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_truncated_blob_is_corrupt() {
        let bytes = save(&small_model()).unwrap();
        for cut in [0, 3, HEADER_LEN, bytes.len() - 1] {
            let result = load(&bytes[..cut]);
            assert!(
                matches!(result, Err(PipelineError::ModelCorrupt(_))),
                "truncation at {cut} should be corrupt"
            );
        }
    }

    #[test]
    fn test_wrong_version_is_corrupt() {
        let mut bytes = save(&small_model()).unwrap();
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(load(&bytes), Err(PipelineError::ModelCorrupt(_))));
    }

    #[test]
    fn test_inspect_reports_shape() {
        let info = inspect(&save(&small_model()).unwrap()).unwrap();
        assert_eq!(info.k, 2);
        assert_eq!(info.documents, 2);
        assert_eq!(info.vocabulary, 3);
        assert_eq!(info.format_version, FORMAT_VERSION);
    }
}
