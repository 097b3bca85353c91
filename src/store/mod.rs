// Model store — where fitted models and the curated topic-name table live.
//
// The file store is the default; the directory comes from MURMUR_MODEL_DIR
// (defaults to the platform data dir).

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileModelStore;
pub use memory::MemoryModelStore;
pub use traits::ModelStore;

use tracing::info;

use crate::cluster::{self, ClusterModel};
use crate::error::{PipelineError, Result};

/// Load and decode the model stored under `key`.
///
/// A missing blob is ModelNotFound; there is no silent retrain.
pub fn load_model(store: &dyn ModelStore, key: &str) -> Result<ClusterModel> {
    let bytes = store
        .get(key)?
        .ok_or_else(|| PipelineError::ModelNotFound(key.to_string()))?;
    cluster::load(&bytes)
}

/// Encode `model` and store it under `key`.
pub fn save_model(store: &dyn ModelStore, key: &str, model: &ClusterModel) -> Result<()> {
    let bytes = cluster::save(model)?;
    store.put(key, &bytes)?;
    info!(key, bytes = bytes.len(), "Saved topic model");
    Ok(())
}
