// FileModelStore — one file per key inside a directory.
//
// Writes go to a temp file in the same directory and are renamed into place,
// so a crash mid-write never leaves a half-written model behind for the next
// apply run to trip over.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::traits::ModelStore;
use crate::error::{PipelineError, Result};

pub struct FileModelStore {
    root: PathBuf,
}

impl FileModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if !plain {
            return Err(PipelineError::config(format!(
                "model store key '{key}' must be a plain file name"
            )));
        }
        Ok(self.root.join(key))
    }
}

impl ModelStore for FileModelStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Read blob");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        let mut temp_file = NamedTempFile::new_in(&self.root)?;
        temp_file.write_all(bytes)?;
        temp_file.flush()?;
        temp_file.persist(&path).map_err(|e| e.error)?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote blob");
        Ok(())
    }
}
