// Model store trait: byte blobs under string keys.
//
// The clustering core never picks a storage backend. It gets something that
// can hand back bytes for a key (or say there are none) and accept bytes for
// a key. Implementors: FileModelStore (a local directory) and
// MemoryModelStore (tests, embedding). A blob-storage backend would slot in
// behind the same interface.

use crate::error::Result;

pub trait ModelStore: Send + Sync {
    /// Fetch the blob stored under `key`. `Ok(None)` means not found.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `bytes` under `key`, replacing whatever was there.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
}
