use crate::error::Result;
use crate::model::RecordKind;
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
/// The backend moves whole files of text; it knows nothing about rows or records.
pub trait StorageBackend {
    /// Read the stored text for `kind`.
    /// Returns Ok(None) if nothing has been stored yet.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn load(&self, kind: RecordKind) -> Result<Option<String>>;

    /// Replace the stored text for `kind`.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, kind: RecordKind, text: &str) -> Result<()>;

    /// Where the text for `kind` lives.
    /// For FsBackend, this is the real path. For MemBackend, a virtual path.
    fn location(&self, kind: RecordKind) -> PathBuf;
}
