use super::backend::StorageBackend;
use crate::error::{MedrecError, Result};
use crate::model::RecordKind;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
    keep_backups: bool,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            keep_backups: true,
        }
    }

    pub fn with_backups(mut self, keep_backups: bool) -> Self {
        self.keep_backups = keep_backups;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the copy taken before the file for `kind` is overwritten.
    pub fn backup_path(&self, kind: RecordKind) -> PathBuf {
        self.root.join(format!("{}.bak", kind.file_name()))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|source| MedrecError::Persistence {
                path: self.root.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Copies the current file aside. Failure is logged and otherwise ignored.
    fn backup(&self, kind: RecordKind, target: &Path) {
        if !self.keep_backups || !target.exists() {
            return;
        }
        let backup = self.backup_path(kind);
        if let Err(e) = fs::copy(target, &backup) {
            tracing::warn!(path = %backup.display(), error = %e, "could not write backup");
        }
    }
}

fn persist_error(path: &Path) -> impl FnOnce(io::Error) -> MedrecError + '_ {
    move |source| MedrecError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

impl StorageBackend for FsBackend {
    fn load(&self, kind: RecordKind) -> Result<Option<String>> {
        let path = self.location(kind);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(persist_error(&path))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded file");

        // Files written by other tools may use a legacy charset. Invalid sequences
        // become U+FFFD and the decoder flags the rows that contain them.
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    offset = e.utf8_error().valid_up_to(),
                    "file is not valid UTF-8, replacing invalid bytes"
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(text))
    }

    fn save(&self, kind: RecordKind, text: &str) -> Result<()> {
        self.ensure_dir()?;
        let target = self.location(kind);

        self.backup(kind, &target);

        // Atomic write
        let tmp = self
            .root
            .join(format!(".{}-{}.tmp", kind.noun(), Uuid::new_v4()));
        fs::write(&tmp, text).map_err(persist_error(&target))?;
        if let Err(source) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(MedrecError::Persistence {
                path: target,
                source,
            });
        }

        tracing::debug!(path = %target.display(), bytes = text.len(), "saved file");
        Ok(())
    }

    fn location(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.file_name())
    }
}
