use super::backend::StorageBackend;
use crate::error::{MedrecError, Result};
use crate::model::RecordKind;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

/// In-memory storage backend for testing.
///
/// Clones share the same files, so one backend can be handed to every table and still
/// be inspected from the test afterwards. Uses `Rc<RefCell<_>>` since the records
/// service is single-threaded.
#[derive(Clone, Default)]
pub struct MemBackend {
    files: Rc<RefCell<HashMap<RecordKind, String>>>,
    simulate_write_error: Rc<RefCell<bool>>,
    failing_kinds: Rc<RefCell<HashSet<RecordKind>>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the text for `kind`, as if it had been saved earlier.
    pub fn with_file(self, kind: RecordKind, text: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(kind, text.into());
        self
    }

    /// Current text for `kind`, if any.
    pub fn contents(&self, kind: RecordKind) -> Option<String> {
        self.files.borrow().get(&kind).cloned()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Makes saves of `kind` alone fail, for operations that write several files.
    pub fn fail_writes_for(&self, kind: RecordKind) {
        self.failing_kinds.borrow_mut().insert(kind);
    }
}

impl StorageBackend for MemBackend {
    fn load(&self, kind: RecordKind) -> Result<Option<String>> {
        Ok(self.contents(kind))
    }

    fn save(&self, kind: RecordKind, text: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() || self.failing_kinds.borrow().contains(&kind) {
            return Err(MedrecError::Persistence {
                path: self.location(kind),
                source: io::Error::other("Simulated write error"),
            });
        }
        self.files.borrow_mut().insert(kind, text.to_string());
        Ok(())
    }

    fn location(&self, kind: RecordKind) -> PathBuf {
        PathBuf::from(format!("memory://{}", kind.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_files() {
        let backend = MemBackend::new();
        let other = backend.clone();
        other.save(RecordKind::Bill, "x\n").unwrap();
        assert_eq!(backend.contents(RecordKind::Bill).as_deref(), Some("x\n"));
    }

    #[test]
    fn failures_can_target_one_kind() {
        let backend = MemBackend::new();
        backend.fail_writes_for(RecordKind::Bill);
        assert!(backend.save(RecordKind::Bill, "x\n").is_err());
        assert!(backend.save(RecordKind::Payment, "y\n").is_ok());
    }

    #[test]
    fn simulated_error_keeps_previous_text() {
        let backend = MemBackend::new().with_file(RecordKind::Patient, "old\n");
        backend.set_simulate_write_error(true);
        let err = backend.save(RecordKind::Patient, "new\n").unwrap_err();
        assert!(err.to_string().contains("memory://patients.csv"));
        assert_eq!(
            backend.load(RecordKind::Patient).unwrap().as_deref(),
            Some("old\n")
        );
    }
}
