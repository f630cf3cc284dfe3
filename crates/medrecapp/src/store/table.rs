use super::backend::StorageBackend;
use super::record_store::RecordStore;
use crate::codec::{self, CsvRecord, Diagnostic};
use crate::error::Result;
use std::path::PathBuf;

/// A [`RecordStore`] bound to its file.
///
/// The table is loaded once when opened. After that memory is authoritative and every
/// change is written through [`Table::transact`].
pub struct Table<T: CsvRecord, B: StorageBackend> {
    store: RecordStore<T>,
    backend: B,
}

impl<T: CsvRecord, B: StorageBackend> Table<T, B> {
    /// Loads the table, returning whatever the decoder had to say about the file.
    ///
    /// A missing file is an empty table. Only backend I/O failures are errors.
    pub fn open(backend: B, id_floor: u64) -> Result<(Self, Vec<Diagnostic>)> {
        let (records, diagnostics) = match backend.load(T::KIND)? {
            Some(text) => {
                let decoded = codec::decode::<T>(&text);
                (decoded.records, decoded.diagnostics)
            }
            None => (Vec::new(), Vec::new()),
        };

        let kind = T::KIND;
        tracing::debug!(
            kind = %kind,
            records = records.len(),
            diagnostics = diagnostics.len(),
            path = %backend.location(T::KIND).display(),
            "opened table"
        );

        let table = Self {
            store: RecordStore::from_records(records, id_floor),
            backend,
        };
        Ok((table, diagnostics))
    }

    pub fn records(&self) -> &RecordStore<T> {
        &self.store
    }

    pub fn location(&self) -> PathBuf {
        self.backend.location(T::KIND)
    }

    /// Applies `change` to a copy of the store, persists the copy, then adopts it.
    ///
    /// If `change` fails or the write fails, the table is left exactly as it was.
    pub fn transact<R, F>(&mut self, change: F) -> Result<R>
    where
        F: FnOnce(&mut RecordStore<T>) -> Result<R>,
    {
        let mut next = self.store.clone();
        let out = change(&mut next)?;

        self.backend.save(T::KIND, &codec::encode(next.all()))?;
        let kind = T::KIND;
        tracing::debug!(kind = %kind, records = next.len(), "saved table");

        self.store = next;
        Ok(out)
    }
}
