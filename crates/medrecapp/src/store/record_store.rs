use crate::error::{MedrecError, Result};
use crate::ids;
use crate::model::Record;

/// An ordered collection of one record kind, keyed by id.
///
/// Records keep the order they were created (or loaded) in, which is also the order
/// they are written back to disk.
#[derive(Debug, Clone)]
pub struct RecordStore<T: Record> {
    records: Vec<T>,
    id_floor: u64,
}

impl<T: Record> RecordStore<T> {
    pub fn new(id_floor: u64) -> Self {
        Self {
            records: Vec::new(),
            id_floor,
        }
    }

    /// Wraps records that are already known to have unique ids (e.g. decoder output).
    pub fn from_records(records: Vec<T>, id_floor: u64) -> Self {
        Self { records, id_floor }
    }

    /// The id the next `create` will assign.
    pub fn next_id(&self) -> Result<String> {
        let prefix = T::KIND.prefix();
        ids::next_id(self.records.iter().map(|r| r.id()), prefix, self.id_floor).ok_or_else(
            || MedrecError::IdsExhausted {
                kind: T::KIND,
                last: format!("{}{}", prefix, u64::MAX),
            },
        )
    }

    /// Assigns a fresh id, builds the record from it and appends it.
    pub fn create<F>(&mut self, build: F) -> Result<T>
    where
        F: FnOnce(String) -> T,
    {
        let record = build(self.next_id()?);
        debug_assert!(self.find_by_id(record.id()).is_none());
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn find_by<P>(&self, predicate: P) -> Vec<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.records.iter().filter(|r| predicate(*r)).collect()
    }

    /// Applies `apply` to the record with `id` and returns the updated copy.
    ///
    /// Callers validate every input beforehand, so `apply` itself cannot fail and a
    /// record is never left half-updated.
    pub fn update<F>(&mut self, id: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| MedrecError::not_found(T::KIND, id))?;
        apply(record);
        Ok(record.clone())
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(pos))
    }

    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
