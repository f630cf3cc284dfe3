use super::{CmdMessage, Outcome};
use crate::codec::Diagnostic;
use crate::deps::ReferenceSource;
use crate::error::{MedrecError, Result};
use crate::model::{MedicalRecord, Patient, RecordKind};
use crate::store::{RecordStore, StorageBackend, Table};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct MedicalRecordDraft {
    pub patient_id: String,
    pub diagnosis: String,
    pub notes: String,
    pub record_date: NaiveDate,
}

impl MedicalRecordDraft {
    pub fn new(
        patient_id: impl Into<String>,
        diagnosis: impl Into<String>,
        record_date: NaiveDate,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            diagnosis: diagnosis.into(),
            notes: String::new(),
            record_date,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

pub struct MedicalRecordService<B: StorageBackend> {
    table: Table<MedicalRecord, B>,
}

impl<B: StorageBackend> MedicalRecordService<B> {
    pub fn open(backend: B, id_floor: u64) -> Result<(Self, Vec<Diagnostic>)> {
        let (table, diagnostics) = Table::open(backend, id_floor)?;
        Ok((Self { table }, diagnostics))
    }

    pub fn store(&self) -> &RecordStore<MedicalRecord> {
        self.table.records()
    }

    /// Files a diagnosis for `patient`, which the caller has already resolved.
    pub fn add(
        &mut self,
        patient: &Patient,
        draft: MedicalRecordDraft,
    ) -> Result<Outcome<MedicalRecord>> {
        let diagnosis = draft.diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(MedrecError::validation("diagnosis", "must not be empty"));
        }

        let record = self.table.transact(|store| {
            store.create(|id| MedicalRecord {
                id,
                patient_id: patient.id.clone(),
                patient_name: patient.full_name(),
                diagnosis: diagnosis.to_string(),
                notes: draft.notes.trim().to_string(),
                record_date: Some(draft.record_date),
            })
        })?;

        tracing::info!(id = %record.id, patient = %patient.id, "added medical record");
        let message = CmdMessage::success(format!(
            "Added {} for {}: {}",
            record.id, record.patient_name, record.diagnosis
        ));
        Ok(Outcome::new(record).with_message(message))
    }

    /// Replaces the notes. The diagnosis itself is never rewritten.
    pub fn annotate(&mut self, id: &str, notes: &str) -> Result<Outcome<MedicalRecord>> {
        let notes = notes.trim().to_string();
        let record = self
            .table
            .transact(|store| store.update(id, |r| r.notes = notes))?;
        let message = CmdMessage::success(format!("Updated notes on {}", id));
        Ok(Outcome::new(record).with_message(message))
    }

    pub fn remove(&mut self, id: &str) -> Result<MedicalRecord> {
        let record = self.table.transact(|store| {
            store
                .remove(id)
                .ok_or_else(|| MedrecError::not_found(RecordKind::MedicalRecord, id))
        })?;
        tracing::info!(id = %record.id, "deleted medical record");
        Ok(record)
    }

    pub fn find(&self, id: &str) -> Option<MedicalRecord> {
        self.store().find_by_id(id).cloned()
    }

    /// A patient's history, oldest first. Undated records come last.
    pub fn for_patient(&self, patient_id: &str) -> Vec<MedicalRecord> {
        let mut found: Vec<MedicalRecord> = self
            .store()
            .find_by(|r| r.patient_id == patient_id)
            .into_iter()
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.record_date.is_none(), r.record_date));
        found
    }

    pub fn list(&self) -> Vec<MedicalRecord> {
        self.store().all().to_vec()
    }
}

impl<B: StorageBackend> ReferenceSource for MedicalRecordService<B> {
    fn dependent_kind(&self) -> RecordKind {
        RecordKind::MedicalRecord
    }

    fn find_all_referencing(&self, patient_id: &str) -> Vec<String> {
        self.store().find_all_referencing(patient_id)
    }
}
