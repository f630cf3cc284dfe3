use super::{CmdMessage, Outcome};
use crate::codec::Diagnostic;
use crate::deps::ReferenceSource;
use crate::error::{MedrecError, Result};
use crate::model::{Appointment, AppointmentStatus, Patient, RecordKind};
use crate::store::{RecordStore, StorageBackend, Table};
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub patient_id: String,
    /// What the appointment is for, e.g. "Checkup".
    pub kind: String,
    pub date_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl AppointmentDraft {
    pub fn new(
        patient_id: impl Into<String>,
        kind: impl Into<String>,
        date_time: NaiveDateTime,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            kind: kind.into(),
            date_time,
            status: AppointmentStatus::Scheduled,
        }
    }
}

pub struct AppointmentService<B: StorageBackend> {
    table: Table<Appointment, B>,
}

impl<B: StorageBackend> AppointmentService<B> {
    pub fn open(backend: B, id_floor: u64) -> Result<(Self, Vec<Diagnostic>)> {
        let (table, diagnostics) = Table::open(backend, id_floor)?;
        Ok((Self { table }, diagnostics))
    }

    pub fn store(&self) -> &RecordStore<Appointment> {
        self.table.records()
    }

    /// Books an appointment for `patient`, which the caller has already resolved.
    pub fn schedule(
        &mut self,
        patient: &Patient,
        draft: AppointmentDraft,
    ) -> Result<Outcome<Appointment>> {
        let kind = draft.kind.trim();
        if kind.is_empty() {
            return Err(MedrecError::validation("appointment type", "must not be empty"));
        }

        let appointment = self.table.transact(|store| {
            store.create(|id| Appointment {
                id,
                patient_id: patient.id.clone(),
                patient_name: patient.full_name(),
                kind: kind.to_string(),
                date_time: draft.date_time,
                status: draft.status,
            })
        })?;

        tracing::info!(id = %appointment.id, patient = %patient.id, "scheduled appointment");
        let message = CmdMessage::success(format!(
            "Scheduled {} for {} on {}",
            appointment.id,
            appointment.patient_name,
            appointment.date_time.format("%Y-%m-%d %H:%M")
        ));
        Ok(Outcome::new(appointment).with_message(message))
    }

    pub fn set_status(
        &mut self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Outcome<Appointment>> {
        let appointment = self
            .table
            .transact(|store| store.update(id, |a| a.status = status))?;
        let message = CmdMessage::success(format!("Appointment {} is now {}", id, status));
        Ok(Outcome::new(appointment).with_message(message))
    }

    pub fn reschedule(
        &mut self,
        id: &str,
        date_time: NaiveDateTime,
    ) -> Result<Outcome<Appointment>> {
        let appointment = self
            .table
            .transact(|store| store.update(id, |a| a.date_time = date_time))?;
        let message = CmdMessage::success(format!(
            "Appointment {} moved to {}",
            id,
            date_time.format("%Y-%m-%d %H:%M")
        ));
        Ok(Outcome::new(appointment).with_message(message))
    }

    pub fn remove(&mut self, id: &str) -> Result<Appointment> {
        let appointment = self.table.transact(|store| {
            store
                .remove(id)
                .ok_or_else(|| MedrecError::not_found(RecordKind::Appointment, id))
        })?;
        tracing::info!(id = %appointment.id, "deleted appointment");
        Ok(appointment)
    }

    pub fn find(&self, id: &str) -> Option<Appointment> {
        self.store().find_by_id(id).cloned()
    }

    /// Appointments of one patient, earliest first.
    pub fn for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .store()
            .find_by(|a| a.patient_id == patient_id)
            .into_iter()
            .cloned()
            .collect();
        found.sort_by_key(|a| a.date_time);
        found
    }

    pub fn list(&self) -> Vec<Appointment> {
        self.store().all().to_vec()
    }
}

impl<B: StorageBackend> ReferenceSource for AppointmentService<B> {
    fn dependent_kind(&self) -> RecordKind {
        RecordKind::Appointment
    }

    fn find_all_referencing(&self, patient_id: &str) -> Vec<String> {
        self.store().find_all_referencing(patient_id)
    }
}
