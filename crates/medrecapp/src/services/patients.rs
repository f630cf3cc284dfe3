use super::{CmdMessage, Outcome};
use crate::codec::Diagnostic;
use crate::error::{MedrecError, Result};
use crate::model::{BloodType, Patient, RecordKind};
use crate::store::{RecordStore, StorageBackend, Table};
use chrono::NaiveDate;

/// Input for registering a patient. Only the names are required.
#[derive(Debug, Clone, Default)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub contact_number: String,
    pub address: String,
    /// Free text, normalized on registration. Empty means `Unknown`.
    pub blood_type: String,
}

impl PatientDraft {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }
}

/// A partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears a recorded date of birth.
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.contact_number.is_none()
            && self.address.is_none()
            && self.blood_type.is_none()
    }
}

fn required_name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MedrecError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Normalizes a blood type, turning a rejection into a warning message.
fn resolve_blood_type(raw: &str, messages: &mut Vec<CmdMessage>) -> BloodType {
    let (blood_type, rejected) = BloodType::normalize(raw);
    if let Some(rejected) = rejected {
        tracing::warn!(value = %rejected.0, "rejected blood type, storing Unknown");
        messages.push(CmdMessage::warning(format!("{}, stored as Unknown", rejected)));
    }
    blood_type
}

pub struct PatientService<B: StorageBackend> {
    table: Table<Patient, B>,
}

impl<B: StorageBackend> PatientService<B> {
    pub fn open(backend: B, id_floor: u64) -> Result<(Self, Vec<Diagnostic>)> {
        let (table, diagnostics) = Table::open(backend, id_floor)?;
        Ok((Self { table }, diagnostics))
    }

    pub fn store(&self) -> &RecordStore<Patient> {
        self.table.records()
    }

    pub fn register(&mut self, draft: PatientDraft) -> Result<Outcome<Patient>> {
        let first_name = required_name("first name", &draft.first_name)?;
        let last_name = required_name("last name", &draft.last_name)?;

        let mut messages = Vec::new();
        let blood_type = resolve_blood_type(&draft.blood_type, &mut messages);

        let patient = self.table.transact(|store| {
            store.create(|id| Patient {
                id,
                first_name,
                last_name,
                date_of_birth: draft.date_of_birth,
                gender: draft.gender.trim().to_string(),
                contact_number: draft.contact_number.trim().to_string(),
                address: draft.address.trim().to_string(),
                blood_type,
                is_admitted: false,
            })
        })?;

        tracing::info!(id = %patient.id, "registered patient");
        let mut outcome = Outcome::new(patient);
        outcome.messages = messages;
        outcome.add_message(CmdMessage::success(format!(
            "Registered patient {} ({})",
            outcome.record.id,
            outcome.record.full_name()
        )));
        Ok(outcome)
    }

    /// Applies every provided field, or none of them.
    pub fn update(&mut self, id: &str, update: PatientUpdate) -> Result<Outcome<Patient>> {
        self.require(id)?;

        let first_name = update
            .first_name
            .as_deref()
            .map(|v| required_name("first name", v))
            .transpose()?;
        let last_name = update
            .last_name
            .as_deref()
            .map(|v| required_name("last name", v))
            .transpose()?;

        let mut messages = Vec::new();
        let blood_type = update
            .blood_type
            .as_deref()
            .map(|raw| resolve_blood_type(raw, &mut messages));

        let patient = self.table.transact(|store| {
            store.update(id, |p| {
                if let Some(v) = first_name {
                    p.first_name = v;
                }
                if let Some(v) = last_name {
                    p.last_name = v;
                }
                if let Some(v) = update.date_of_birth {
                    p.date_of_birth = v;
                }
                if let Some(v) = update.gender {
                    p.gender = v.trim().to_string();
                }
                if let Some(v) = update.contact_number {
                    p.contact_number = v.trim().to_string();
                }
                if let Some(v) = update.address {
                    p.address = v.trim().to_string();
                }
                if let Some(v) = blood_type {
                    p.blood_type = v;
                }
            })
        })?;

        let mut outcome = Outcome::new(patient);
        outcome.messages = messages;
        outcome.add_message(CmdMessage::success(format!("Updated patient {}", id)));
        Ok(outcome)
    }

    pub fn set_blood_type(&mut self, id: &str, raw: &str) -> Result<Outcome<Patient>> {
        self.require(id)?;
        let mut messages = Vec::new();
        let blood_type = resolve_blood_type(raw, &mut messages);

        let patient = self
            .table
            .transact(|store| store.update(id, |p| p.blood_type = blood_type))?;

        let mut outcome = Outcome::new(patient);
        outcome.messages = messages;
        outcome.add_message(CmdMessage::success(format!(
            "Blood type of {} set to {}",
            id, blood_type
        )));
        Ok(outcome)
    }

    /// Admits or discharges. Asking for the current state writes nothing.
    pub fn set_admitted(&mut self, id: &str, admitted: bool) -> Result<Outcome<Patient>> {
        let current = self.require(id)?;
        if current.is_admitted == admitted {
            let state = if admitted { "already admitted" } else { "not admitted" };
            let message = CmdMessage::info(format!("Patient {} is {}", id, state));
            return Ok(Outcome::new(current).with_message(message));
        }

        let patient = self
            .table
            .transact(|store| store.update(id, |p| p.is_admitted = admitted))?;

        let verb = if admitted { "Admitted" } else { "Discharged" };
        let message = CmdMessage::success(format!("{} patient {}", verb, id));
        Ok(Outcome::new(patient).with_message(message))
    }

    /// Removes the patient. Whether removal is allowed is decided by the caller.
    pub fn remove(&mut self, id: &str) -> Result<Patient> {
        let patient = self.table.transact(|store| {
            store
                .remove(id)
                .ok_or_else(|| MedrecError::not_found(RecordKind::Patient, id))
        })?;
        tracing::info!(id = %patient.id, "deleted patient");
        Ok(patient)
    }

    pub fn find(&self, id: &str) -> Option<Patient> {
        self.store().find_by_id(id).cloned()
    }

    /// Fails with `NotFound` when `id` is unknown.
    pub fn require(&self, id: &str) -> Result<Patient> {
        self.find(id)
            .ok_or_else(|| MedrecError::not_found(RecordKind::Patient, id))
    }

    /// Case-insensitive substring match on the full name.
    pub fn search(&self, text: &str) -> Vec<Patient> {
        let needle = text.trim().to_lowercase();
        self.store()
            .find_by(|p| p.full_name().to_lowercase().contains(&needle))
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list(&self) -> Vec<Patient> {
        self.store().all().to_vec()
    }

    pub fn admitted(&self) -> Vec<Patient> {
        self.store()
            .find_by(|p| p.is_admitted)
            .into_iter()
            .cloned()
            .collect()
    }
}
