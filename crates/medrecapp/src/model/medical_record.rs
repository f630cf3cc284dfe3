use super::{PatientLinked, Record, RecordKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A diagnosis entered against a patient, with free-form clinical notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub diagnosis: String,
    pub notes: String,
    /// Hand-edited files may leave this blank.
    pub record_date: Option<NaiveDate>,
}

impl Record for MedicalRecord {
    const KIND: RecordKind = RecordKind::MedicalRecord;

    fn id(&self) -> &str {
        &self.id
    }
}

impl PatientLinked for MedicalRecord {
    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}
