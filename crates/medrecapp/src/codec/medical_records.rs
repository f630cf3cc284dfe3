use super::{CsvRecord, Row, DATE_FORMAT};
use crate::model::MedicalRecord;
use chrono::NaiveDate;

impl CsvRecord for MedicalRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "patientId",
        "patientName",
        "diagnosis",
        "notes",
        "recordDate",
    ];

    const REQUIRED_FIELDS: usize = 4;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.patient_id.clone(),
            self.patient_name.clone(),
            self.diagnosis.clone(),
            self.notes.clone(),
            self.record_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        ]
    }

    fn from_row(row: &Row, notes: &mut Vec<String>) -> Result<Self, String> {
        let id = row.get(0).trim();
        if id.is_empty() {
            return Err("empty medical record id".to_string());
        }

        let record_date = row.non_empty(5).and_then(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| notes.push(format!("{}: invalid recordDate '{}', leaving it blank", id, raw)))
                .ok()
        });

        Ok(MedicalRecord {
            id: id.to_string(),
            patient_id: row.get(1).trim().to_string(),
            patient_name: row.get(2).to_string(),
            diagnosis: row.get(3).to_string(),
            notes: row.get(4).to_string(),
            record_date,
        })
    }
}
