use super::{BloodType, Record, RecordKind};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub contact_number: String,
    pub address: String,
    pub blood_type: BloodType,
    pub is_admitted: bool,
}

impl Patient {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            gender: String::new(),
            contact_number: String::new(),
            address: String::new(),
            blood_type: BloodType::Unknown,
            is_admitted: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Age in whole years on `today`. Unknown or future birth dates give 0.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let Some(dob) = self.date_of_birth else {
            return 0;
        };
        if dob > today {
            return 0;
        }
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }
}

impl Record for Patient {
    const KIND: RecordKind = RecordKind::Patient;

    fn id(&self) -> &str {
        &self.id
    }
}
