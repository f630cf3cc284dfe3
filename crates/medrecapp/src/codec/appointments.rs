use super::{CsvRecord, Row, DATE_TIME_FORMAT};
use crate::model::{Appointment, AppointmentStatus};
use chrono::NaiveDateTime;

impl CsvRecord for Appointment {
    const HEADER: &'static [&'static str] =
        &["id", "patientId", "patientName", "type", "dateTime", "status"];

    const REQUIRED_FIELDS: usize = 5;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.patient_id.clone(),
            self.patient_name.clone(),
            self.kind.clone(),
            self.date_time.format(DATE_TIME_FORMAT).to_string(),
            self.status.as_str().to_string(),
        ]
    }

    fn from_row(row: &Row, notes: &mut Vec<String>) -> Result<Self, String> {
        let id = row.get(0).trim();
        if id.is_empty() {
            return Err("empty appointment id".to_string());
        }

        let raw_date_time = row.get(4).trim();
        let date_time = NaiveDateTime::parse_from_str(raw_date_time, DATE_TIME_FORMAT)
            .map_err(|_| format!("invalid dateTime '{}' for {}", raw_date_time, id))?;

        let status = match row.non_empty(5) {
            None => AppointmentStatus::Scheduled,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                notes.push(format!("{}: {}, using SCHEDULED", id, e));
                AppointmentStatus::Scheduled
            }),
        };

        Ok(Appointment {
            id: id.to_string(),
            patient_id: row.get(1).trim().to_string(),
            patient_name: row.get(2).to_string(),
            kind: row.get(3).to_string(),
            date_time,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::{decode, encode};
    use crate::model::{Appointment, AppointmentStatus};
    use chrono::NaiveDate;

    const HEADER: &str = "id,patientId,patientName,type,dateTime,status\n";

    fn sample(id: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.into(),
            patient_id: "P101".into(),
            patient_name: "Ada Lovelace".into(),
            kind: "Follow-up, cardiology".into(),
            date_time: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            status,
        }
    }

    #[test]
    fn encodes_the_documented_layout() {
        let text = encode(&[sample("A101", AppointmentStatus::Confirmed)]);
        assert_eq!(
            text,
            format!(
                "{}A101,P101,Ada Lovelace,\"Follow-up, cardiology\",2024-03-05 14:30:00,CONFIRMED\n",
                HEADER
            )
        );
    }

    #[test]
    fn round_trips_every_status() {
        let appointments: Vec<_> = AppointmentStatus::ALL
            .iter()
            .enumerate()
            .map(|(i, st)| sample(&format!("A{}", 101 + i), *st))
            .collect();
        let decoded = decode::<Appointment>(&encode(&appointments));
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoded.records, appointments);
    }

    #[test]
    fn unrecognized_status_falls_back_to_scheduled() {
        let text = format!(
            "{}A101,P101,Ada,Checkup,2024-03-05 09:00:00,POSTPONED\nA102,P101,Ada,Checkup,2024-03-06 09:00:00\n",
            HEADER
        );
        let decoded = decode::<Appointment>(&text);
        assert_eq!(decoded.records.len(), 2);
        assert!(decoded
            .records
            .iter()
            .all(|a| a.status == AppointmentStatus::Scheduled));
        // Only the invalid value is reported, the missing one is a plain default
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("POSTPONED"));
    }

    #[test]
    fn bad_date_time_skips_the_record() {
        let text = format!("{}A101,P101,Ada,Checkup,tomorrow,SCHEDULED\n", HEADER);
        let decoded = decode::<Appointment>(&text);
        assert!(decoded.records.is_empty());
        assert!(decoded.diagnostics[0].skipped);
        assert!(decoded.diagnostics[0].message.contains("dateTime"));
    }

    #[test]
    fn rows_missing_the_date_time_are_skipped() {
        let text = format!("{}A101,P101,Ada,Checkup\n", HEADER);
        let decoded = decode::<Appointment>(&text);
        assert!(decoded.records.is_empty());
        assert!(decoded.diagnostics[0].message.contains("at least 5 fields"));
    }
}
