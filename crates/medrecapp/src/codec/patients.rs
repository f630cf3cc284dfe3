use super::{parse_flag, CsvRecord, Row, DATE_FORMAT};
use crate::model::{BloodType, Patient};
use chrono::NaiveDate;

impl CsvRecord for Patient {
    const HEADER: &'static [&'static str] = &[
        "id",
        "firstName",
        "lastName",
        "dateOfBirth",
        "gender",
        "contactNumber",
        "address",
        "bloodType",
        "isAdmitted",
    ];

    const REQUIRED_FIELDS: usize = 4;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.date_of_birth
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            self.gender.clone(),
            self.contact_number.clone(),
            self.address.clone(),
            self.blood_type.as_str().to_string(),
            self.is_admitted.to_string(),
        ]
    }

    fn from_row(row: &Row, notes: &mut Vec<String>) -> Result<Self, String> {
        let id = row.get(0).trim();
        if id.is_empty() {
            return Err("empty patient id".to_string());
        }

        let date_of_birth = match row.non_empty(3) {
            None => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|_| format!("invalid dateOfBirth '{}' for {}", raw, id))?,
            ),
        };

        let (blood_type, rejected) = BloodType::normalize(row.get(7));
        if let Some(rejected) = rejected {
            notes.push(format!("{}: {}, using Unknown", id, rejected));
        }

        Ok(Patient {
            id: id.to_string(),
            first_name: row.get(1).to_string(),
            last_name: row.get(2).to_string(),
            date_of_birth,
            gender: row.get(4).to_string(),
            contact_number: row.get(5).to_string(),
            address: row.get(6).to_string(),
            blood_type,
            is_admitted: parse_flag(row, 8, "isAdmitted", notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::{decode, encode};
    use crate::model::{BloodType, Patient};
    use chrono::NaiveDate;

    const HEADER: &str =
        "id,firstName,lastName,dateOfBirth,gender,contactNumber,address,bloodType,isAdmitted\n";

    fn sample() -> Patient {
        let mut p = Patient::new("P101", "Ada", "Lovelace");
        p.date_of_birth = NaiveDate::from_ymd_opt(1815, 12, 10);
        p.gender = "Female".into();
        p.contact_number = "555-0101".into();
        p.address = "12 St James's Square, London".into();
        p.blood_type = BloodType::AbNegative;
        p.is_admitted = true;
        p
    }

    #[test]
    fn encodes_the_documented_layout() {
        let text = encode(&[sample()]);
        assert_eq!(
            text,
            format!(
                "{}P101,Ada,Lovelace,1815-12-10,Female,555-0101,\"12 St James's Square, London\",AB-,true\n",
                HEADER
            )
        );
    }

    #[test]
    fn round_trips_every_field() {
        let mut plain = Patient::new("P102", "Grace", "Hopper");
        plain.blood_type = BloodType::OPositive;
        let mut awkward = Patient::new("P103", "Jean \"JJ\"", "O'Neil, Jr.");
        awkward.address = "Flat 2\n10 Downing St, \"rear\"".into();

        let patients = vec![sample(), plain, awkward];
        let decoded = decode::<Patient>(&encode(&patients));
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoded.records, patients);
    }

    #[test]
    fn empty_or_missing_blood_type_is_unknown_without_noise() {
        let text = format!("{}P101,Ada,Lovelace,,F,,,,false\nP102,Grace,Hopper,\n", HEADER);
        let decoded = decode::<Patient>(&text);
        assert!(decoded.diagnostics.is_empty());
        assert!(decoded
            .records
            .iter()
            .all(|p| p.blood_type == BloodType::Unknown));
    }

    #[test]
    fn blood_type_is_normalized_on_load() {
        let text = format!("{}P101,Ada,Lovelace,,,,, b+ ,false\n", HEADER);
        let decoded = decode::<Patient>(&text);
        assert_eq!(decoded.records[0].blood_type, BloodType::BPositive);
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn unrecognized_blood_type_falls_back_with_a_note() {
        let text = format!("{}P101,Ada,Lovelace,,,,,Z9,false\n", HEADER);
        let decoded = decode::<Patient>(&text);
        assert_eq!(decoded.records[0].blood_type, BloodType::Unknown);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(!decoded.diagnostics[0].skipped);
        assert!(decoded.diagnostics[0].message.contains("Z9"));
    }

    #[test]
    fn admission_flag_defaults_to_false() {
        let text = format!("{}P101,Ada,Lovelace,,,,,A+\nP102,Grace,Hopper,,,,,A+,TRUE\nP103,Alan,Turing,,,,,A+,maybe\n", HEADER);
        let decoded = decode::<Patient>(&text);
        assert!(!decoded.records[0].is_admitted);
        assert!(decoded.records[1].is_admitted);
        assert!(!decoded.records[2].is_admitted);
        assert_eq!(decoded.diagnostics.len(), 1);
        assert!(decoded.diagnostics[0].message.contains("maybe"));
    }

    #[test]
    fn bad_birth_date_skips_the_record() {
        let text = format!("{}P101,Ada,Lovelace,10/12/1815\nP102,Grace,Hopper,\n", HEADER);
        let decoded = decode::<Patient>(&text);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].id, "P102");
        assert!(decoded.diagnostics[0].skipped);
        assert!(decoded.diagnostics[0].message.contains("dateOfBirth"));
    }

    #[test]
    fn empty_id_skips_the_record() {
        let text = format!("{},Ada,Lovelace,\n", HEADER);
        let decoded = decode::<Patient>(&text);
        assert!(decoded.records.is_empty());
        assert!(decoded.diagnostics[0].message.contains("empty patient id"));
    }

    #[test]
    fn well_formed_file_is_a_fixed_point() {
        let text = format!(
            "{}P101,Ada,Lovelace,1815-12-10,Female,555-0101,\"a, b\",A+,true\nP105,Grace,Hopper,,,,,Unknown,false\n",
            HEADER
        );
        let decoded = decode::<Patient>(&text);
        assert_eq!(encode(&decoded.records), text);
    }
}
