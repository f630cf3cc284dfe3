use super::{CsvRecord, Row, DATE_FORMAT};
use crate::model::{to_cents, Bill};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

fn parse_amount(row: &Row, i: usize, column: &str, id: &str, notes: &mut Vec<String>) -> Decimal {
    let Some(raw) = row.non_empty(i) else {
        return to_cents(Decimal::ZERO);
    };
    match Decimal::from_str(raw) {
        Ok(amount) if amount >= Decimal::ZERO => to_cents(amount),
        _ => {
            notes.push(format!("{}: {} '{}' is not a valid amount, using 0.00", id, column, raw));
            to_cents(Decimal::ZERO)
        }
    }
}

impl CsvRecord for Bill {
    const HEADER: &'static [&'static str] = &[
        "billId",
        "patientId",
        "patientName",
        "dateIssued",
        "datePaid",
        "status",
        "totalAmount",
        "amountPaid",
    ];

    const REQUIRED_FIELDS: usize = 6;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.patient_id.clone(),
            self.patient_name.clone(),
            self.date_issued.format(DATE_FORMAT).to_string(),
            self.date_paid
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            self.status.clone(),
            to_cents(self.total_amount).to_string(),
            to_cents(self.amount_paid).to_string(),
        ]
    }

    fn from_row(row: &Row, notes: &mut Vec<String>) -> Result<Self, String> {
        let id = row.get(0).trim();
        if id.is_empty() {
            return Err("empty bill id".to_string());
        }

        let raw_issued = row.get(3).trim();
        let date_issued = NaiveDate::parse_from_str(raw_issued, DATE_FORMAT)
            .map_err(|_| format!("invalid dateIssued '{}' for {}", raw_issued, id))?;

        let date_paid = row.non_empty(4).and_then(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| notes.push(format!("{}: invalid datePaid '{}', ignoring it", id, raw)))
                .ok()
        });

        let status = row
            .non_empty(5)
            .map(str::to_string)
            .unwrap_or_else(|| Bill::UNPAID.to_string());

        Ok(Bill {
            id: id.to_string(),
            patient_id: row.get(1).trim().to_string(),
            patient_name: row.get(2).to_string(),
            date_issued,
            date_paid,
            status,
            total_amount: parse_amount(row, 6, "totalAmount", id, notes),
            amount_paid: parse_amount(row, 7, "amountPaid", id, notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::{decode, encode};
    use crate::model::Bill;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const HEADER: &str =
        "billId,patientId,patientName,dateIssued,datePaid,status,totalAmount,amountPaid\n";

    fn sample() -> Bill {
        Bill {
            id: "B101".into(),
            patient_id: "P104".into(),
            patient_name: "Alan Turing".into(),
            date_issued: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            date_paid: NaiveDate::from_ymd_opt(2024, 2, 20),
            status: Bill::PAID.into(),
            total_amount: Decimal::new(125050, 2),
            amount_paid: Decimal::new(125050, 2),
        }
    }

    #[test]
    fn encodes_fixed_point_amounts() {
        let mut bill = sample();
        bill.total_amount = Decimal::new(80, 0);
        bill.amount_paid = Decimal::ZERO;
        bill.date_paid = None;
        bill.status = Bill::UNPAID.into();
        assert_eq!(
            encode(&[bill]),
            format!("{}B101,P104,Alan Turing,2024-02-01,,UNPAID,80.00,0.00\n", HEADER)
        );
    }

    #[test]
    fn round_trips_every_field() {
        let mut unpaid = sample();
        unpaid.id = "B102".into();
        unpaid.date_paid = None;
        unpaid.status = "DISPUTED, see notes".into();
        unpaid.amount_paid = Decimal::new(0, 2);

        let bills = vec![sample(), unpaid];
        let decoded = decode::<Bill>(&encode(&bills));
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoded.records, bills);
    }

    #[test]
    fn missing_amounts_default_to_zero() {
        let text = format!("{}B101,P104,Alan Turing,2024-02-01,,UNPAID\n", HEADER);
        let decoded = decode::<Bill>(&text);
        let bill = &decoded.records[0];
        assert_eq!(bill.total_amount.to_string(), "0.00");
        assert_eq!(bill.amount_paid.to_string(), "0.00");
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn invalid_amounts_and_paid_dates_are_noted() {
        let text = format!(
            "{}B101,P104,Alan Turing,2024-02-01,someday,PAID,-5,abc\n",
            HEADER
        );
        let decoded = decode::<Bill>(&text);
        let bill = &decoded.records[0];
        assert!(bill.date_paid.is_none());
        assert_eq!(bill.total_amount, Decimal::ZERO);
        assert_eq!(bill.amount_paid, Decimal::ZERO);
        assert_eq!(decoded.diagnostics.len(), 3);
        assert!(decoded.diagnostics.iter().all(|d| !d.skipped));
    }

    #[test]
    fn empty_status_defaults_to_unpaid() {
        let text = format!("{}B101,P104,Alan Turing,2024-02-01,,,10.00,0.00\n", HEADER);
        let decoded = decode::<Bill>(&text);
        assert_eq!(decoded.records[0].status, Bill::UNPAID);
    }

    #[test]
    fn bad_issue_date_skips_the_record() {
        let text = format!("{}B101,P104,Alan Turing,,,UNPAID,10.00,0.00\n", HEADER);
        let decoded = decode::<Bill>(&text);
        assert!(decoded.records.is_empty());
        assert!(decoded.diagnostics[0].message.contains("dateIssued"));
    }
}
