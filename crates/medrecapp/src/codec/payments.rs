use super::{CsvRecord, Row, DATE_TIME_FORMAT};
use crate::model::{to_cents, Payment, PaymentStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::str::FromStr;

impl CsvRecord for Payment {
    const HEADER: &'static [&'static str] = &[
        "id",
        "billId",
        "amount",
        "paymentDateTime",
        "paymentMethod",
        "status",
    ];

    const REQUIRED_FIELDS: usize = 4;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.bill_id.clone(),
            to_cents(self.amount).to_string(),
            self.paid_at.format(DATE_TIME_FORMAT).to_string(),
            self.method.clone(),
            self.status.as_str().to_string(),
        ]
    }

    /// The amount and time are what make a ledger entry, so both are mandatory.
    fn from_row(row: &Row, notes: &mut Vec<String>) -> Result<Self, String> {
        let id = row.get(0).trim();
        if id.is_empty() {
            return Err("empty payment id".to_string());
        }

        let raw_amount = row.get(2).trim();
        let amount = match Decimal::from_str(raw_amount) {
            Ok(amount) if amount > Decimal::ZERO => to_cents(amount),
            _ => return Err(format!("invalid amount '{}' for {}", raw_amount, id)),
        };

        let raw_paid_at = row.get(3).trim();
        let paid_at = NaiveDateTime::parse_from_str(raw_paid_at, DATE_TIME_FORMAT)
            .map_err(|_| format!("invalid paymentDateTime '{}' for {}", raw_paid_at, id))?;

        let method = row
            .non_empty(4)
            .map(str::to_string)
            .unwrap_or_else(|| Payment::DEFAULT_METHOD.to_string());

        let status = match row.non_empty(5) {
            None => PaymentStatus::Completed,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                notes.push(format!("{}: {}, using COMPLETED", id, e));
                PaymentStatus::Completed
            }),
        };

        Ok(Payment {
            id: id.to_string(),
            bill_id: row.get(1).trim().to_string(),
            amount,
            paid_at,
            method,
            status,
        })
    }
}
