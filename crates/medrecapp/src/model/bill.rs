use super::{PatientLinked, Record, RecordKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bill issued to a patient. Amounts are kept at two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub date_issued: NaiveDate,
    pub date_paid: Option<NaiveDate>,
    pub status: String,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
}

impl Bill {
    pub const UNPAID: &'static str = "UNPAID";
    pub const PARTIAL: &'static str = "PARTIAL";
    pub const PAID: &'static str = "PAID";

    pub fn balance(&self) -> Decimal {
        self.total_amount - self.amount_paid
    }

    pub fn is_settled(&self) -> bool {
        self.amount_paid >= self.total_amount
    }
}

/// Rounds to cents and fixes the scale at two places, so `5` and `5.00` print alike.
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}

impl Record for Bill {
    const KIND: RecordKind = RecordKind::Bill;

    fn id(&self) -> &str {
        &self.id
    }
}

impl PatientLinked for Bill {
    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}
