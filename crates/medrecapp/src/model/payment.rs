use super::{Record, RecordKind};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    #[default]
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Completed,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        PaymentStatus::ALL
            .iter()
            .find(|st| st.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("'{}' is not a payment status", s))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the payment ledger. Entries are only ever appended.
///
/// The ledger refers to bills by id and outlives them: deleting a bill leaves its
/// payments in place as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub bill_id: String,
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
    pub method: String,
    pub status: PaymentStatus,
}

impl Payment {
    pub const DEFAULT_METHOD: &'static str = "CASH";
}

impl Record for Payment {
    const KIND: RecordKind = RecordKind::Payment;

    fn id(&self) -> &str {
        &self.id
    }
}
