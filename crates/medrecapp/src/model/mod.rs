//! # Records
//!
//! Five kinds of records are kept, each in its own store and its own file:
//!
//! - [`Patient`]: the owning entity. Identifiers look like `P101`.
//! - [`Appointment`]: refers to a patient by id (`A101`).
//! - [`Bill`]: refers to a patient by id (`B101`).
//! - [`MedicalRecord`]: a diagnosis, refers to a patient by id (`M101`).
//! - [`Payment`]: a ledger entry, refers to a bill by id (`PAY101`).
//!
//! References to patients are *weak*: they are plain identifier strings, resolved by
//! lookup. A patient never owns its appointments, bills or medical records, and
//! deleting a patient never cascades. Instead the delete is refused while references
//! exist (see [`crate::deps`]).
//!
//! Records that refer to a patient also carry a `patient_name` snapshot taken when they
//! were created. It is display data only and is never used to resolve the reference.

use serde::Serialize;
use std::fmt;

mod appointment;
mod bill;
mod blood_type;
mod medical_record;
mod patient;
mod payment;

pub use appointment::{Appointment, AppointmentStatus};
pub use bill::{to_cents, Bill};
pub use blood_type::{BloodType, InvalidBloodType};
pub use medical_record::MedicalRecord;
pub use patient::Patient;
pub use payment::{Payment, PaymentStatus};

/// The kinds of records the system stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Patient,
    Appointment,
    Bill,
    MedicalRecord,
    Payment,
}

impl RecordKind {
    /// Prefix of every identifier issued for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Patient => "P",
            RecordKind::Appointment => "A",
            RecordKind::Bill => "B",
            RecordKind::MedicalRecord => "M",
            RecordKind::Payment => "PAY",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::Patient => "patients.csv",
            RecordKind::Appointment => "appointments.csv",
            RecordKind::Bill => "bills.csv",
            RecordKind::MedicalRecord => "medical_records.csv",
            RecordKind::Payment => "payments.csv",
        }
    }

    /// Lowercase noun used in counts, e.g. "2 appointment(s)".
    pub fn noun(&self) -> &'static str {
        match self {
            RecordKind::Patient => "patient",
            RecordKind::Appointment => "appointment",
            RecordKind::Bill => "bill",
            RecordKind::MedicalRecord => "medical record",
            RecordKind::Payment => "payment",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Patient => write!(f, "Patient"),
            RecordKind::Appointment => write!(f, "Appointment"),
            RecordKind::Bill => write!(f, "Bill"),
            RecordKind::MedicalRecord => write!(f, "Medical record"),
            RecordKind::Payment => write!(f, "Payment"),
        }
    }
}

/// A record that can live in a [`crate::store::RecordStore`].
pub trait Record: Clone {
    const KIND: RecordKind;

    fn id(&self) -> &str;
}

/// A record holding a weak reference to a patient.
pub trait PatientLinked: Record {
    fn patient_id(&self) -> &str;
}
