//! # Service Layer
//!
//! One service per record kind, except that billing also keeps the payment ledger. Each
//! owns its [`Table`](crate::store::Table)s and implements the business rules for them:
//! - Validate caller input completely before anything is touched
//! - Apply the change through the table, so it is persisted before returning
//! - Return owned snapshots, never references into the store
//!
//! ## What Services Do NOT Do
//!
//! - **Cross-kind policy**: A service does not know about the others. Resolving a
//!   patient before scheduling, or refusing a delete while references exist, is the
//!   facade's job ([`crate::api`]).
//! - **Presentation**: No stdout, no formatting beyond the messages in an [`Outcome`].
//!
//! ## Structured Returns
//!
//! Mutations return an [`Outcome`]: the record as it is after the change, plus
//! [`CmdMessage`]s. A message at `Warning` level means the change went through with an
//! adjustment, e.g. an unrecognized blood type stored as `Unknown`. `Info` marks
//! something worth knowing that changed nothing, like admitting a patient twice.
//!
//! ## Testing Strategy
//!
//! Service tests run against [`MemBackend`](crate::store::MemBackend) so they exercise the
//! real codec and write path without touching the filesystem.

use serde::Serialize;

pub mod appointments;
pub mod billing;
pub mod medical_records;
pub mod patients;

pub use appointments::{AppointmentDraft, AppointmentService};
pub use billing::{BillDraft, BillingService, PaymentDraft};
pub use medical_records::{MedicalRecordDraft, MedicalRecordService};
pub use patients::{PatientDraft, PatientService, PatientUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// A record after a successful mutation, with anything worth telling the user.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub record: T,
    pub messages: Vec<CmdMessage>,
}

impl<T> Outcome<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            messages: Vec::new(),
        }
    }

    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning)
    }
}
