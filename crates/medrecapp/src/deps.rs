//! # Dependency Checking
//!
//! Appointments, bills and medical records point at patients by id, and nothing cascades. A patient may
//! only be deleted once no other record refers to it. This module answers that question
//! without the patient side knowing which kinds of records exist.
//!
//! Each dependent collection implements the narrow, read-only [`ReferenceSource`]
//! interface. A [`DependencyChecker`] is handed the sources and asks each one in turn.
//!
//! A kind that was never registered is treated as having no references. Forgetting to
//! register one would therefore let deletes through silently, which is why the
//! composition root calls [`DependencyChecker::assert_wired`] at startup.

use crate::error::{MedrecError, Result};
use crate::model::{PatientLinked, RecordKind};
use crate::store::RecordStore;
use serde::Serialize;
use std::fmt;

/// Read-only view of a collection whose records may refer to a patient.
pub trait ReferenceSource {
    fn dependent_kind(&self) -> RecordKind;

    /// Ids of every record referring to `patient_id`, in storage order.
    fn find_all_referencing(&self, patient_id: &str) -> Vec<String>;
}

impl<T: PatientLinked> ReferenceSource for RecordStore<T> {
    fn dependent_kind(&self) -> RecordKind {
        T::KIND
    }

    fn find_all_referencing(&self, patient_id: &str) -> Vec<String> {
        self.find_by(|r| r.patient_id() == patient_id)
            .into_iter()
            .map(|r| r.id().to_string())
            .collect()
    }
}

/// One kind of record standing in the way of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingReason {
    pub kind: RecordKind,
    pub ids: Vec<String>,
}

impl BlockingReason {
    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(s)", self.count(), self.kind.noun())
    }
}

/// The answer to "may this patient be deleted?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionCheck {
    pub patient_id: String,
    pub blocking: Vec<BlockingReason>,
}

impl DeletionCheck {
    pub fn allowed(&self) -> bool {
        self.blocking.is_empty()
    }

    /// Turns a refusal into [`MedrecError::Dependency`].
    pub fn into_result(self) -> Result<()> {
        if self.allowed() {
            Ok(())
        } else {
            Err(MedrecError::Dependency {
                id: self.patient_id,
                reasons: self.blocking,
            })
        }
    }
}

#[derive(Default)]
pub struct DependencyChecker<'a> {
    sources: Vec<&'a dyn ReferenceSource>,
}

impl<'a> DependencyChecker<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: &'a dyn ReferenceSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn kinds(&self) -> Vec<RecordKind> {
        self.sources.iter().map(|s| s.dependent_kind()).collect()
    }

    pub fn can_delete(&self, patient_id: &str) -> DeletionCheck {
        let blocking = self
            .sources
            .iter()
            .filter_map(|source| {
                let ids = source.find_all_referencing(patient_id);
                (!ids.is_empty()).then(|| BlockingReason {
                    kind: source.dependent_kind(),
                    ids,
                })
            })
            .collect();

        DeletionCheck {
            patient_id: patient_id.to_string(),
            blocking,
        }
    }

    /// Fails with a config error naming every expected kind that has no source.
    pub fn assert_wired(&self, expected: &[RecordKind]) -> Result<()> {
        let wired = self.kinds();
        let missing: Vec<_> = expected
            .iter()
            .filter(|k| !wired.contains(*k))
            .map(|k| k.noun())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MedrecError::Config(format!(
                "no reference source registered for: {}",
                missing.join(", ")
            )))
        }
    }
}
