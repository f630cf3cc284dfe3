use crate::deps::BlockingReason;
use crate::model::RecordKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedrecError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("Cannot delete patient {id}: has {}", join_reasons(.reasons))]
    Dependency {
        id: String,
        reasons: Vec<BlockingReason>,
    },

    #[error("No {} identifiers left after {last}", .kind.noun())]
    IdsExhausted { kind: RecordKind, last: String },

    #[error("Failed to persist {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl MedrecError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        MedrecError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        MedrecError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

fn join_reasons(reasons: &[BlockingReason]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MedrecError>;
