use std::fmt;

use thiserror::Error;

use crate::{DataSourceType, IndexingTechnique};

/// HTTP-style code shown when the wizard cannot load its dataset.
pub const UNAVAILABLE_CODE: u16 = 500;

pub const DATASET_NAME_MAX_CHARS: usize = 40;

/// Backend record of a dataset, as far as the wizard cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDetail {
    pub id: String,
    pub name: String,
    pub data_source_type: Option<DataSourceType>,
    pub indexing_technique: Option<IndexingTechnique>,
}

/// Soft capacity figures shown next to the pickers; never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentsLimit {
    pub documents_limit: u32,
    pub documents_count: u32,
}

impl DocumentsLimit {
    pub fn remaining(&self) -> u32 {
        self.documents_limit.saturating_sub(self.documents_count)
    }
}

/// Result of the documents-limit fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitsState {
    #[default]
    Pending,
    Loaded(DocumentsLimit),
    /// The fetch failed; pickers render without a cap.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    NotConnected,
}

/// Whether the wizard creates a new dataset or adds documents to an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DatasetMode {
    #[default]
    New,
    Existing { dataset_id: String },
}

impl DatasetMode {
    pub fn dataset_id(&self) -> Option<&str> {
        match self {
            DatasetMode::New => None,
            DatasetMode::Existing { dataset_id } => Some(dataset_id),
        }
    }
}

/// Progress of loading prior dataset configuration for edit flows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reconciliation {
    /// New dataset: nothing to reconcile.
    #[default]
    NotApplicable,
    /// Existing dataset, detail not requested yet.
    Pending,
    Loading,
    Loaded(DatasetDetail),
    /// Terminal: the wizard shows the unavailable view.
    Failed { code: u16 },
}

impl Reconciliation {
    pub fn detail(&self) -> Option<&DatasetDetail> {
        match self {
            Reconciliation::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

/// A failed backend call as seen by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl RequestFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Code for the unavailable view. Always the generic server error; the
    /// actual status stays in the log.
    pub fn unavailable_code(&self) -> u16 {
        UNAVAILABLE_CODE
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} (status {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("dataset name must not be empty")]
    Empty,
    #[error("dataset name must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Trims and validates a dataset name (1..=40 characters).
pub fn validate_dataset_name(name: &str) -> Result<String, NameError> {
    let trimmed = name.trim();
    let chars = trimmed.chars().count();
    if chars == 0 {
        return Err(NameError::Empty);
    }
    if chars > DATASET_NAME_MAX_CHARS {
        return Err(NameError::TooLong {
            max: DATASET_NAME_MAX_CHARS,
            actual: chars,
        });
    }
    Ok(trimmed.to_string())
}
