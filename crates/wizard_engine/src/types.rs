use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifies one submitted request; completions and progress carry it back.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadProgress {
        ticket: Ticket,
        percent: u8,
    },
    Completed {
        ticket: Ticket,
        result: Result<ApiResponse, ApiError>,
    },
}

/// Work the engine can run against the console backend or the local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    ConnectionStatus { provider: String },
    DocumentsLimit,
    DatasetDetail { dataset_id: String },
    LarkPreview { reference: String },
    NotionPreview { page: NotionPageRef },
    LocalPreview { path: PathBuf, name: String },
    UploadFile { path: PathBuf },
    Estimate { payload: IndexingPayload },
    Submit {
        dataset_id: Option<String>,
        payload: IndexingPayload,
    },
    IndexingStatus { dataset_id: String },
    CreateDataset { name: String },
}

impl ApiRequest {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ApiRequest::ConnectionStatus { .. } => "connection-status",
            ApiRequest::DocumentsLimit => "documents-limit",
            ApiRequest::DatasetDetail { .. } => "dataset-detail",
            ApiRequest::LarkPreview { .. } => "lark-preview",
            ApiRequest::NotionPreview { .. } => "notion-preview",
            ApiRequest::LocalPreview { .. } => "local-preview",
            ApiRequest::UploadFile { .. } => "upload",
            ApiRequest::Estimate { .. } => "estimate",
            ApiRequest::Submit { .. } => "submit",
            ApiRequest::IndexingStatus { .. } => "indexing-status",
            ApiRequest::CreateDataset { .. } => "create-dataset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    ConnectionStatus(bool),
    DocumentsLimit(DocumentsQuota),
    Dataset(DatasetRecord),
    Preview(PageContent),
    Uploaded(UploadedFileRecord),
    Estimate(EstimateRecord),
    Job(serde_json::Value),
    IndexingStatus(Vec<IndexingStatusRecord>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data_source_type: Option<String>,
    #[serde(default)]
    pub indexing_technique: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DocumentsQuota {
    pub documents_limit: u32,
    pub documents_count: u32,
}

/// Read-only rendition of one document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFileRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EstimateRecord {
    pub total_segments: u64,
    pub tokens: u64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexingStatusRecord {
    pub id: String,
    pub indexing_status: String,
    #[serde(default)]
    pub completed_segments: u64,
    #[serde(default)]
    pub total_segments: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// Prices come back as either a JSON string or a number depending on the backend version.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotionPageRef {
    pub page_id: String,
    pub page_name: String,
    pub page_icon: Option<String>,
    pub workspace_id: String,
    #[serde(rename = "type")]
    pub page_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourcePayload {
    Files { file_ids: Vec<String> },
    Notion { pages: Vec<NotionPageRef> },
    Lark { reference: String },
}

impl DataSourcePayload {
    pub fn wire_type(&self) -> &'static str {
        match self {
            DataSourcePayload::Files { .. } => "upload_file",
            DataSourcePayload::Notion { .. } => "notion_import",
            DataSourcePayload::Lark { .. } => "lark_import",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRulePayload {
    Automatic,
    Custom {
        separator: String,
        max_tokens: u32,
        remove_extra_spaces: bool,
        remove_urls_emails: bool,
    },
}

/// Everything the estimate and submit endpoints need, already in wire vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingPayload {
    pub data_source: DataSourcePayload,
    pub indexing_technique: String,
    pub process_rule: ProcessRulePayload,
    pub doc_form: String,
    pub doc_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status of the failure, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "i/o error"),
        }
    }
}
