//! Wizard engine: console backend client, local file access and request execution.
mod client;
mod decode;
mod engine;
mod local_file;
mod preview;
mod types;
mod wire;

pub use client::{ApiSettings, ConsoleApi, EventSink, ReqwestConsoleApi};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::EngineHandle;
pub use local_file::{inspect_local_file, read_local_preview, LocalFile};
pub use preview::{prepare_preview_content, MAX_PREVIEW_CONTENT};
pub use types::{
    ApiError, ApiRequest, ApiResponse, DataSourcePayload, DatasetRecord, DocumentsQuota,
    EngineEvent, EstimateRecord, FailureKind, IndexingPayload, IndexingStatusRecord,
    NotionPageRef, PageContent, ProcessRulePayload, Ticket, UploadedFileRecord,
};
