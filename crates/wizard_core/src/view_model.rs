use std::sync::Arc;

use crate::lark_source::LarkLink;
use crate::{
    DataSourceType, DocumentIndexingStatus, DocumentsLimit, FileItem, IndexingConfig,
    IndexingEstimate, IndexingJobResult, IndexingTechnique, NotionPage, Preview, Step,
};

pub const UNAVAILABLE_MESSAGE: &str = "This dataset is temporarily unavailable.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardViewModel {
    pub step: Step,
    pub dataset_id: Option<String>,
    pub stage: StageView,
    pub preview: Option<Preview>,
    pub dirty: bool,
}

/// What the wizard body renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageView {
    Unavailable { code: u16, message: String },
    Select(SelectView),
    /// Configure/Finish of an existing dataset whose detail has not loaded yet.
    AwaitingDetail,
    Configure(ConfigureView),
    Finish(FinishView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOption {
    pub source_type: DataSourceType,
    pub active: bool,
    pub coming_soon: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectView {
    /// `None` when the dataset's source type is already fixed.
    pub source_picker: Option<Vec<SourceOption>>,
    pub active_source: DataSourceType,
    pub adapter: AdapterView,
    pub next_enabled: bool,
    pub can_create_empty: bool,
    pub creating_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterView {
    LoadingLimits,
    Files {
        items: Arc<Vec<FileItem>>,
        limit: Option<DocumentsLimit>,
    },
    NotionCheckingConnection,
    NotionConnect,
    Notion {
        selected: Vec<NotionPage>,
        limit: Option<DocumentsLimit>,
    },
    Lark {
        input: String,
        loading: bool,
        committed: Option<String>,
        committed_title: Option<String>,
        link: Option<LarkLink>,
    },
    ComingSoon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureView {
    pub source_type: DataSourceType,
    pub item_count: usize,
    pub config: IndexingConfig,
    pub technique_locked: bool,
    pub config_valid: bool,
    pub estimate: Option<IndexingEstimate>,
    pub estimating: bool,
    pub submitting: bool,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishView {
    pub dataset_id: Option<String>,
    pub dataset_name: Option<String>,
    pub indexing_technique: Option<IndexingTechnique>,
    pub result: Option<IndexingJobResult>,
    pub statuses: Vec<DocumentIndexingStatus>,
    pub status_loading: bool,
}
