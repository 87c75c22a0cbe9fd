use crate::adapter::PreviewTarget;
use crate::{
    DataSourceType, DatasetDetail, DocForm, DocumentIndexingStatus, DocumentsLimit, Epoch,
    FileItem, IndexingEstimate, IndexingJobResult, IndexingTechnique, NotionPage, PreviewContent,
    ProcessRule, RequestFailure, UploadedFile,
};

/// The two equivalent ways to confirm a Lark reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LarkTrigger {
    Search,
    Enter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Wizard shown; kicks off the one-time fetches.
    Mounted,
    DatasetDetailLoaded {
        epoch: Epoch,
        result: Result<DatasetDetail, RequestFailure>,
    },
    DocumentsLimitLoaded {
        epoch: Epoch,
        result: Result<DocumentsLimit, RequestFailure>,
    },
    ConnectionStatusLoaded {
        epoch: Epoch,
        result: Result<bool, RequestFailure>,
    },
    /// User clicked an entry of the source-type picker.
    SourceTypeSelected(DataSourceType),

    /// Files picked in the uploader.
    FilesAdded(Vec<FileItem>),
    FileUploadProgress {
        file_id: String,
        progress: u8,
    },
    FileUploaded {
        file_id: String,
        file: UploadedFile,
    },
    FileUploadFailed {
        file_id: String,
        failure: RequestFailure,
    },
    FileRemoved {
        file_id: String,
    },

    /// Notion picker replaced its selection.
    NotionPagesSelected(Vec<NotionPage>),
    NotionPageDeselected {
        page_id: String,
    },
    /// User asked to connect a Notion workspace.
    NotionSetupRequested,

    /// Preview of a file (by `file_id`) or Notion page (by `page_id`) of the active source.
    PreviewRequested {
        key: String,
    },
    PreviewLoaded {
        epoch: Epoch,
        target: PreviewTarget,
        result: Result<PreviewContent, RequestFailure>,
    },
    PreviewClosed,

    LarkInputChanged(String),
    LarkSubmitted(LarkTrigger),
    /// Explicit removal of the committed Lark reference.
    LarkSelectionDismissed,

    NextClicked,
    BackClicked,

    IndexingTechniqueChosen(IndexingTechnique),
    ProcessRuleChanged(ProcessRule),
    DocFormChanged(DocForm),
    DocLanguageChanged(String),
    EstimateRequested,
    EstimateLoaded {
        epoch: Epoch,
        result: Result<IndexingEstimate, RequestFailure>,
    },
    SubmitClicked,
    SubmitCompleted {
        epoch: Epoch,
        result: Result<IndexingJobResult, RequestFailure>,
    },

    IndexingStatusRequested,
    IndexingStatusLoaded {
        epoch: Epoch,
        result: Result<Vec<DocumentIndexingStatus>, RequestFailure>,
    },

    /// Create an empty dataset instead of importing documents.
    EmptyDatasetRequested {
        name: String,
    },
    EmptyDatasetCreated {
        epoch: Epoch,
        result: Result<DatasetDetail, RequestFailure>,
    },

    /// UI/render tick to coalesce rendering.
    Tick,
}
