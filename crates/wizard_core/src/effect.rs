use std::path::PathBuf;

use crate::adapter::PreviewTarget;
use crate::{Epoch, IndexingRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchConnectionStatus { epoch: Epoch, provider: String },
    FetchDocumentsLimit { epoch: Epoch },
    FetchDatasetDetail { epoch: Epoch, dataset_id: String },
    UploadFile { file_id: String, path: PathBuf },
    FetchPreview { epoch: Epoch, target: PreviewTarget },
    EstimateIndexing { epoch: Epoch, request: IndexingRequest },
    SubmitIndexing { epoch: Epoch, request: IndexingRequest },
    FetchIndexingStatus { epoch: Epoch, dataset_id: String },
    CreateEmptyDataset { epoch: Epoch, name: String },
    /// Surrounding app: open the data-source integration settings.
    OpenDataSourceSettings,
    /// Surrounding app: navigate to a dataset.
    OpenDataset { dataset_id: String },
    /// Transient, non-fatal user notification.
    Notify { level: NoticeLevel, message: String },
}

impl Effect {
    pub(crate) fn notify(level: NoticeLevel, message: impl Into<String>) -> Self {
        Effect::Notify {
            level,
            message: message.into(),
        }
    }
}
