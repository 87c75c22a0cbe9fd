//! Wizard core: pure state machine for the dataset-creation wizard and its view model.
//!
//! Everything here is synchronous and side-effect free. Backend calls leave the
//! core as [`Effect`]s and come back as [`Msg`]s tagged with the epoch they were
//! issued under, so late completions from torn-down requests are ignored.
mod adapter;
mod dataset;
mod effect;
mod epoch;
mod file_source;
mod indexing;
mod lark_source;
mod msg;
mod notion_source;
mod preview;
mod source;
mod state;
mod step;
mod update;
mod view_model;

pub use adapter::{PreviewTarget, SourceAdapter, WebSource};
pub use dataset::{
    validate_dataset_name, ConnectionStatus, DatasetDetail, DatasetMode, DocumentsLimit,
    LimitsState, NameError, Reconciliation, RequestFailure, DATASET_NAME_MAX_CHARS,
    UNAVAILABLE_CODE,
};
pub use effect::{Effect, NoticeLevel};
pub use epoch::{Epoch, RequestEpochs, RequestKind};
pub use file_source::{FileHandle, FileItem, FileSource, UploadedFile};
pub use indexing::{
    CustomRule, DocForm, DocumentIndexingStatus, IndexingConfig, IndexingEstimate,
    IndexingJobResult, IndexingRequest, IndexingTechnique, ProcessRule, MAX_SEGMENT_TOKENS,
    MIN_SEGMENT_TOKENS,
};
pub use lark_source::{LarkDocKind, LarkLink, LarkSource};
pub use msg::{LarkTrigger, Msg};
pub use notion_source::{NotionPage, NotionSource};
pub use preview::{Preview, PreviewContent};
pub use source::{DataSourceType, Selection};
pub use state::{WizardOptions, WizardState, NOTION_PROVIDER};
pub use step::{Step, StepController};
pub use update::update;
pub use view_model::{
    AdapterView, ConfigureView, FinishView, SelectView, SourceOption, StageView, WizardViewModel,
    UNAVAILABLE_MESSAGE,
};
