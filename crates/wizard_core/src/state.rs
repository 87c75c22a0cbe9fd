use crate::adapter::{SourceAdapter, WebSource};
use crate::view_model::{
    AdapterView, ConfigureView, FinishView, SelectView, SourceOption, StageView, WizardViewModel,
    UNAVAILABLE_MESSAGE,
};
use crate::{
    ConnectionStatus, DataSourceType, DatasetMode, DocumentIndexingStatus, DocumentsLimit,
    FileSource, IndexingConfig, IndexingEstimate, IndexingJobResult, IndexingRequest,
    IndexingTechnique, LarkLink, LarkSource, LimitsState, NotionSource, Preview, Reconciliation,
    RequestEpochs, RequestKind, Step, StepController,
};

pub const NOTION_PROVIDER: &str = "notion";

/// Construction-time inputs of a wizard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOptions {
    /// Set when adding documents to an existing dataset.
    pub dataset_id: Option<String>,
    pub default_indexing_technique: IndexingTechnique,
    pub initial_source: DataSourceType,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            dataset_id: None,
            default_indexing_technique: IndexingTechnique::HighQuality,
            initial_source: DataSourceType::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ConfigureState {
    pub(crate) config: IndexingConfig,
    pub(crate) estimate: Option<IndexingEstimate>,
    pub(crate) estimating: bool,
    pub(crate) submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct FinishState {
    pub(crate) job_result: Option<IndexingJobResult>,
    pub(crate) technique_cache: Option<IndexingTechnique>,
    pub(crate) statuses: Vec<DocumentIndexingStatus>,
    pub(crate) status_loading: bool,
}

/// Whole state of one wizard session. Lives only as long as the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardState {
    pub(crate) mode: DatasetMode,
    pub(crate) reconciliation: Reconciliation,
    pub(crate) mounted: bool,
    pub(crate) steps: StepController,
    pub(crate) source_type: DataSourceType,
    pub(crate) files: FileSource,
    pub(crate) notion: NotionSource,
    pub(crate) lark: LarkSource,
    pub(crate) web: WebSource,
    pub(crate) preview: Option<Preview>,
    pub(crate) limits: LimitsState,
    pub(crate) notion_connection: ConnectionStatus,
    pub(crate) configure: ConfigureState,
    pub(crate) finish: FinishState,
    pub(crate) creating_empty: bool,
    pub(crate) epochs: RequestEpochs,
    ready: bool,
    dirty: bool,
}

impl WizardState {
    /// Fresh creation session for a new dataset.
    pub fn new() -> Self {
        Self::with_options(WizardOptions::default())
    }

    /// Session that adds documents to an existing dataset.
    pub fn for_dataset(dataset_id: impl Into<String>) -> Self {
        Self::with_options(WizardOptions {
            dataset_id: Some(dataset_id.into()),
            ..WizardOptions::default()
        })
    }

    pub fn with_options(options: WizardOptions) -> Self {
        let (mode, reconciliation) = match options.dataset_id {
            Some(dataset_id) => (DatasetMode::Existing { dataset_id }, Reconciliation::Pending),
            None => (DatasetMode::New, Reconciliation::NotApplicable),
        };
        Self {
            mode,
            reconciliation,
            source_type: options.initial_source,
            configure: ConfigureState {
                config: IndexingConfig::with_technique(options.default_indexing_technique),
                ..ConfigureState::default()
            },
            ..Self::default()
        }
    }

    pub fn step(&self) -> Step {
        self.steps.current()
    }

    pub fn mode(&self) -> &DatasetMode {
        &self.mode
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn source_type(&self) -> DataSourceType {
        self.source_type
    }

    pub fn files(&self) -> &FileSource {
        &self.files
    }

    pub fn notion(&self) -> &NotionSource {
        &self.notion
    }

    pub fn lark(&self) -> &LarkSource {
        &self.lark
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn limits(&self) -> LimitsState {
        self.limits
    }

    pub fn notion_connection(&self) -> ConnectionStatus {
        self.notion_connection
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.configure.config
    }

    pub fn job_result(&self) -> Option<&IndexingJobResult> {
        self.finish.job_result.as_ref()
    }

    /// Readiness of the active source, as of the last `update`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.reconciliation, Reconciliation::Failed { .. })
    }

    /// True once the dataset detail fixes the source type.
    pub fn source_type_locked(&self) -> bool {
        self.reconciliation
            .detail()
            .is_some_and(|detail| detail.data_source_type.is_some())
    }

    pub fn technique_locked(&self) -> bool {
        self.reconciliation
            .detail()
            .is_some_and(|detail| detail.indexing_technique.is_some())
    }

    /// Configure and Finish may render: vacuous for new datasets, detail loaded otherwise.
    pub fn detail_guard(&self) -> bool {
        match self.reconciliation {
            Reconciliation::NotApplicable | Reconciliation::Loaded(_) => true,
            Reconciliation::Pending | Reconciliation::Loading | Reconciliation::Failed { .. } => {
                false
            }
        }
    }

    /// Server value wins over the technique cached at submission.
    pub fn displayed_indexing_technique(&self) -> Option<IndexingTechnique> {
        self.reconciliation
            .detail()
            .and_then(|detail| detail.indexing_technique)
            .or(self.finish.technique_cache)
    }

    pub fn adapter(&self, source: DataSourceType) -> &dyn SourceAdapter {
        match source {
            DataSourceType::File => &self.files,
            DataSourceType::Notion => &self.notion,
            DataSourceType::Lark => &self.lark,
            DataSourceType::Web => &self.web,
        }
    }

    pub(crate) fn adapter_mut(&mut self, source: DataSourceType) -> &mut dyn SourceAdapter {
        match source {
            DataSourceType::File => &mut self.files,
            DataSourceType::Notion => &mut self.notion,
            DataSourceType::Lark => &mut self.lark,
            DataSourceType::Web => &mut self.web,
        }
    }

    pub fn active_adapter(&self) -> &dyn SourceAdapter {
        self.adapter(self.source_type)
    }

    /// Job request from the active source's committed selection, if there is one.
    pub fn build_request(&self) -> Option<IndexingRequest> {
        let selection = self.active_adapter().committed_selection()?;
        Some(IndexingRequest {
            dataset_id: self.mode.dataset_id().map(str::to_string),
            source_type: self.source_type,
            selection,
            config: self.configure.config.clone(),
        })
    }

    pub(crate) fn close_preview(&mut self) {
        self.epochs.invalidate(RequestKind::Preview);
        if self.preview.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Activates `next`, closing any preview. A real change also tears down the
    /// Lark lookup and clears the other sources' selections.
    pub(crate) fn switch_source(&mut self, next: DataSourceType) {
        self.close_preview();
        if next == self.source_type {
            return;
        }
        self.epochs.invalidate(RequestKind::LarkPreview);
        self.lark.set_loading(false);
        for other in DataSourceType::ALL {
            if other != next {
                self.adapter_mut(other).reset();
            }
        }
        self.source_type = next;
        self.mark_dirty();
    }

    /// Recomputes the readiness predicate; called after every mutation batch.
    pub(crate) fn refresh_readiness(&mut self) {
        let ready = self.active_adapter().is_ready();
        if ready != self.ready {
            self.ready = ready;
            self.mark_dirty();
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything visible changed since the previous call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> WizardViewModel {
        WizardViewModel {
            step: self.step(),
            dataset_id: self.mode.dataset_id().map(str::to_string),
            stage: self.stage_view(),
            preview: self.preview.clone(),
            dirty: self.dirty,
        }
    }

    fn stage_view(&self) -> StageView {
        if let Reconciliation::Failed { code } = self.reconciliation {
            return StageView::Unavailable {
                code,
                message: UNAVAILABLE_MESSAGE.to_string(),
            };
        }
        match self.step() {
            Step::Select => StageView::Select(self.select_view()),
            Step::Configure | Step::Finish if !self.detail_guard() => StageView::AwaitingDetail,
            Step::Configure => StageView::Configure(self.configure_view()),
            Step::Finish => StageView::Finish(self.finish_view()),
        }
    }

    fn select_view(&self) -> SelectView {
        let source_picker = (!self.source_type_locked()).then(|| {
            DataSourceType::ALL
                .into_iter()
                .map(|source_type| SourceOption {
                    source_type,
                    active: source_type == self.source_type,
                    coming_soon: !source_type.is_implemented(),
                })
                .collect()
        });
        SelectView {
            source_picker,
            active_source: self.source_type,
            adapter: self.adapter_view(),
            next_enabled: self.ready,
            can_create_empty: matches!(self.mode, DatasetMode::New),
            creating_empty: self.creating_empty,
        }
    }

    fn adapter_view(&self) -> AdapterView {
        let limit: Option<DocumentsLimit> = match self.limits {
            LimitsState::Pending => None,
            LimitsState::Loaded(limit) => Some(limit),
            LimitsState::Unavailable => None,
        };
        let limits_pending = self.limits == LimitsState::Pending;
        match self.source_type {
            DataSourceType::Web => AdapterView::ComingSoon,
            DataSourceType::Notion => match self.notion_connection {
                ConnectionStatus::Unknown => AdapterView::NotionCheckingConnection,
                ConnectionStatus::NotConnected => AdapterView::NotionConnect,
                ConnectionStatus::Connected if limits_pending => AdapterView::LoadingLimits,
                ConnectionStatus::Connected => AdapterView::Notion {
                    selected: self.notion.pages().to_vec(),
                    limit,
                },
            },
            _ if limits_pending => AdapterView::LoadingLimits,
            DataSourceType::File => AdapterView::Files {
                items: self.files.items(),
                limit,
            },
            DataSourceType::Lark => AdapterView::Lark {
                input: self.lark.input().to_string(),
                loading: self.lark.is_loading(),
                committed: self.lark.committed().map(str::to_string),
                committed_title: self.lark.committed_title().map(str::to_string),
                link: self.lark.committed().and_then(LarkLink::parse),
            },
        }
    }

    fn configure_view(&self) -> ConfigureView {
        let selection = self.active_adapter().committed_selection();
        let config_valid = self.configure.config.is_valid();
        ConfigureView {
            source_type: self.source_type,
            item_count: selection.as_ref().map_or(0, |s| s.item_count()),
            config: self.configure.config.clone(),
            technique_locked: self.technique_locked(),
            config_valid,
            estimate: self.configure.estimate.clone(),
            estimating: self.configure.estimating,
            submitting: self.configure.submitting,
            submit_enabled: config_valid && selection.is_some() && !self.configure.submitting,
        }
    }

    fn finish_view(&self) -> FinishView {
        let detail = self.reconciliation.detail();
        let result = self.finish.job_result.as_ref();
        FinishView {
            dataset_id: self.finished_dataset_id(),
            dataset_name: detail
                .map(|d| d.name.clone())
                .or_else(|| result.and_then(|r| r.dataset_name()).map(str::to_string)),
            indexing_technique: self.displayed_indexing_technique(),
            result: result.cloned(),
            statuses: self.finish.statuses.clone(),
            status_loading: self.finish.status_loading,
        }
    }

    /// Dataset the Finish stage reports on: the edited one, or the one the job created.
    pub(crate) fn finished_dataset_id(&self) -> Option<String> {
        self.mode
            .dataset_id()
            .or_else(|| {
                self.finish
                    .job_result
                    .as_ref()
                    .and_then(IndexingJobResult::dataset_id)
            })
            .map(str::to_string)
    }
}
