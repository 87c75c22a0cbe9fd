use wizard_logging::{wizard_debug, wizard_info, wizard_warn};

use crate::adapter::{PreviewTarget, SourceAdapter};
use crate::state::NOTION_PROVIDER;
use crate::{
    validate_dataset_name, ConnectionStatus, DataSourceType, DatasetMode, Effect, Epoch, LimitsState,
    Msg, NoticeLevel, Preview, PreviewContent, Reconciliation, RequestFailure, RequestKind, Step,
    WizardState,
};

const LARK_LOOKUP_FAILED: &str = "Failed to fetch the document, please check that the link is valid";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: WizardState, msg: Msg) -> (WizardState, Vec<Effect>) {
    // Unavailable is terminal; nothing is reachable from it.
    if state.is_unavailable() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Mounted => on_mounted(&mut state),
        Msg::DatasetDetailLoaded { epoch, result } => {
            if !accept(&state, RequestKind::DatasetDetail, epoch) {
                return finish(state, Vec::new());
            }
            match result {
                Ok(detail) => {
                    wizard_info!(
                        "Dataset {} loaded (source={:?}, technique={:?})",
                        detail.id,
                        detail.data_source_type,
                        detail.indexing_technique
                    );
                    let mut effects = Vec::new();
                    if let Some(fixed) = detail.data_source_type {
                        // A selection made for another source cannot be submitted here.
                        if fixed != state.source_type && state.step() != Step::Select {
                            return_to_select(&mut state);
                            effects.push(Effect::notify(
                                NoticeLevel::Warning,
                                format!("This dataset only accepts {fixed:?} documents; choose them again"),
                            ));
                        }
                        state.switch_source(fixed);
                    }
                    if let Some(technique) = detail.indexing_technique {
                        state.configure.config.indexing_technique = technique;
                    }
                    state.reconciliation = Reconciliation::Loaded(detail);
                    state.mark_dirty();
                    return finish(state, effects);
                }
                Err(failure) => {
                    wizard_warn!("Dataset detail fetch failed: {}", failure);
                    state.preview = None;
                    state.reconciliation = Reconciliation::Failed {
                        code: failure.unavailable_code(),
                    };
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::DocumentsLimitLoaded { epoch, result } => {
            if !accept(&state, RequestKind::DocumentsLimit, epoch) {
                return finish(state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(limit) => {
                    state.limits = LimitsState::Loaded(limit);
                    Vec::new()
                }
                Err(failure) => {
                    wizard_warn!("Documents limit fetch failed: {}", failure);
                    state.limits = LimitsState::Unavailable;
                    vec![Effect::notify(
                        NoticeLevel::Warning,
                        "Could not load the document quota",
                    )]
                }
            }
        }
        Msg::ConnectionStatusLoaded { epoch, result } => {
            if !accept(&state, RequestKind::ConnectionStatus, epoch) {
                return finish(state, Vec::new());
            }
            state.notion_connection = match result {
                Ok(true) => ConnectionStatus::Connected,
                Ok(false) => ConnectionStatus::NotConnected,
                Err(failure) => {
                    wizard_warn!("Connection status check failed: {}", failure);
                    ConnectionStatus::NotConnected
                }
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::SourceTypeSelected(source) => {
            if state.step() != Step::Select {
                return finish(state, Vec::new());
            }
            if state.source_type_locked() {
                wizard_debug!("Source type is fixed by the dataset; ignoring {:?}", source);
                return finish(state, Vec::new());
            }
            state.switch_source(source);
            Vec::new()
        }
        Msg::FilesAdded(items) => {
            if !selecting(&state, DataSourceType::File) {
                return finish(state, Vec::new());
            }
            let added = state.files.add(items);
            if !added.is_empty() {
                state.mark_dirty();
            }
            added
                .into_iter()
                .map(|item| Effect::UploadFile {
                    file_id: item.file_id,
                    path: item.file.path,
                })
                .collect()
        }
        Msg::FileUploadProgress { file_id, progress } => {
            if state.files.update_progress(&file_id, progress) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FileUploaded { file_id, file } => {
            if state.files.complete_upload(&file_id, &file) {
                wizard_info!("File {} uploaded as {}", file_id, file.id);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FileUploadFailed { file_id, failure } => {
            let name = state.files.get(&file_id).map(|item| item.file.name.clone());
            let Some(name) = name else {
                return finish(state, Vec::new());
            };
            remove_file(&mut state, &file_id);
            wizard_warn!("Upload of {} failed: {}", name, failure);
            vec![Effect::notify(
                NoticeLevel::Error,
                format!("Upload of {name} failed: {}", failure.message),
            )]
        }
        Msg::FileRemoved { file_id } => {
            remove_file(&mut state, &file_id);
            Vec::new()
        }
        Msg::NotionPagesSelected(pages) => {
            if !selecting(&state, DataSourceType::Notion) {
                return finish(state, Vec::new());
            }
            state.notion.select(pages);
            state.mark_dirty();
            Vec::new()
        }
        Msg::NotionPageDeselected { page_id } => {
            if state.notion.deselect(&page_id) {
                if state.preview.as_ref().is_some_and(|p| p.shows_page(&page_id)) {
                    state.close_preview();
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NotionSetupRequested => vec![Effect::OpenDataSourceSettings],
        Msg::PreviewRequested { key } => {
            if state.step() != Step::Select {
                return finish(state, Vec::new());
            }
            match state.active_adapter().preview_target(&key) {
                Some(PreviewTarget::LarkDocument { .. }) | None => Vec::new(),
                Some(target) => {
                    // The previous preview is discarded as soon as another item is requested.
                    state.close_preview();
                    let epoch = state.epochs.begin(RequestKind::Preview);
                    vec![Effect::FetchPreview { epoch, target }]
                }
            }
        }
        Msg::PreviewLoaded {
            epoch,
            target,
            result,
        } => match target {
            PreviewTarget::LarkDocument { reference } => {
                on_lark_loaded(&mut state, epoch, reference, result)
            }
            target => {
                if !accept(&state, RequestKind::Preview, epoch) {
                    return finish(state, Vec::new());
                }
                match result {
                    Ok(content) => {
                        state.preview = Some(Preview::from_target(target, content));
                        state.mark_dirty();
                        Vec::new()
                    }
                    Err(failure) => {
                        wizard_warn!("Preview fetch failed: {}", failure);
                        vec![Effect::notify(
                            NoticeLevel::Warning,
                            format!("Preview unavailable: {}", failure.message),
                        )]
                    }
                }
            }
        },
        Msg::PreviewClosed => {
            state.close_preview();
            Vec::new()
        }
        Msg::LarkInputChanged(text) => {
            state.lark.set_input(text);
            state.mark_dirty();
            Vec::new()
        }
        Msg::LarkSubmitted(trigger) => {
            if !selecting(&state, DataSourceType::Lark) {
                return finish(state, Vec::new());
            }
            if state.lark.is_loading() {
                wizard_debug!("Lark lookup in flight; dropping {:?}", trigger);
                return finish(state, Vec::new());
            }
            let Some(target) = state.lark.preview_target(state.lark.input()) else {
                return finish(state, Vec::new());
            };
            state.lark.set_loading(true);
            state.mark_dirty();
            let epoch = state.epochs.begin(RequestKind::LarkPreview);
            wizard_info!("Lark lookup #{} via {:?}", epoch, trigger);
            vec![Effect::FetchPreview { epoch, target }]
        }
        Msg::LarkSelectionDismissed => {
            if state.lark.dismiss() {
                if matches!(state.preview, Some(Preview::Lark { .. })) {
                    state.close_preview();
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NextClicked => {
            if state.step() == Step::Select {
                let ready = state.active_adapter().is_ready();
                if state.steps.go_forward(ready) {
                    wizard_info!("Step -> {:?} ({})", state.step(), state.source_type);
                    state.mark_dirty();
                } else {
                    wizard_debug!("Forward blocked: {} not ready", state.source_type);
                }
            }
            Vec::new()
        }
        Msg::BackClicked => {
            return_to_select(&mut state);
            Vec::new()
        }
        Msg::IndexingTechniqueChosen(technique) => {
            if !editing_config(&state) || state.technique_locked() {
                return finish(state, Vec::new());
            }
            state.configure.config.indexing_technique = technique;
            config_changed(&mut state);
            Vec::new()
        }
        Msg::ProcessRuleChanged(rule) => {
            if !editing_config(&state) {
                return finish(state, Vec::new());
            }
            state.configure.config.process_rule = rule;
            config_changed(&mut state);
            Vec::new()
        }
        Msg::DocFormChanged(form) => {
            if !editing_config(&state) {
                return finish(state, Vec::new());
            }
            state.configure.config.doc_form = form;
            config_changed(&mut state);
            Vec::new()
        }
        Msg::DocLanguageChanged(language) => {
            if !editing_config(&state) {
                return finish(state, Vec::new());
            }
            state.configure.config.doc_language = language;
            config_changed(&mut state);
            Vec::new()
        }
        Msg::EstimateRequested => {
            if !editing_config(&state)
                || state.configure.estimating
                || !state.configure.config.is_valid()
            {
                return finish(state, Vec::new());
            }
            let Some(request) = state.build_request() else {
                return finish(state, Vec::new());
            };
            state.configure.estimating = true;
            state.mark_dirty();
            let epoch = state.epochs.begin(RequestKind::Estimate);
            vec![Effect::EstimateIndexing { epoch, request }]
        }
        Msg::EstimateLoaded { epoch, result } => {
            if !accept(&state, RequestKind::Estimate, epoch) {
                return finish(state, Vec::new());
            }
            state.configure.estimating = false;
            state.mark_dirty();
            match result {
                Ok(estimate) => {
                    state.configure.estimate = Some(estimate);
                    Vec::new()
                }
                Err(failure) => {
                    wizard_warn!("Indexing estimate failed: {}", failure);
                    vec![Effect::notify(
                        NoticeLevel::Warning,
                        format!("Estimate unavailable: {}", failure.message),
                    )]
                }
            }
        }
        Msg::SubmitClicked => {
            if !editing_config(&state) || !state.configure.config.is_valid() {
                return finish(state, Vec::new());
            }
            let Some(request) = state.build_request() else {
                return finish(state, Vec::new());
            };
            state.configure.submitting = true;
            state.mark_dirty();
            let epoch = state.epochs.begin(RequestKind::Submit);
            wizard_info!(
                "Submitting {} item(s) from {} with {}",
                request.selection.item_count(),
                request.source_type,
                request.config.indexing_technique
            );
            vec![Effect::SubmitIndexing { epoch, request }]
        }
        Msg::SubmitCompleted { epoch, result } => {
            // A duplicate delivery must not replace the cached result.
            if !accept(&state, RequestKind::Submit, epoch) || !state.configure.submitting {
                return finish(state, Vec::new());
            }
            state.configure.submitting = false;
            state.mark_dirty();
            match result {
                Ok(job) => {
                    state.finish.technique_cache = Some(state.configure.config.indexing_technique);
                    state.finish.job_result = Some(job);
                    state.steps.go_forward(true);
                    wizard_info!("Indexing job accepted; step -> {:?}", state.step());
                    Vec::new()
                }
                Err(failure) => {
                    wizard_warn!("Indexing submission failed: {}", failure);
                    vec![Effect::notify(
                        NoticeLevel::Error,
                        format!("Failed to start indexing: {}", failure.message),
                    )]
                }
            }
        }
        Msg::IndexingStatusRequested => {
            if state.step() != Step::Finish
                || !state.detail_guard()
                || state.finish.status_loading
            {
                return finish(state, Vec::new());
            }
            let Some(dataset_id) = state.finished_dataset_id() else {
                return finish(state, Vec::new());
            };
            state.finish.status_loading = true;
            state.mark_dirty();
            let epoch = state.epochs.begin(RequestKind::IndexingStatus);
            vec![Effect::FetchIndexingStatus { epoch, dataset_id }]
        }
        Msg::IndexingStatusLoaded { epoch, result } => {
            if !accept(&state, RequestKind::IndexingStatus, epoch) {
                return finish(state, Vec::new());
            }
            state.finish.status_loading = false;
            state.mark_dirty();
            match result {
                Ok(statuses) => {
                    state.finish.statuses = statuses;
                    Vec::new()
                }
                Err(failure) => {
                    wizard_warn!("Indexing status fetch failed: {}", failure);
                    vec![Effect::notify(
                        NoticeLevel::Warning,
                        format!("Could not refresh indexing status: {}", failure.message),
                    )]
                }
            }
        }
        Msg::EmptyDatasetRequested { name } => {
            if state.mode != DatasetMode::New
                || state.step() != Step::Select
                || state.creating_empty
            {
                return finish(state, Vec::new());
            }
            match validate_dataset_name(&name) {
                Ok(name) => {
                    state.creating_empty = true;
                    state.mark_dirty();
                    let epoch = state.epochs.begin(RequestKind::EmptyDataset);
                    vec![Effect::CreateEmptyDataset { epoch, name }]
                }
                Err(err) => vec![Effect::notify(NoticeLevel::Error, err.to_string())],
            }
        }
        Msg::EmptyDatasetCreated { epoch, result } => {
            if !accept(&state, RequestKind::EmptyDataset, epoch) {
                return finish(state, Vec::new());
            }
            state.creating_empty = false;
            state.mark_dirty();
            match result {
                Ok(detail) => vec![
                    Effect::notify(NoticeLevel::Success, format!("Created dataset {}", detail.name)),
                    Effect::OpenDataset {
                        dataset_id: detail.id,
                    },
                ],
                Err(failure) => vec![Effect::notify(
                    NoticeLevel::Error,
                    format!("Failed to create dataset: {}", failure.message),
                )],
            }
        }
        Msg::Tick => Vec::new(),
    };

    finish(state, effects)
}

fn finish(mut state: WizardState, effects: Vec<Effect>) -> (WizardState, Vec<Effect>) {
    state.refresh_readiness();
    (state, effects)
}

fn on_mounted(state: &mut WizardState) -> Vec<Effect> {
    if state.mounted {
        return Vec::new();
    }
    state.mounted = true;
    state.mark_dirty();

    let mut effects = Vec::with_capacity(3);
    let epoch = state.epochs.begin(RequestKind::ConnectionStatus);
    effects.push(Effect::FetchConnectionStatus {
        epoch,
        provider: NOTION_PROVIDER.to_string(),
    });
    let epoch = state.epochs.begin(RequestKind::DocumentsLimit);
    effects.push(Effect::FetchDocumentsLimit { epoch });

    if let DatasetMode::Existing { dataset_id } = &state.mode {
        if state.reconciliation == Reconciliation::Pending {
            let dataset_id = dataset_id.clone();
            state.reconciliation = Reconciliation::Loading;
            let epoch = state.epochs.begin(RequestKind::DatasetDetail);
            effects.push(Effect::FetchDatasetDetail { epoch, dataset_id });
        }
    }
    effects
}

fn on_lark_loaded(
    state: &mut WizardState,
    epoch: Epoch,
    reference: String,
    result: Result<PreviewContent, RequestFailure>,
) -> Vec<Effect> {
    if !accept(state, RequestKind::LarkPreview, epoch) {
        return Vec::new();
    }
    state.lark.set_loading(false);
    state.mark_dirty();
    match result {
        Ok(content) => {
            wizard_info!("Lark document committed: {}", content.title);
            state.lark.commit(reference.clone(), content.title.clone());
            state.preview = Some(Preview::Lark {
                reference,
                title: content.title,
                content: content.content,
            });
            Vec::new()
        }
        Err(failure) => {
            wizard_warn!("Lark lookup for {} failed: {}", reference, failure);
            vec![Effect::notify(NoticeLevel::Error, LARK_LOOKUP_FAILED)]
        }
    }
}

fn remove_file(state: &mut WizardState, file_id: &str) {
    if state.files.remove(file_id) {
        if state.preview.as_ref().is_some_and(|p| p.shows_file(file_id)) {
            state.close_preview();
        }
        state.mark_dirty();
    }
}

fn config_changed(state: &mut WizardState) {
    state.epochs.invalidate(RequestKind::Estimate);
    state.configure.estimating = false;
    state.configure.estimate = None;
    state.mark_dirty();
}

/// Completions are applied only while their epoch is current.
fn accept(state: &WizardState, kind: RequestKind, epoch: Epoch) -> bool {
    let current = state.epochs.is_current(kind, epoch);
    if !current {
        wizard_debug!("Ignoring stale {:?} completion (epoch {})", kind, epoch);
    }
    current
}

fn selecting(state: &WizardState, source: DataSourceType) -> bool {
    state.step() == Step::Select && state.source_type == source
}

/// Configure-stage edits: rendered (detail guard) and not mid-submission.
/// Configure -> Select, dropping any estimate or submission in flight.
fn return_to_select(state: &mut WizardState) {
    if state.steps.go_back(1) {
        state.epochs.invalidate(RequestKind::Estimate);
        state.epochs.invalidate(RequestKind::Submit);
        state.configure.estimating = false;
        state.configure.submitting = false;
        state.mark_dirty();
    }
}

fn editing_config(state: &WizardState) -> bool {
    state.step() == Step::Configure && state.detail_guard() && !state.configure.submitting
}
