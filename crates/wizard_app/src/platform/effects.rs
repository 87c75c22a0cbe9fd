use std::collections::HashMap;

use wizard_core::{
    DataSourceType, DatasetDetail, DocumentIndexingStatus, DocumentsLimit, Effect, Epoch,
    IndexingEstimate, IndexingJobResult, IndexingRequest, IndexingTechnique, Msg, NotionPage,
    PreviewContent, PreviewTarget, ProcessRule, RequestFailure, Selection, UploadedFile,
};
use wizard_engine::{
    ApiError, ApiRequest, ApiResponse, DataSourcePayload, DatasetRecord, EngineEvent,
    EngineHandle, IndexingPayload, NotionPageRef, ProcessRulePayload, Ticket,
};
use wizard_logging::{wizard_debug, wizard_info, wizard_warn};

/// What an in-flight ticket was issued for, so its completion can be routed back.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingRequest {
    ConnectionStatus { epoch: Epoch },
    DocumentsLimit { epoch: Epoch },
    DatasetDetail { epoch: Epoch },
    Upload { file_id: String },
    Preview { epoch: Epoch, target: PreviewTarget },
    Estimate { epoch: Epoch },
    Submit { epoch: Epoch },
    IndexingStatus { epoch: Epoch },
    CreateDataset { epoch: Epoch },
}

/// Turns backend effects into engine requests and engine events back into messages.
///
/// Only the dispatch thread touches the ticket table, so a completion can never
/// be translated before its ticket has been recorded.
pub struct EffectRunner {
    engine: EngineHandle,
    pending: HashMap<Ticket, PendingRequest>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            pending: HashMap::new(),
        }
    }

    /// True when no request is waiting for its completion.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn run(&mut self, effect: Effect) {
        let Some((request, pending)) = backend_request(effect) else {
            return;
        };
        let ticket = self.engine.submit(request);
        self.pending.insert(ticket, pending);
    }

    pub fn translate(&mut self, event: EngineEvent) -> Option<Msg> {
        match event {
            EngineEvent::UploadProgress { ticket, percent } => match self.pending.get(&ticket) {
                Some(PendingRequest::Upload { file_id }) => Some(Msg::FileUploadProgress {
                    file_id: file_id.clone(),
                    progress: percent,
                }),
                _ => None,
            },
            EngineEvent::Completed { ticket, result } => match self.pending.remove(&ticket) {
                Some(pending) => Some(completion_msg(pending, result)),
                None => {
                    wizard_warn!("Completion for unknown ticket {}", ticket);
                    None
                }
            },
        }
    }
}

fn backend_request(effect: Effect) -> Option<(ApiRequest, PendingRequest)> {
    Some(match effect {
        Effect::FetchConnectionStatus { epoch, provider } => (
            ApiRequest::ConnectionStatus { provider },
            PendingRequest::ConnectionStatus { epoch },
        ),
        Effect::FetchDocumentsLimit { epoch } => (
            ApiRequest::DocumentsLimit,
            PendingRequest::DocumentsLimit { epoch },
        ),
        Effect::FetchDatasetDetail { epoch, dataset_id } => (
            ApiRequest::DatasetDetail { dataset_id },
            PendingRequest::DatasetDetail { epoch },
        ),
        Effect::UploadFile { file_id, path } => (
            ApiRequest::UploadFile { path },
            PendingRequest::Upload { file_id },
        ),
        Effect::FetchPreview { epoch, target } => (
            preview_request(&target),
            PendingRequest::Preview { epoch, target },
        ),
        Effect::EstimateIndexing { epoch, request } => (
            ApiRequest::Estimate {
                payload: indexing_payload(&request),
            },
            PendingRequest::Estimate { epoch },
        ),
        Effect::SubmitIndexing { epoch, request } => {
            wizard_info!(
                "Submitting {} item(s) from {} for indexing",
                request.selection.item_count(),
                request.source_type
            );
            (
                ApiRequest::Submit {
                    dataset_id: request.dataset_id.clone(),
                    payload: indexing_payload(&request),
                },
                PendingRequest::Submit { epoch },
            )
        }
        Effect::FetchIndexingStatus { epoch, dataset_id } => (
            ApiRequest::IndexingStatus { dataset_id },
            PendingRequest::IndexingStatus { epoch },
        ),
        Effect::CreateEmptyDataset { epoch, name } => (
            ApiRequest::CreateDataset { name },
            PendingRequest::CreateDataset { epoch },
        ),
        Effect::OpenDataSourceSettings | Effect::OpenDataset { .. } | Effect::Notify { .. } => {
            wizard_debug!("Surface effect has no backend request");
            return None;
        }
    })
}

fn preview_request(target: &PreviewTarget) -> ApiRequest {
    match target {
        PreviewTarget::LocalFile { name, path, .. } => ApiRequest::LocalPreview {
            path: path.clone(),
            name: name.clone(),
        },
        PreviewTarget::NotionPage(page) => ApiRequest::NotionPreview {
            page: notion_ref(page),
        },
        PreviewTarget::LarkDocument { reference } => ApiRequest::LarkPreview {
            reference: reference.clone(),
        },
    }
}

fn notion_ref(page: &NotionPage) -> NotionPageRef {
    NotionPageRef {
        page_id: page.page_id.clone(),
        page_name: page.page_name.clone(),
        page_icon: page.page_icon.clone(),
        workspace_id: page.workspace_id.clone(),
        page_type: page.page_type.clone(),
    }
}

fn indexing_payload(request: &IndexingRequest) -> IndexingPayload {
    let data_source = match &request.selection {
        Selection::Files(files) => DataSourcePayload::Files {
            file_ids: files.iter().map(|file| file.id.clone()).collect(),
        },
        Selection::NotionPages(pages) => DataSourcePayload::Notion {
            pages: pages.iter().map(notion_ref).collect(),
        },
        Selection::LarkDocument(reference) => DataSourcePayload::Lark {
            reference: reference.clone(),
        },
    };
    let process_rule = match &request.config.process_rule {
        ProcessRule::Automatic => ProcessRulePayload::Automatic,
        ProcessRule::Custom(rule) => ProcessRulePayload::Custom {
            separator: rule.separator.clone(),
            max_tokens: rule.max_tokens,
            remove_extra_spaces: rule.remove_extra_spaces,
            remove_urls_emails: rule.remove_urls_emails,
        },
    };
    IndexingPayload {
        data_source,
        indexing_technique: request.config.indexing_technique.wire_name().to_string(),
        process_rule,
        doc_form: request.config.doc_form.wire_name().to_string(),
        doc_language: request.config.doc_language.clone(),
    }
}

fn completion_msg(pending: PendingRequest, result: Result<ApiResponse, ApiError>) -> Msg {
    match pending {
        PendingRequest::ConnectionStatus { epoch } => Msg::ConnectionStatusLoaded {
            epoch,
            result: expect_response(result, |response| match response {
                ApiResponse::ConnectionStatus(connected) => Some(connected),
                _ => None,
            }),
        },
        PendingRequest::DocumentsLimit { epoch } => Msg::DocumentsLimitLoaded {
            epoch,
            result: expect_response(result, |response| match response {
                ApiResponse::DocumentsLimit(quota) => Some(DocumentsLimit {
                    documents_limit: quota.documents_limit,
                    documents_count: quota.documents_count,
                }),
                _ => None,
            }),
        },
        PendingRequest::DatasetDetail { epoch } => Msg::DatasetDetailLoaded {
            epoch,
            result: expect_response(result, dataset_detail),
        },
        PendingRequest::Upload { file_id } => {
            match expect_response(result, |response| match response {
                ApiResponse::Uploaded(record) => Some(UploadedFile {
                    id: record.id,
                    name: record.name,
                    size: record.size,
                    extension: record.extension,
                }),
                _ => None,
            }) {
                Ok(file) => Msg::FileUploaded { file_id, file },
                Err(failure) => Msg::FileUploadFailed { file_id, failure },
            }
        }
        PendingRequest::Preview { epoch, target } => Msg::PreviewLoaded {
            epoch,
            target,
            result: expect_response(result, |response| match response {
                ApiResponse::Preview(page) => Some(PreviewContent {
                    title: page.title,
                    content: page.content,
                }),
                _ => None,
            }),
        },
        PendingRequest::Estimate { epoch } => Msg::EstimateLoaded {
            epoch,
            result: expect_response(result, |response| match response {
                ApiResponse::Estimate(record) => Some(IndexingEstimate {
                    total_segments: record.total_segments,
                    tokens: record.tokens,
                    total_price: record.total_price,
                    currency: record.currency,
                }),
                _ => None,
            }),
        },
        PendingRequest::Submit { epoch } => Msg::SubmitCompleted {
            epoch,
            result: expect_response(result, |response| match response {
                ApiResponse::Job(raw) => Some(IndexingJobResult::new(raw)),
                _ => None,
            }),
        },
        PendingRequest::IndexingStatus { epoch } => Msg::IndexingStatusLoaded {
            epoch,
            result: expect_response(result, |response| match response {
                ApiResponse::IndexingStatus(records) => Some(
                    records
                        .into_iter()
                        .map(|record| DocumentIndexingStatus {
                            id: record.id,
                            indexing_status: record.indexing_status,
                            completed_segments: record.completed_segments,
                            total_segments: record.total_segments,
                            error: record.error,
                        })
                        .collect(),
                ),
                _ => None,
            }),
        },
        PendingRequest::CreateDataset { epoch } => Msg::EmptyDatasetCreated {
            epoch,
            result: expect_response(result, dataset_detail),
        },
    }
}

fn dataset_detail(response: ApiResponse) -> Option<DatasetDetail> {
    match response {
        ApiResponse::Dataset(record) => Some(detail_from_record(record)),
        _ => None,
    }
}

/// Unknown wire names read as "not set yet".
fn detail_from_record(record: DatasetRecord) -> DatasetDetail {
    DatasetDetail {
        data_source_type: record
            .data_source_type
            .as_deref()
            .and_then(DataSourceType::from_wire),
        indexing_technique: record
            .indexing_technique
            .as_deref()
            .and_then(IndexingTechnique::from_wire),
        id: record.id,
        name: record.name,
    }
}

fn expect_response<T>(
    result: Result<ApiResponse, ApiError>,
    pick: impl FnOnce(ApiResponse) -> Option<T>,
) -> Result<T, RequestFailure> {
    match result {
        Ok(response) => pick(response).ok_or_else(|| {
            wizard_warn!("Engine answered with the wrong response kind");
            RequestFailure::new(None, "unexpected response from the console backend")
        }),
        Err(err) => Err(RequestFailure::new(err.status(), err.message)),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wizard_core::{
        CustomRule, DataSourceType, DocForm, IndexingConfig, IndexingRequest, IndexingTechnique,
        Msg, NotionPage, PreviewTarget, ProcessRule, Selection, UploadedFile,
    };
    use wizard_engine::{
        ApiResponse, DataSourcePayload, DatasetRecord, EstimateRecord, ProcessRulePayload,
        UploadedFileRecord,
    };

    use super::{
        completion_msg, detail_from_record, expect_response, indexing_payload, preview_request,
        PendingRequest,
    };

    fn notion_page() -> NotionPage {
        NotionPage {
            page_id: "p1".to_string(),
            page_name: "Roadmap".to_string(),
            page_icon: Some("🗺".to_string()),
            workspace_id: "ws1".to_string(),
            page_type: "database".to_string(),
        }
    }

    #[test]
    fn payload_carries_selection_and_config_in_wire_names() {
        let request = IndexingRequest {
            dataset_id: Some("ds-1".to_string()),
            source_type: DataSourceType::File,
            selection: Selection::Files(vec![UploadedFile {
                id: "srv-1".to_string(),
                name: "a.md".to_string(),
                size: 3,
                extension: Some("md".to_string()),
            }]),
            config: IndexingConfig {
                indexing_technique: IndexingTechnique::Economy,
                process_rule: ProcessRule::Custom(CustomRule {
                    max_tokens: 300,
                    ..CustomRule::default()
                }),
                doc_form: DocForm::QaModel,
                doc_language: "German".to_string(),
            },
        };
        let payload = indexing_payload(&request);
        assert_eq!(
            payload.data_source,
            DataSourcePayload::Files {
                file_ids: vec!["srv-1".to_string()]
            }
        );
        assert_eq!(payload.indexing_technique, "economy");
        assert_eq!(payload.doc_form, "qa_model");
        assert_eq!(payload.doc_language, "German");
        assert!(matches!(
            payload.process_rule,
            ProcessRulePayload::Custom { max_tokens: 300, remove_extra_spaces: true, .. }
        ));
    }

    #[test]
    fn notion_preview_keeps_page_type() {
        let request = preview_request(&PreviewTarget::NotionPage(notion_page()));
        match request {
            wizard_engine::ApiRequest::NotionPreview { page } => {
                assert_eq!(page.page_type, "database");
                assert_eq!(page.workspace_id, "ws1");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn local_preview_reads_from_disk() {
        let request = preview_request(&PreviewTarget::LocalFile {
            file_id: "f1".to_string(),
            name: "notes.txt".to_string(),
            path: PathBuf::from("/tmp/notes.txt"),
        });
        assert_eq!(
            request,
            wizard_engine::ApiRequest::LocalPreview {
                path: PathBuf::from("/tmp/notes.txt"),
                name: "notes.txt".to_string(),
            }
        );
    }

    #[test]
    fn unknown_wire_names_are_left_unset() {
        let detail = detail_from_record(DatasetRecord {
            id: "ds".to_string(),
            name: "Docs".to_string(),
            data_source_type: Some("dropbox".to_string()),
            indexing_technique: Some("economy".to_string()),
        });
        assert_eq!(detail.data_source_type, None);
        assert_eq!(detail.indexing_technique, Some(IndexingTechnique::Economy));
    }

    #[test]
    fn upload_completion_carries_the_local_file_id() {
        let msg = completion_msg(
            PendingRequest::Upload {
                file_id: "local-1".to_string(),
            },
            Ok(ApiResponse::Uploaded(UploadedFileRecord {
                id: "srv-9".to_string(),
                name: "a.md".to_string(),
                size: 10,
                extension: None,
            })),
        );
        match msg {
            Msg::FileUploaded { file_id, file } => {
                assert_eq!(file_id, "local-1");
                assert_eq!(file.id, "srv-9");
            }
            other => panic!("unexpected msg {other:?}"),
        }
    }

    #[test]
    fn wrong_response_kind_becomes_a_failure() {
        let result = expect_response(
            Ok(ApiResponse::Estimate(EstimateRecord {
                total_segments: 1,
                tokens: 1,
                total_price: None,
                currency: None,
            })),
            |response| match response {
                ApiResponse::Job(raw) => Some(raw),
                _ => None,
            },
        );
        assert_eq!(result.unwrap_err().status, None);

        let job = expect_response(
            Ok(ApiResponse::Job(json!({"batch": "b1"}))),
            |response| match response {
                ApiResponse::Job(raw) => Some(raw),
                _ => None,
            },
        );
        assert_eq!(job.unwrap()["batch"], "b1");
    }
}
