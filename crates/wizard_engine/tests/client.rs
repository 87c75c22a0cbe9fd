use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wizard_engine::{
    ApiSettings, ConsoleApi, DataSourcePayload, DatasetRecord, DocumentsQuota, EngineEvent,
    EventSink, FailureKind, IndexingPayload, NotionPageRef, PageContent, ProcessRulePayload,
    ReqwestConsoleApi,
};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn api(server: &MockServer) -> ReqwestConsoleApi {
    ReqwestConsoleApi::new(ApiSettings {
        base_url: format!("{}/console/api", server.uri()),
        api_token: Some("secret".to_string()),
        ..ApiSettings::default()
    })
    .expect("client")
}

fn lark_payload() -> IndexingPayload {
    IndexingPayload {
        data_source: DataSourcePayload::Lark {
            reference: "https://acme.feishu.cn/docx/Abc1".to_string(),
        },
        indexing_technique: "economy".to_string(),
        process_rule: ProcessRulePayload::Automatic,
        doc_form: "text_model".to_string(),
        doc_language: "English".to_string(),
    }
}

#[tokio::test]
async fn dataset_detail_sends_token_and_parses_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/datasets/42"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "name": "Handbook",
            "data_source_type": "notion_import",
            "indexing_technique": "high_quality",
            "word_count": 1200
        })))
        .mount(&server)
        .await;

    let record = api(&server).dataset_detail("42").await.expect("detail");
    assert_eq!(
        record,
        DatasetRecord {
            id: "42".to_string(),
            name: "Handbook".to_string(),
            data_source_type: Some("notion_import".to_string()),
            indexing_technique: Some("high_quality".to_string()),
        }
    );
}

#[tokio::test]
async fn server_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/datasets/42"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "internal_server_error",
            "message": "boom"
        })))
        .mount(&server)
        .await;

    let err = api(&server).dataset_detail("42").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "boom");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn connection_status_matches_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/data-source/integrates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "provider": "notion", "is_bound": true }]
        })))
        .mount(&server)
        .await;

    let api = api(&server);
    assert!(api.connection_status("notion").await.unwrap());
    assert!(!api.connection_status("lark").await.unwrap());
}

#[tokio::test]
async fn documents_limit_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/datasets/limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents_limit": 50,
            "documents_count": 12
        })))
        .mount(&server)
        .await;

    assert_eq!(
        api(&server).documents_limit().await.unwrap(),
        DocumentsQuota {
            documents_limit: 50,
            documents_count: 12,
        }
    );
}

#[tokio::test]
async fn lark_preview_passes_link_as_query() {
    let server = MockServer::start().await;
    let link = "https://acme.feishu.cn/docx/Abc1";
    Mock::given(method("GET"))
        .and(path("/console/api/lark/preview"))
        .and(query_param("link", link))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Roadmap",
            "content": "# Roadmap"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/console/api/lark/preview"))
        .and(query_param("link", "nonsense"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "invalid link" })))
        .mount(&server)
        .await;

    let api = api(&server);
    assert_eq!(
        api.lark_preview(link).await.unwrap(),
        PageContent {
            title: "Roadmap".to_string(),
            content: "# Roadmap".to_string(),
        }
    );
    let err = api.lark_preview("nonsense").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.message, "invalid link");
}

#[tokio::test]
async fn notion_preview_uses_page_name_as_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/notion/workspaces/ws1/pages/p1/page/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "hello" })))
        .mount(&server)
        .await;

    let page = NotionPageRef {
        page_id: "p1".to_string(),
        page_name: "Intro".to_string(),
        page_icon: None,
        workspace_id: "ws1".to_string(),
        page_type: "page".to_string(),
    };
    let content = api(&server).notion_preview(&page).await.unwrap();
    assert_eq!(content.title, "Intro");
    assert_eq!(content.content, "hello");
}

#[tokio::test]
async fn submit_routes_by_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/api/datasets/init"))
        .and(body_partial_json(json!({
            "data_source": {
                "type": "lark_import",
                "info_list": {
                    "data_source_type": "lark_import",
                    "file_info_list": { "file_ids": ["https://acme.feishu.cn/docx/Abc1"] }
                }
            },
            "indexing_technique": "economy",
            "process_rule": { "mode": "automatic" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dataset": { "id": "new-ds", "name": "Roadmap" },
            "batch": "b1",
            "documents": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/console/api/datasets/7/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "batch": "b2" })))
        .mount(&server)
        .await;

    let api = api(&server);
    let created = api.submit(None, &lark_payload()).await.unwrap();
    assert_eq!(created["dataset"]["id"], "new-ds");
    let appended = api.submit(Some("7"), &lark_payload()).await.unwrap();
    assert_eq!(appended, json!({ "batch": "b2" }));
}

#[tokio::test]
async fn estimate_accepts_numeric_price() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/api/datasets/indexing-estimate"))
        .and(body_partial_json(json!({ "doc_form": "text_model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_segments": 4,
            "tokens": 900,
            "total_price": 0.0018,
            "currency": "USD"
        })))
        .mount(&server)
        .await;

    let estimate = api(&server).estimate(&lark_payload()).await.unwrap();
    assert_eq!(estimate.total_segments, 4);
    assert_eq!(estimate.total_price.as_deref(), Some("0.0018"));
}

#[tokio::test]
async fn indexing_status_unwraps_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/datasets/7/indexing-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "doc-1",
                "indexing_status": "completed",
                "completed_segments": 5,
                "total_segments": 5
            }]
        })))
        .mount(&server)
        .await;

    let statuses = api(&server).indexing_status("7").await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].indexing_status, "completed");
    assert_eq!(statuses[0].error, None);
}

#[tokio::test]
async fn create_dataset_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/api/datasets"))
        .and(body_partial_json(json!({ "name": "Notes" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "ds-3",
            "name": "Notes"
        })))
        .mount(&server)
        .await;

    let record = api(&server).create_dataset("Notes").await.unwrap();
    assert_eq!(record.id, "ds-3");
    assert_eq!(record.data_source_type, None);
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/datasets/limit"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api(&server).documents_limit().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/datasets/limit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "documents_limit": 1, "documents_count": 0 })),
        )
        .mount(&server)
        .await;

    let api = ReqwestConsoleApi::new(ApiSettings {
        base_url: format!("{}/console/api", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.documents_limit().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn upload_streams_file_and_reports_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/console/api/files/upload"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "file-1",
            "name": "notes.txt",
            "size": 11,
            "extension": "txt"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.txt");
    let mut file = std::fs::File::create(&file_path).unwrap();
    file.write_all(b"hello world").unwrap();
    drop(file);

    let sink = Arc::new(TestSink::default());
    let record = api(&server)
        .upload_file(9, &file_path, sink.clone())
        .await
        .expect("upload");
    assert_eq!(record.id, "file-1");
    assert_eq!(record.extension.as_deref(), Some("txt"));

    let progress: Vec<u8> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::UploadProgress { ticket: 9, percent } => Some(percent),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last(), Some(&99));
    assert!(progress.iter().all(|percent| *percent <= 99));

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"notes.txt\""));
    assert!(body.contains("hello world"));
}

#[tokio::test]
async fn missing_upload_file_is_an_io_failure() {
    let server = MockServer::start().await;
    let sink = Arc::new(TestSink::default());
    let err = api(&server)
        .upload_file(1, std::path::Path::new("/definitely/not/here.txt"), sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestConsoleApi::new(ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
