use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use url::Url;
use wizard_logging::{wizard_debug, wizard_trace};

use crate::local_file::io_error;
use crate::wire;
use crate::{
    ApiError, DatasetRecord, DocumentsQuota, EngineEvent, EstimateRecord, FailureKind,
    IndexingPayload, IndexingStatusRecord, NotionPageRef, PageContent, Ticket, UploadedFileRecord,
};

/// Upload progress stays below 100 until the server has answered.
const MAX_STREAMING_PERCENT: u8 = 99;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Console API root, e.g. `https://host/console/api`.
    pub base_url: String,
    pub api_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001/console/api".to_string(),
            api_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
        }
    }
}

/// Receives engine events; implemented by whatever the driver listens on.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

impl EventSink for std::sync::mpsc::Sender<EngineEvent> {
    fn emit(&self, event: EngineEvent) {
        let _ = self.send(event);
    }
}

/// The backend operations the wizard depends on.
#[async_trait::async_trait]
pub trait ConsoleApi: Send + Sync {
    /// True when an integration for `provider` is bound.
    async fn connection_status(&self, provider: &str) -> Result<bool, ApiError>;
    async fn documents_limit(&self) -> Result<DocumentsQuota, ApiError>;
    async fn dataset_detail(&self, dataset_id: &str) -> Result<DatasetRecord, ApiError>;
    async fn lark_preview(&self, reference: &str) -> Result<PageContent, ApiError>;
    async fn notion_preview(&self, page: &NotionPageRef) -> Result<PageContent, ApiError>;
    /// Streams the file as multipart, reporting `UploadProgress` for `ticket` to `sink`.
    async fn upload_file(
        &self,
        ticket: Ticket,
        path: &Path,
        sink: Arc<dyn EventSink>,
    ) -> Result<UploadedFileRecord, ApiError>;
    async fn estimate(&self, payload: &IndexingPayload) -> Result<EstimateRecord, ApiError>;
    /// Starts indexing; the response is returned verbatim.
    async fn submit(
        &self,
        dataset_id: Option<&str>,
        payload: &IndexingPayload,
    ) -> Result<serde_json::Value, ApiError>;
    async fn indexing_status(&self, dataset_id: &str)
        -> Result<Vec<IndexingStatusRecord>, ApiError>;
    async fn create_dataset(&self, name: &str) -> Result<DatasetRecord, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestConsoleApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct Integration {
    provider: String,
}

#[derive(Deserialize)]
struct NotionPreviewBody {
    content: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ReqwestConsoleApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    /// Base URL extended by `segments`, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.settings.api_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        wizard_trace!("GET {}", url);
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        wizard_trace!("POST {}", url);
        let response = self
            .authorize(self.client.post(url).json(body))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl ConsoleApi for ReqwestConsoleApi {
    async fn connection_status(&self, provider: &str) -> Result<bool, ApiError> {
        let url = self.endpoint(&["data-source", "integrates"])?;
        let envelope: DataEnvelope<Integration> = self.get_json(url).await?;
        Ok(envelope
            .data
            .iter()
            .any(|integration| integration.provider == provider))
    }

    async fn documents_limit(&self) -> Result<DocumentsQuota, ApiError> {
        let url = self.endpoint(&["datasets", "limit"])?;
        self.get_json(url).await
    }

    async fn dataset_detail(&self, dataset_id: &str) -> Result<DatasetRecord, ApiError> {
        let url = self.endpoint(&["datasets", dataset_id])?;
        self.get_json(url).await
    }

    async fn lark_preview(&self, reference: &str) -> Result<PageContent, ApiError> {
        let mut url = self.endpoint(&["lark", "preview"])?;
        url.query_pairs_mut().append_pair("link", reference);
        self.get_json(url).await
    }

    async fn notion_preview(&self, page: &NotionPageRef) -> Result<PageContent, ApiError> {
        let url = self.endpoint(&[
            "notion",
            "workspaces",
            page.workspace_id.as_str(),
            "pages",
            page.page_id.as_str(),
            page.page_type.as_str(),
            "preview",
        ])?;
        let body: NotionPreviewBody = self.get_json(url).await?;
        Ok(PageContent {
            title: page.page_name.clone(),
            content: body.content,
        })
    }

    async fn upload_file(
        &self,
        ticket: Ticket,
        path: &Path,
        sink: Arc<dyn EventSink>,
    ) -> Result<UploadedFileRecord, ApiError> {
        let url = self.endpoint(&["files", "upload"])?;
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|err| io_error(path, &err))?;
        let total = file
            .metadata()
            .await
            .map_err(|err| io_error(path, &err))?
            .len();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let sent = Arc::new(AtomicU64::new(0));
        let last_percent = Arc::new(AtomicU8::new(0));
        let stream = ReaderStream::new(file).inspect_ok(move |chunk: &Bytes| {
            let sent = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
            let percent = streaming_percent(sent, total);
            if last_percent.swap(percent, Ordering::Relaxed) != percent {
                sink.emit(EngineEvent::UploadProgress { ticket, percent });
            }
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(name.clone());
        let form = Form::new().part("file", part);
        wizard_debug!("Uploading {} ({} bytes)", name, total);
        let response = self
            .authorize(self.client.post(url).multipart(form))
            .timeout(self.settings.upload_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn estimate(&self, payload: &IndexingPayload) -> Result<EstimateRecord, ApiError> {
        let url = self.endpoint(&["datasets", "indexing-estimate"])?;
        self.post_json(url, &wire::estimate_body(payload)).await
    }

    async fn submit(
        &self,
        dataset_id: Option<&str>,
        payload: &IndexingPayload,
    ) -> Result<serde_json::Value, ApiError> {
        let url = match dataset_id {
            Some(dataset_id) => self.endpoint(&["datasets", dataset_id, "documents"])?,
            None => self.endpoint(&["datasets", "init"])?,
        };
        self.post_json(url, &wire::submit_body(payload)).await
    }

    async fn indexing_status(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<IndexingStatusRecord>, ApiError> {
        let url = self.endpoint(&["datasets", dataset_id, "indexing-status"])?;
        let envelope: DataEnvelope<IndexingStatusRecord> = self.get_json(url).await?;
        Ok(envelope.data)
    }

    async fn create_dataset(&self, name: &str) -> Result<DatasetRecord, ApiError> {
        let url = self.endpoint(&["datasets"])?;
        self.post_json(url, &serde_json::json!({ "name": name })).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .map(|error| error.message)
            .unwrap_or_else(|_| status.to_string());
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            message,
        ));
    }
    serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn streaming_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = sent.min(total) * 100 / total;
    (percent as u8).min(MAX_STREAMING_PERCENT)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
