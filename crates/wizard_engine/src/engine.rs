use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use wizard_logging::{wizard_debug, wizard_warn};

use crate::client::{ConsoleApi, EventSink};
use crate::local_file::read_local_preview;
use crate::{ApiError, ApiRequest, ApiResponse, EngineEvent, Ticket};

enum EngineCommand {
    Run { ticket: Ticket, request: ApiRequest },
}

/// Front of the engine thread. Requests run concurrently on a tokio runtime;
/// every one ends in exactly one `EngineEvent::Completed` on the sink.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    next_ticket: AtomicU64,
}

impl EngineHandle {
    pub fn spawn(api: Arc<dyn ConsoleApi>, sink: Arc<dyn EventSink>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("wizard-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::Builder::new()
            .name("wizard-engine-dispatch".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let api = Arc::clone(&api);
                    let sink = Arc::clone(&sink);
                    runtime.spawn(async move {
                        handle_command(api, command, sink).await;
                    });
                }
                wizard_debug!("Engine command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            next_ticket: AtomicU64::new(1),
        })
    }

    /// Queues `request` and returns the ticket its events will carry.
    pub fn submit(&self, request: ApiRequest) -> Ticket {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        wizard_debug!("Engine ticket {} <- {}", ticket, request.label());
        if self
            .cmd_tx
            .send(EngineCommand::Run { ticket, request })
            .is_err()
        {
            wizard_warn!("Engine thread is gone; ticket {} dropped", ticket);
        }
        ticket
    }
}

async fn handle_command(api: Arc<dyn ConsoleApi>, command: EngineCommand, sink: Arc<dyn EventSink>) {
    match command {
        EngineCommand::Run { ticket, request } => {
            let result = execute(api.as_ref(), ticket, request, Arc::clone(&sink)).await;
            if let Err(err) = &result {
                wizard_debug!("Engine ticket {} failed: {}", ticket, err);
            }
            sink.emit(EngineEvent::Completed { ticket, result });
        }
    }
}

async fn execute(
    api: &dyn ConsoleApi,
    ticket: Ticket,
    request: ApiRequest,
    sink: Arc<dyn EventSink>,
) -> Result<ApiResponse, ApiError> {
    Ok(match request {
        ApiRequest::ConnectionStatus { provider } => {
            ApiResponse::ConnectionStatus(api.connection_status(&provider).await?)
        }
        ApiRequest::DocumentsLimit => ApiResponse::DocumentsLimit(api.documents_limit().await?),
        ApiRequest::DatasetDetail { dataset_id } => {
            ApiResponse::Dataset(api.dataset_detail(&dataset_id).await?)
        }
        ApiRequest::LarkPreview { reference } => {
            ApiResponse::Preview(api.lark_preview(&reference).await?)
        }
        ApiRequest::NotionPreview { page } => {
            ApiResponse::Preview(api.notion_preview(&page).await?)
        }
        ApiRequest::LocalPreview { path, name } => {
            ApiResponse::Preview(read_local_preview(&path, &name).await?)
        }
        ApiRequest::UploadFile { path } => {
            ApiResponse::Uploaded(api.upload_file(ticket, &path, sink).await?)
        }
        ApiRequest::Estimate { payload } => ApiResponse::Estimate(api.estimate(&payload).await?),
        ApiRequest::Submit {
            dataset_id,
            payload,
        } => ApiResponse::Job(api.submit(dataset_id.as_deref(), &payload).await?),
        ApiRequest::IndexingStatus { dataset_id } => {
            ApiResponse::IndexingStatus(api.indexing_status(&dataset_id).await?)
        }
        ApiRequest::CreateDataset { name } => {
            ApiResponse::Dataset(api.create_dataset(&name).await?)
        }
    })
}
