use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ab_glyph::FontVec;
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use crate::cover::{CoverLoader, ReqwestCoverLoader};
use crate::export::SnapshotExporter;
use crate::graphql::{GraphQlRequest, QueryClient, ReqwestQueryClient};
use crate::snapshot::{load_font, CardSnapshot, CoverSource};
use crate::{CardContent, EngineConfig, EngineEvent, QueryError, RasterFormat, RequestSeq};

enum EngineCommand {
    Query {
        seq: RequestSeq,
        request: GraphQlRequest,
    },
    Export {
        content: CardContent,
        format: RasterFormat,
        filename_base: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineStartError {
    #[error("query client: {0}")]
    Query(#[from] QueryError),
    #[error("cover loader: {0}")]
    Http(#[from] reqwest::Error),
}

/// Shared pieces every command runs against.
#[derive(Clone)]
struct Services {
    client: Arc<dyn QueryClient>,
    covers: Arc<dyn CoverLoader>,
    exporter: Arc<SnapshotExporter>,
    font: Option<Arc<FontVec>>,
}

/// Runs queries and exports on a background tokio runtime and reports
/// completions as [`EngineEvent`]s. Neither kind of work can be cancelled.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineStartError> {
        let client = Arc::new(ReqwestQueryClient::new(config)?);
        let covers = Arc::new(ReqwestCoverLoader::new(config)?);
        let exporter = Arc::new(SnapshotExporter::new(config.download_dir.clone()));
        let font = match &config.font_path {
            Some(path) => match load_font(path) {
                Ok(font) => Some(Arc::new(font)),
                Err(err) => {
                    viewer_warn!("Could not load font {:?}: {}; cards will have no text", path, err);
                    None
                }
            },
            None => {
                viewer_warn!("No font configured; cards will have no text");
                None
            }
        };
        Ok(Self::with_parts(client, covers, exporter, font))
    }

    pub fn with_parts(
        client: Arc<dyn QueryClient>,
        covers: Arc<dyn CoverLoader>,
        exporter: Arc<SnapshotExporter>,
        font: Option<Arc<FontVec>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let services = Services {
            client,
            covers,
            exporter,
            font,
        };

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let services = services.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&services, command, event_tx).await;
                });
            }
            runtime.shutdown_timeout(Duration::from_secs(5));
        });

        Self { cmd_tx, event_rx }
    }

    pub fn query(&self, seq: RequestSeq, request: GraphQlRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Query { seq, request });
    }

    pub fn export(&self, content: CardContent, format: RasterFormat, filename_base: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Export {
            content,
            format,
            filename_base: filename_base.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    services: &Services,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Query { seq, request } => {
            let result = services.client.execute(&request).await;
            match &result {
                Ok(_) => viewer_debug!("Query seq={} completed", seq),
                Err(err) => viewer_warn!("Query seq={} failed: {}", seq, err),
            }
            let _ = event_tx.send(EngineEvent::QueryCompleted { seq, result });
        }
        EngineCommand::Export {
            content,
            format,
            filename_base,
        } => {
            let cover = match content.cover_url.as_deref() {
                Some(url) => services.covers.load(url).await,
                None => CoverSource::None,
            };
            let snapshot = CardSnapshot::new(content, cover, services.font.clone());
            let exporter = services.exporter.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                exporter.export(&snapshot, format, &filename_base)
            })
            .await;
            let result = match outcome {
                Ok(Ok(path)) => Ok(path),
                Ok(Err(err)) => Err(err.to_string()),
                Err(join_err) => Err(format!("export task failed: {join_err}")),
            };
            if let Ok(path) = &result {
                viewer_info!("Export finished: {}", path.display());
            }
            let _ = event_tx.send(EngineEvent::ExportCompleted { result });
        }
    }
}
