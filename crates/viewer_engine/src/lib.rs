//! Viewer engine: GraphQL query client, snapshot export and effect execution.
mod config;
mod cover;
mod engine;
mod export;
mod filename;
mod graphql;
mod persist;
mod snapshot;
mod types;

pub use config::{ApiCredential, CredentialError, EngineConfig, DEFAULT_ENDPOINT};
pub use cover::{CoverLoader, ReqwestCoverLoader};
pub use engine::{EngineHandle, EngineStartError};
pub use export::{encode_image, BusyGuard, ExportError, SnapshotExporter, SNAPSHOT_SCALE};
pub use filename::export_filename;
pub use graphql::{GraphQlRequest, QueryClient, ReqwestQueryClient};
pub use persist::{DownloadDir, PersistError};
pub use snapshot::{load_font, CardSnapshot, CaptureError, CoverSource, SnapshotSource, CARD_WIDTH};
pub use url::Url;
pub use types::{CardContent, CardField, EngineEvent, FailureKind, QueryError, RasterFormat, RequestSeq};
