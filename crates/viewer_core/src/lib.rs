//! Viewer core: pure view-controller state machine and response normalization.
mod clipboard;
mod effect;
mod msg;
mod normalize;
mod query;
mod raw;
mod state;
mod update;
mod view_model;

pub use clipboard::copy_text;
pub use effect::{Effect, ExportJob, ImageFormat};
pub use msg::{ExportResultKind, Msg};
pub use normalize::{join_sdg_targets, normalize, normalize_opportunity, normalize_post, DisplayModel};
pub use query::{QueryErrorKind, QueryRequest, QueryStatus, QueryTracker, RequestSeq};
pub use raw::{
    CoverPhoto, NamedRef, OneOrMany, PayloadError, RawBranch, RawOpportunity, RawPayload,
    RawPost, RawProject, RawSdgInfo, SdgTarget,
};
pub use state::{AppState, ViewKind};
pub use update::update;
pub use view_model::{AppViewModel, ExportNotice, StatusView};
