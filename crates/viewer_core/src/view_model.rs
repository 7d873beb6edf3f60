use crate::{DisplayModel, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusView {
    #[default]
    Idle,
    Loading,
    Ready,
    Error {
        message: String,
    },
}

/// Outcome of the last export, shown next to the download button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportNotice {
    Saved { path: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub kind: ViewKind,
    pub input: String,
    pub can_submit: bool,
    pub status: StatusView,
    pub card: Option<DisplayModel>,
    pub exporting: bool,
    pub can_export: bool,
    pub export_notice: Option<ExportNotice>,
    pub dirty: bool,
}
