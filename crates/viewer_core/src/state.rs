use std::fmt;

use crate::view_model::{AppViewModel, ExportNotice, StatusView};
use crate::{DisplayModel, QueryStatus, QueryTracker};

/// Which screen a controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    #[default]
    Opportunity,
    Post,
}

impl ViewKind {
    /// Prefix used for exported image file names.
    pub fn file_prefix(self) -> &'static str {
        match self {
            ViewKind::Opportunity => "opportunity",
            ViewKind::Post => "post",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    kind: ViewKind,
    input: String,
    query: QueryTracker,
    /// Identifier of the request currently in flight.
    pending_identifier: Option<String>,
    card: Option<Card>,
    exporting: bool,
    export_notice: Option<ExportNotice>,
    dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Card {
    pub(crate) identifier: String,
    pub(crate) model: DisplayModel,
}

impl AppState {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn view(&self) -> AppViewModel {
        let status = match self.query.status() {
            QueryStatus::Idle => StatusView::Idle,
            QueryStatus::Loading { .. } => StatusView::Loading,
            QueryStatus::Ready => StatusView::Ready,
            QueryStatus::Failed { message, .. } => StatusView::Error {
                message: message.clone(),
            },
        };
        AppViewModel {
            kind: self.kind,
            input: self.input.clone(),
            can_submit: !self.input.trim().is_empty(),
            status,
            card: self.card.as_ref().map(|card| card.model.clone()),
            exporting: self.exporting,
            can_export: self.card.is_some() && !self.exporting,
            export_notice: self.export_notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input = input;
            self.mark_dirty();
        }
    }

    pub(crate) fn query_mut(&mut self) -> &mut QueryTracker {
        &mut self.query
    }

    pub(crate) fn set_pending_identifier(&mut self, identifier: String) {
        self.pending_identifier = Some(identifier);
    }

    pub(crate) fn take_pending_identifier(&mut self) -> Option<String> {
        self.pending_identifier.take()
    }

    pub(crate) fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    pub(crate) fn set_card(&mut self, card: Option<Card>) {
        self.card = card;
        self.mark_dirty();
    }

    pub(crate) fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
        self.mark_dirty();
    }

    pub(crate) fn set_export_notice(&mut self, notice: Option<ExportNotice>) {
        self.export_notice = notice;
        self.mark_dirty();
    }
}
