use serde_json::Value;

use crate::{ImageFormat, QueryErrorKind, RequestSeq};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the identifier input.
    InputChanged(String),
    /// User pressed Search / Generate.
    Submitted,
    /// Engine returned the GraphQL `data` object for a request.
    QuerySucceeded { seq: RequestSeq, data: Value },
    /// Engine reported a transport, HTTP or GraphQL failure for a request.
    QueryFailed {
        seq: RequestSeq,
        kind: QueryErrorKind,
        message: String,
    },
    /// User clicked Copy.
    CopyClicked,
    /// User picked a download format.
    ExportClicked { format: ImageFormat },
    /// Engine finished (or gave up on) a snapshot export.
    ExportFinished { result: ExportResultKind },
    /// Poll tick while waiting on the engine.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResultKind {
    Saved { path: String },
    Failed { message: String },
}
