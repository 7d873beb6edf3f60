use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

pub type RequestSeq = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    QueryCompleted {
        seq: RequestSeq,
        result: Result<Value, QueryError>,
    },
    ExportCompleted {
        result: Result<PathBuf, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }
}

/// What the card shows, independent of which screen produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardContent {
    pub title: String,
    pub subtitle: String,
    pub fields: Vec<CardField>,
    pub body_heading: Option<String>,
    pub body: String,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub label: String,
    pub value: String,
}

impl CardField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct QueryError {
    pub kind: FailureKind,
    pub message: String,
}

impl QueryError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    Network,
    Timeout,
    HttpStatus(u16),
    GraphQl,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::GraphQl => write!(f, "graphql error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}
