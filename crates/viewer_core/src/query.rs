use std::fmt;

use crate::ViewKind;

/// Monotonic tag attached to every dispatched query. Zero means "never issued".
pub type RequestSeq = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    Opportunity { id: String },
    Post { topic: String },
}

impl QueryRequest {
    pub fn new(kind: ViewKind, identifier: impl Into<String>) -> Self {
        match kind {
            ViewKind::Opportunity => QueryRequest::Opportunity {
                id: identifier.into(),
            },
            ViewKind::Post => QueryRequest::Post {
                topic: identifier.into(),
            },
        }
    }

    pub fn kind(&self) -> ViewKind {
        match self {
            QueryRequest::Opportunity { .. } => ViewKind::Opportunity,
            QueryRequest::Post { .. } => ViewKind::Post,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            QueryRequest::Opportunity { id } => id,
            QueryRequest::Post { topic } => topic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    InvalidRequest,
    Network,
    Timeout,
    HttpStatus(u16),
    GraphQl,
    MalformedResponse,
    NotFound,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::InvalidRequest => write!(f, "invalid request"),
            QueryErrorKind::Network => write!(f, "network error"),
            QueryErrorKind::Timeout => write!(f, "timeout"),
            QueryErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            QueryErrorKind::GraphQl => write!(f, "graphql error"),
            QueryErrorKind::MalformedResponse => write!(f, "malformed response"),
            QueryErrorKind::NotFound => write!(f, "not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading {
        seq: RequestSeq,
    },
    Ready,
    Failed {
        kind: QueryErrorKind,
        message: String,
    },
}

/// Per-view query bookkeeping. Only the most recently issued request may
/// resolve; anything older is stale and gets dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryTracker {
    latest: RequestSeq,
    status: QueryStatus,
}

impl QueryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &QueryStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Loading { .. })
    }

    /// Issue a new sequence number, superseding any request still in flight.
    pub fn begin(&mut self) -> RequestSeq {
        self.latest += 1;
        self.status = QueryStatus::Loading { seq: self.latest };
        self.latest
    }

    /// True if a completion tagged `seq` belongs to the current request.
    pub fn accepts(&self, seq: RequestSeq) -> bool {
        seq != 0 && seq == self.latest && self.is_loading()
    }

    /// Mark the current request as resolved. Returns false for stale tags.
    pub fn succeed(&mut self, seq: RequestSeq) -> bool {
        if !self.accepts(seq) {
            return false;
        }
        self.status = QueryStatus::Ready;
        true
    }

    pub fn fail(&mut self, seq: RequestSeq, kind: QueryErrorKind, message: String) -> bool {
        if !self.accepts(seq) {
            return false;
        }
        self.status = QueryStatus::Failed { kind, message };
        true
    }
}
