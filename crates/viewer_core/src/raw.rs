//! Payload shapes returned by the GIS GraphQL API.
//!
//! These mirror the external schema and are deliberately lenient: every
//! nested object is optional so a sparse record still decodes.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::ViewKind;

/// A field the API returns either as a single record or as a list of records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    // `Many` must be tried first: derived structs also accept sequences.
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Coerce to a sequence view, preserving input order.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SdgTarget {
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSdgInfo {
    pub sdg_target: Option<OneOrMany<SdgTarget>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawProject {
    pub project_name: Option<String>,
    pub sdg_info: Option<RawSdgInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawBranch {
    pub company: Option<NamedRef>,
}

/// `cover_photo(cdn_links: true)` is a JSON scalar in the schema; depending on
/// the deployment it arrives as `{ "url": ... }` or as a bare URL string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CoverPhoto {
    Url(String),
    Object { url: Option<String> },
}

impl CoverPhoto {
    pub fn url(&self) -> Option<&str> {
        match self {
            CoverPhoto::Url(url) => Some(url.as_str()),
            CoverPhoto::Object { url } => url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawOpportunity {
    pub id: Option<String>,
    pub project_description: Option<String>,
    pub host_lc: Option<NamedRef>,
    pub home_mc: Option<NamedRef>,
    pub project: Option<RawProject>,
    pub branch: Option<RawBranch>,
    pub location: Option<String>,
    pub cover_photo: Option<CoverPhoto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    Opportunity(RawOpportunity),
    Post(RawPost),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("no {kind} found")]
    NotFound { kind: ViewKind },
    #[error("response did not match the {kind} schema: {message}")]
    Malformed { kind: ViewKind, message: String },
}

#[derive(Deserialize)]
struct OpportunityData {
    opportunity: Option<RawOpportunity>,
}

#[derive(Deserialize)]
struct PostData {
    post: Option<RawPost>,
}

impl RawPayload {
    /// Decode the GraphQL `data` object for the given view.
    pub fn decode(kind: ViewKind, data: Value) -> Result<Self, PayloadError> {
        let malformed = |err: serde_json::Error| PayloadError::Malformed {
            kind,
            message: err.to_string(),
        };
        match kind {
            ViewKind::Opportunity => serde_json::from_value::<OpportunityData>(data)
                .map_err(malformed)?
                .opportunity
                .map(RawPayload::Opportunity),
            ViewKind::Post => serde_json::from_value::<PostData>(data)
                .map_err(malformed)?
                .post
                .map(RawPayload::Post),
        }
        .ok_or(PayloadError::NotFound { kind })
    }
}
