use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://gis-api.aiesec.org/graphql";

/// Access token for the GIS API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential is empty")]
    Empty,
    #[error("credential contains characters not allowed in an HTTP header")]
    InvalidCharacters,
}

impl ApiCredential {
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }
        if !token.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(CredentialError::InvalidCharacters);
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub endpoint: Url,
    pub credential: ApiCredential,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound for a downloaded cover photo.
    pub max_cover_bytes: u64,
    pub download_dir: PathBuf,
    pub font_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(credential: ApiCredential) -> Self {
        Self {
            endpoint: default_endpoint(),
            credential,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_cover_bytes: 10 * 1024 * 1024,
            download_dir: PathBuf::from("downloads"),
            font_path: None,
        }
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint")
}
