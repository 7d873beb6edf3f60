use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use viewer_logging::viewer_debug;

use crate::snapshot::CoverSource;
use crate::EngineConfig;

/// Downloads cover photos for the card snapshot.
#[async_trait::async_trait]
pub trait CoverLoader: Send + Sync {
    async fn load(&self, url: &str) -> CoverSource;
}

#[derive(Debug, Clone)]
pub struct ReqwestCoverLoader {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestCoverLoader {
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        Self::with_limits(config.connect_timeout, config.request_timeout, config.max_cover_bytes)
    }

    pub fn with_limits(
        connect_timeout: Duration,
        request_timeout: Duration,
        max_bytes: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client, max_bytes })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        let parsed = reqwest::Url::parse(url).map_err(|err| format!("invalid url: {err}"))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("http status {}", status.as_u16()));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !content_type.trim_start().starts_with("image/") {
                return Err(format!("unsupported content type {content_type}"));
            }
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(format!(
                    "cover too large (max {}, actual {content_len})",
                    self.max_bytes
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| err.to_string())?;
            if bytes.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(format!("cover too large (max {})", self.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl CoverLoader for ReqwestCoverLoader {
    async fn load(&self, url: &str) -> CoverSource {
        match self.fetch(url).await {
            Ok(bytes) => {
                viewer_debug!("Loaded cover {} ({} bytes)", url, bytes.len());
                CoverSource::Bytes(bytes)
            }
            Err(reason) => CoverSource::Unavailable {
                url: url.to_string(),
                reason,
            },
        }
    }
}
