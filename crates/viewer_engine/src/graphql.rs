use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use viewer_logging::{viewer_debug, viewer_warn};

use crate::{EngineConfig, FailureKind, QueryError};

const POST_QUERY: &str = r#"query GetPost($topic: String!) {
  post(topic: $topic) {
    title
    content
    image
  }
}"#;

const OPPORTUNITY_QUERY: &str = r#"query GetOpportunityByIdQuery($id: ID!) {
  opportunity(id: $id) {
    id
    project_description
    host_lc {
      name
    }
    home_mc {
      name
    }
    project {
      project_name
      sdg_info {
        sdg_target {
          target_id
        }
      }
    }
    branch {
      company {
        name
      }
    }
    location
    cover_photo(cdn_links: true)
  }
}"#;

/// Body of a GraphQL POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    #[serde(rename = "operationName")]
    pub operation_name: &'static str,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn post(topic: &str) -> Self {
        Self {
            query: POST_QUERY,
            operation_name: "GetPost",
            variables: json!({ "topic": topic }),
        }
    }

    pub fn opportunity(id: &str) -> Self {
        Self {
            query: OPPORTUNITY_QUERY,
            operation_name: "GetOpportunityByIdQuery",
            variables: json!({ "id": id }),
        }
    }
}

/// Runs one GraphQL operation and hands back its `data` object.
#[async_trait::async_trait]
pub trait QueryClient: Send + Sync {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, QueryError>;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// HTTPS client for the GIS endpoint. Build once and share; the inner
/// `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct ReqwestQueryClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl ReqwestQueryClient {
    pub fn new(config: &EngineConfig) -> Result<Self, QueryError> {
        let mut auth = HeaderValue::from_str(config.credential.expose())
            .map_err(|err| QueryError::new(FailureKind::InvalidRequest, err.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| QueryError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait::async_trait]
impl QueryClient for ReqwestQueryClient {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, QueryError> {
        let body = serde_json::to_vec(request)
            .map_err(|err| QueryError::new(FailureKind::InvalidRequest, err.to_string()))?;

        viewer_debug!(
            "POST {} operation={}",
            self.endpoint,
            request.operation_name
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            viewer_warn!("{} answered {}", self.endpoint, status);
            return Err(QueryError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        parse_response(&bytes)
    }
}

fn parse_response(bytes: &[u8]) -> Result<Value, QueryError> {
    let parsed: GraphQlResponse = serde_json::from_slice(bytes)
        .map_err(|err| QueryError::new(FailureKind::MalformedResponse, err.to_string()))?;

    if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
        let message = errors
            .into_iter()
            .map(|entry| entry.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(QueryError::new(FailureKind::GraphQl, message));
    }

    match parsed.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(QueryError::new(
            FailureKind::MalformedResponse,
            "response carried no data",
        )),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> QueryError {
    if err.is_timeout() {
        return QueryError::new(FailureKind::Timeout, err.to_string());
    }
    QueryError::new(FailureKind::Network, err.to_string())
}
