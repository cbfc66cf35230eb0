//! reqwest-backed implementation of [`RemoteSessionApi`]

use acp_core::{
    ClusterTarget, ListQuery, LogOptions, RemoteError, RemoteResult, RemoteSessionApi, Session,
    SessionPage, SessionPatch, SessionSpec, TranscriptFormat,
};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::response::{classify, decode_error, transport_error};

/// Per-request HTTP timeout
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the target project on every request
pub const PROJECT_HEADER: &str = "X-Ambient-Project";

const SESSIONS_PATH: &str = "/v1/sessions";

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<Session>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Client for the public sessions API.
///
/// Holds one pooled [`Client`]; server, project and token come from the
/// [`ClusterTarget`] passed to each call.
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: Client,
}

impl HttpSessionApi {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn request(&self, method: Method, target: &ClusterTarget, path: &str) -> RequestBuilder {
        self.request_accepting(method, target, path, "application/json")
    }

    fn request_accepting(
        &self,
        method: Method,
        target: &ClusterTarget,
        path: &str,
        accept: &'static str,
    ) -> RequestBuilder {
        let url = format!("{}{}", target.server.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .bearer_auth(target.token().expose_secret())
            .header(PROJECT_HEADER, &target.project)
            .header(ACCEPT, HeaderValue::from_static(accept))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> RemoteResult<Response> {
        let started = Instant::now();
        let response = request.send().await.map_err(|err| {
            warn!(%method, path, error = %err, "api request failed");
            transport_error(err)
        })?;

        let status = response.status();
        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api request"
        );

        if status.is_success() {
            return Ok(response);
        }

        let err = classify(response).await;
        warn!(%method, path, status = status.as_u16(), error = %err, "api request rejected");
        Err(err)
    }

    /// Decode a JSON body; `None` for 204 or an empty body.
    async fn json_body<T: DeserializeOwned>(response: Response) -> RemoteResult<Option<T>> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await.map_err(decode_error)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| RemoteError::InvalidResponse(err.to_string()))
    }
}

fn session_path(id: &str) -> String {
    format!("{SESSIONS_PATH}/{id}")
}

#[async_trait]
impl RemoteSessionApi for HttpSessionApi {
    async fn list(&self, target: &ClusterTarget, query: &ListQuery) -> RemoteResult<SessionPage> {
        let mut request = self.request(Method::GET, target, SESSIONS_PATH);
        if let Some(selector) = &query.label_selector {
            request = request.query(&[("labelSelector", selector)]);
        }

        let response = self.send(Method::GET, SESSIONS_PATH, request).await?;
        let body: Option<ListResponse> = Self::json_body(response).await?;

        Ok(body
            .map(|list| SessionPage {
                items: list.items,
                total: list.total,
            })
            .unwrap_or_default())
    }

    async fn get(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Session> {
        let path = session_path(id);
        let request = self.request(Method::GET, target, &path);
        let response = self.send(Method::GET, &path, request).await?;

        Self::json_body(response)
            .await?
            .ok_or_else(|| RemoteError::InvalidResponse(format!("empty body for session '{id}'")))
    }

    async fn create(&self, target: &ClusterTarget, spec: &SessionSpec) -> RemoteResult<String> {
        let request = self.request(Method::POST, target, SESSIONS_PATH).json(spec);
        let response = self.send(Method::POST, SESSIONS_PATH, request).await?;
        let body: Option<CreateResponse> = Self::json_body(response).await?;

        match body.and_then(|created| created.id) {
            Some(id) => Ok(id),
            None => {
                warn!(project = %target.project, "create response carried no session id");
                Ok("unknown".to_string())
            }
        }
    }

    async fn delete(&self, target: &ClusterTarget, id: &str) -> RemoteResult<()> {
        let path = session_path(id);
        let request = self.request(Method::DELETE, target, &path);
        self.send(Method::DELETE, &path, request).await?;
        Ok(())
    }

    async fn patch(
        &self,
        target: &ClusterTarget,
        id: &str,
        patch: &SessionPatch,
    ) -> RemoteResult<Session> {
        let path = session_path(id);
        let request = self.request(Method::PATCH, target, &path).json(patch);
        let response = self.send(Method::PATCH, &path, request).await?;

        // Some deployments answer PATCH with 204
        Ok(Self::json_body(response)
            .await?
            .unwrap_or_else(|| Session::new(id)))
    }

    async fn get_logs(
        &self,
        target: &ClusterTarget,
        id: &str,
        options: &LogOptions,
    ) -> RemoteResult<String> {
        let path = format!("{}/logs", session_path(id));
        let mut request = self
            .request_accepting(Method::GET, target, &path, "text/plain")
            .query(&[("tailLines", options.tail_lines)]);
        if let Some(container) = &options.container {
            request = request.query(&[("container", container)]);
        }

        let response = self.send(Method::GET, &path, request).await?;
        response.text().await.map_err(decode_error)
    }

    async fn get_transcript(
        &self,
        target: &ClusterTarget,
        id: &str,
        format: TranscriptFormat,
    ) -> RemoteResult<Value> {
        let path = format!("{}/transcript", session_path(id));
        let request = self
            .request(Method::GET, target, &path)
            .query(&[("format", format.as_str())]);
        let response = self.send(Method::GET, &path, request).await?;

        Ok(Self::json_body(response).await?.unwrap_or(Value::Null))
    }

    async fn get_metrics(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Value> {
        let path = format!("{}/metrics", session_path(id));
        let request = self.request(Method::GET, target, &path);
        let response = self.send(Method::GET, &path, request).await?;

        Ok(Self::json_body(response).await?.unwrap_or(Value::Null))
    }
}
