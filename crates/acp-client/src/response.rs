//! Mapping HTTP responses onto [`RemoteError`]

use acp_core::RemoteError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

/// Error envelope returned by the public API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "message")]
    error: Option<String>,
}

/// Pull the `error` field out of a failed response, falling back to the raw body.
pub(crate) async fn parse_error_body(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) => match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(ErrorResponse { error: Some(message) }) => message,
            Ok(_) => format!("HTTP {}", status.as_u16()),
            Err(_) if text.trim().is_empty() => format!("HTTP {}", status.as_u16()),
            Err(_) => format!("HTTP {}: {}", status.as_u16(), text.trim()),
        },
        Err(_) => "Failed to read error response body".to_string(),
    }
}

/// Convert a non-success status into the matching [`RemoteError`].
pub(crate) async fn classify(response: Response) -> RemoteError {
    match response.status() {
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
        StatusCode::FORBIDDEN => RemoteError::Forbidden,
        status => RemoteError::Api {
            status: status.as_u16(),
            message: parse_error_body(response).await,
        },
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport(err.to_string())
    }
}

pub(crate) fn decode_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::InvalidResponse(err.to_string())
    }
}
