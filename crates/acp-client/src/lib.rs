//! HTTP transport for the Ambient Code Platform public API

mod http;
mod response;

pub use http::{HttpSessionApi, DEFAULT_HTTP_TIMEOUT, PROJECT_HEADER};
