//! Remote session API collaborator

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{
    ClusterTarget, ListQuery, LogOptions, Session, SessionPage, SessionPatch, SessionSpec,
    TranscriptFormat,
};
use crate::RemoteError;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Transport to the platform's public API.
///
/// Every call names its [`ClusterTarget`] explicitly. Implementations own any
/// connection pooling or retry behavior; the core only sequences calls.
#[async_trait]
pub trait RemoteSessionApi: Send + Sync {
    /// List sessions in the target project
    async fn list(&self, target: &ClusterTarget, query: &ListQuery) -> RemoteResult<SessionPage>;

    /// Fetch one session
    async fn get(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Session>;

    /// Create a session and return its id
    async fn create(&self, target: &ClusterTarget, spec: &SessionSpec) -> RemoteResult<String>;

    async fn delete(&self, target: &ClusterTarget, id: &str) -> RemoteResult<()>;

    /// Apply a partial update, returning the updated session
    async fn patch(
        &self,
        target: &ClusterTarget,
        id: &str,
        patch: &SessionPatch,
    ) -> RemoteResult<Session>;

    async fn get_logs(
        &self,
        target: &ClusterTarget,
        id: &str,
        options: &LogOptions,
    ) -> RemoteResult<String>;

    async fn get_transcript(
        &self,
        target: &ClusterTarget,
        id: &str,
        format: TranscriptFormat,
    ) -> RemoteResult<Value>;

    async fn get_metrics(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Value>;
}

#[async_trait]
impl<T: RemoteSessionApi + ?Sized> RemoteSessionApi for std::sync::Arc<T> {
    async fn list(&self, target: &ClusterTarget, query: &ListQuery) -> RemoteResult<SessionPage> {
        (**self).list(target, query).await
    }

    async fn get(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Session> {
        (**self).get(target, id).await
    }

    async fn create(&self, target: &ClusterTarget, spec: &SessionSpec) -> RemoteResult<String> {
        (**self).create(target, spec).await
    }

    async fn delete(&self, target: &ClusterTarget, id: &str) -> RemoteResult<()> {
        (**self).delete(target, id).await
    }

    async fn patch(
        &self,
        target: &ClusterTarget,
        id: &str,
        patch: &SessionPatch,
    ) -> RemoteResult<Session> {
        (**self).patch(target, id, patch).await
    }

    async fn get_logs(
        &self,
        target: &ClusterTarget,
        id: &str,
        options: &LogOptions,
    ) -> RemoteResult<String> {
        (**self).get_logs(target, id, options).await
    }

    async fn get_transcript(
        &self,
        target: &ClusterTarget,
        id: &str,
        format: TranscriptFormat,
    ) -> RemoteResult<Value> {
        (**self).get_transcript(target, id, format).await
    }

    async fn get_metrics(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Value> {
        (**self).get_metrics(target, id).await
    }
}
