use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use acp_config::{ClusterConfig, ClustersConfig};
use acp_core::{
    ClusterTarget, ListQuery, LogOptions, RemoteError, RemoteResult, RemoteSessionApi, Session,
    SessionOperations, SessionPage, SessionPatch, SessionSpec, SessionStatus, TranscriptFormat,
};
use acp_mcp_server::McpServer;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

/// Where a call was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub op: &'static str,
    pub server: String,
    pub project: String,
    pub token: String,
}

#[derive(Default)]
pub struct FakeApi {
    sessions: Mutex<BTreeMap<String, Session>>,
    seen: Mutex<Vec<Seen>>,
}

impl FakeApi {
    pub fn with_sessions(ids: &[&str]) -> Arc<Self> {
        let api = Self::default();
        {
            let mut sessions = api.sessions.lock().unwrap();
            for id in ids {
                sessions.insert(
                    id.to_string(),
                    Session::new(*id).with_status(SessionStatus::Running),
                );
            }
        }
        Arc::new(api)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, target: &ClusterTarget) {
        self.seen.lock().unwrap().push(Seen {
            op,
            server: target.server.clone(),
            project: target.project.clone(),
            token: target.token().expose_secret().to_string(),
        });
    }

    fn lookup(&self, id: &str) -> RemoteResult<Session> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(RemoteError::NotFound)
    }
}

#[async_trait]
impl RemoteSessionApi for FakeApi {
    async fn list(&self, target: &ClusterTarget, _query: &ListQuery) -> RemoteResult<SessionPage> {
        self.record("list", target);
        let items = self.sessions.lock().unwrap().values().cloned().collect();
        Ok(SessionPage::new(items))
    }

    async fn get(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Session> {
        self.record("get", target);
        self.lookup(id)
    }

    async fn create(&self, target: &ClusterTarget, _spec: &SessionSpec) -> RemoteResult<String> {
        self.record("create", target);
        Ok("session-new".to_string())
    }

    async fn delete(&self, target: &ClusterTarget, id: &str) -> RemoteResult<()> {
        self.record("delete", target);
        self.sessions
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(RemoteError::NotFound)
    }

    async fn patch(
        &self,
        target: &ClusterTarget,
        id: &str,
        _patch: &SessionPatch,
    ) -> RemoteResult<Session> {
        self.record("patch", target);
        self.lookup(id)
    }

    async fn get_logs(
        &self,
        target: &ClusterTarget,
        id: &str,
        _options: &LogOptions,
    ) -> RemoteResult<String> {
        self.record("logs", target);
        self.lookup(id).map(|_| "log line".to_string())
    }

    async fn get_transcript(
        &self,
        target: &ClusterTarget,
        id: &str,
        _format: TranscriptFormat,
    ) -> RemoteResult<Value> {
        self.record("transcript", target);
        self.lookup(id).map(|_| json!([]))
    }

    async fn get_metrics(&self, target: &ClusterTarget, id: &str) -> RemoteResult<Value> {
        self.record("metrics", target);
        self.lookup(id).map(|_| json!({}))
    }
}

/// `prod` (default, token, default project) and `staging` (no token, no project).
pub fn clusters() -> ClustersConfig {
    let mut config = ClustersConfig {
        default_cluster: Some("prod".to_string()),
        ..Default::default()
    };
    config.clusters.insert(
        "prod".to_string(),
        ClusterConfig::new("https://prod.example.com")
            .with_default_project("workspace")
            .with_token("prod-token"),
    );
    config.clusters.insert(
        "staging".to_string(),
        ClusterConfig::new("https://staging.example.com"),
    );
    config
}

pub fn server(api: Arc<FakeApi>) -> McpServer<Arc<FakeApi>> {
    McpServer::new(SessionOperations::new(api), clusters())
}
