//! In-memory recording fake of the remote session API.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use acp_core::labels::LABEL_PREFIX;
use acp_core::{
    ClusterTarget, ListQuery, LogOptions, RemoteError, RemoteResult, RemoteSessionApi, Session, SessionPage,
    SessionPatch, SessionSpec, SessionStatus, TranscriptFormat,
};
use async_trait::async_trait;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Option<String>),
    Get(String),
    Create(SessionSpec),
    Delete(String),
    Patch(String, SessionPatch),
    Logs(String, LogOptions),
    Transcript(String, TranscriptFormat),
    Metrics(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Call::Create(_) | Call::Delete(_) | Call::Patch(..))
    }
}

#[derive(Default)]
pub struct FakeApi {
    sessions: Mutex<Vec<Session>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<(&'static str, String), RemoteError>>,
    stalled: Mutex<HashSet<String>>,
    reported_total: Mutex<Option<usize>>,
    ignore_selector: Mutex<bool>,
    created: Mutex<usize>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_sessions(sessions: Vec<Session>) -> Arc<Self> {
        let api = Self::default();
        *api.sessions.lock().unwrap() = sessions;
        Arc::new(api)
    }

    /// Make `op` ("get", "delete", "patch", ...) fail for `id`.
    pub fn fail(&self, op: &'static str, id: &str, err: RemoteError) {
        self.failures.lock().unwrap().insert((op, id.to_string()), err);
    }

    /// Make every call for `id` hang until the caller gives up.
    pub fn stall(&self, id: &str) {
        self.stalled.lock().unwrap().insert(id.to_string());
    }

    /// Report a total larger than the returned page on `list`.
    pub fn report_total(&self, total: usize) {
        *self.reported_total.lock().unwrap() = Some(total);
    }

    /// Return every session from `list`, like a server without selector support.
    pub fn ignore_selector(&self) {
        *self.ignore_selector.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().iter().find(|s| s.id == id).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn gate(&self, op: &'static str, id: &str) -> RemoteResult<()> {
        let stalled = self.stalled.lock().unwrap().contains(id);
        if stalled {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        match self.failures.lock().unwrap().get(&(op, id.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn selector_matches(session: &Session, selector: &str) -> bool {
    selector.split(',').all(|pair| match pair.split_once('=') {
        Some((k, v)) => session.labels.get(k).map(String::as_str) == Some(v),
        None => false,
    })
}

#[async_trait]
impl RemoteSessionApi for FakeApi {
    async fn list(&self, _target: &ClusterTarget, query: &ListQuery) -> RemoteResult<SessionPage> {
        self.record(Call::List(query.label_selector.clone()));
        self.gate("list", "").await?;

        let ignore_selector = *self.ignore_selector.lock().unwrap();
        let items: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| match &query.label_selector {
                Some(selector) if !ignore_selector => selector_matches(s, selector),
                _ => true,
            })
            .cloned()
            .collect();

        Ok(SessionPage {
            items,
            total: *self.reported_total.lock().unwrap(),
        })
    }

    async fn get(&self, _target: &ClusterTarget, id: &str) -> RemoteResult<Session> {
        self.record(Call::Get(id.to_string()));
        self.gate("get", id).await?;
        self.session(id).ok_or(RemoteError::NotFound)
    }

    async fn create(&self, _target: &ClusterTarget, spec: &SessionSpec) -> RemoteResult<String> {
        self.record(Call::Create(spec.clone()));
        self.gate("create", "").await?;

        let mut created = self.created.lock().unwrap();
        *created += 1;
        let id = format!("session-{}", *created);

        let mut session = Session::new(&id).with_status(SessionStatus::Creating);
        session.display_name = spec.display_name.clone();
        session.initial_prompt = spec.initial_prompt.clone();
        session.interactive = spec.interactive;
        session.llm_config = spec.llm_config.clone();
        session.timeout_seconds = spec.timeout;
        session.repos = spec.repos.clone();
        session.workflow = spec.workflow.clone();
        self.sessions.lock().unwrap().push(session);

        Ok(id)
    }

    async fn delete(&self, _target: &ClusterTarget, id: &str) -> RemoteResult<()> {
        self.record(Call::Delete(id.to_string()));
        self.gate("delete", id).await?;

        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(RemoteError::NotFound);
        }
        Ok(())
    }

    async fn patch(&self, _target: &ClusterTarget, id: &str, patch: &SessionPatch) -> RemoteResult<Session> {
        self.record(Call::Patch(id.to_string(), patch.clone()));
        self.gate("patch", id).await?;

        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RemoteError::NotFound)?;

        if let Some(name) = &patch.display_name {
            session.display_name = Some(name.clone());
        }
        if let Some(timeout) = patch.timeout {
            session.timeout_seconds = Some(timeout);
        }
        match patch.stopped {
            Some(true) => session.status = SessionStatus::Stopped,
            Some(false) => session.status = SessionStatus::Running,
            None => {}
        }
        if let Some(labels) = &patch.labels {
            session.labels.extend(labels.clone());
        }
        if let Some(keys) = &patch.remove_labels {
            for key in keys {
                session.labels.remove(key);
            }
        }
        Ok(session.clone())
    }

    async fn get_logs(&self, _target: &ClusterTarget, id: &str, options: &LogOptions) -> RemoteResult<String> {
        self.record(Call::Logs(id.to_string(), options.clone()));
        self.gate("logs", id).await?;
        Ok(format!("log line for {id}\n"))
    }

    async fn get_transcript(
        &self,
        _target: &ClusterTarget,
        id: &str,
        format: TranscriptFormat,
    ) -> RemoteResult<Value> {
        self.record(Call::Transcript(id.to_string(), format));
        self.gate("transcript", id).await?;
        Ok(json!({"messages": [{"role": "user", "content": "hi"}]}))
    }

    async fn get_metrics(&self, _target: &ClusterTarget, id: &str) -> RemoteResult<Value> {
        self.record(Call::Metrics(id.to_string()));
        self.gate("metrics", id).await?;
        Ok(json!({"tokens": 1200, "toolCalls": 4}))
    }
}

pub fn target() -> ClusterTarget {
    ClusterTarget::new("https://acp.example.com", "my-project", "test-token")
}

/// A session whose label keys are stored the way the API returns them.
pub fn labeled(id: &str, pairs: &[(&str, &str)]) -> Session {
    pairs.iter().fold(
        Session::new(id).with_status(SessionStatus::Running),
        |session, (k, v)| session.with_label(format!("{LABEL_PREFIX}{k}"), *v),
    )
}

pub fn running(ids: &[&str]) -> Vec<Session> {
    ids.iter()
        .map(|id| Session::new(*id).with_status(SessionStatus::Running))
        .collect()
}
