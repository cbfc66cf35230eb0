//! Action catalog
//!
//! The closed set of operations callers can invoke by name. Each action is
//! bound to a typed argument record; [`Action::dispatch`] decodes the flat JSON
//! arguments into that record and runs it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api::RemoteSessionApi;
use crate::filter::FilterOptions;
use crate::gate::BulkReport;
use crate::labels::Labels;
use crate::operations::{
    Applied, Created, LabelChange, LogRequest, NewSession, Planned, SessionList, SessionLogs, SessionMetrics,
    SessionOperations, SessionTranscript, SessionUpdate, TemplateSession,
};
use crate::types::{ClusterTarget, Session};
use crate::{AcpResult, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ListSessions,
    GetSession,
    CreateSession,
    CreateSessionFromTemplate,
    DeleteSession,
    RestartSession,
    StopSession,
    CloneSession,
    UpdateSession,
    GetSessionLogs,
    GetSessionTranscript,
    GetSessionMetrics,
    LabelSession,
    UnlabelSession,
    ListSessionsByLabel,
    BulkLabelSessions,
    BulkUnlabelSessions,
    BulkDeleteSessions,
    BulkStopSessions,
    BulkRestartSessions,
    BulkDeleteSessionsByLabel,
    BulkStopSessionsByLabel,
    BulkRestartSessionsByLabel,
}

impl Action {
    pub const ALL: [Action; 23] = [
        Self::ListSessions,
        Self::GetSession,
        Self::CreateSession,
        Self::CreateSessionFromTemplate,
        Self::DeleteSession,
        Self::RestartSession,
        Self::StopSession,
        Self::CloneSession,
        Self::UpdateSession,
        Self::GetSessionLogs,
        Self::GetSessionTranscript,
        Self::GetSessionMetrics,
        Self::LabelSession,
        Self::UnlabelSession,
        Self::ListSessionsByLabel,
        Self::BulkLabelSessions,
        Self::BulkUnlabelSessions,
        Self::BulkDeleteSessions,
        Self::BulkStopSessions,
        Self::BulkRestartSessions,
        Self::BulkDeleteSessionsByLabel,
        Self::BulkStopSessionsByLabel,
        Self::BulkRestartSessionsByLabel,
    ];

    /// Tool name exposed to callers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListSessions => "acp_list_sessions",
            Self::GetSession => "acp_get_session",
            Self::CreateSession => "acp_create_session",
            Self::CreateSessionFromTemplate => "acp_create_session_from_template",
            Self::DeleteSession => "acp_delete_session",
            Self::RestartSession => "acp_restart_session",
            Self::StopSession => "acp_stop_session",
            Self::CloneSession => "acp_clone_session",
            Self::UpdateSession => "acp_update_session",
            Self::GetSessionLogs => "acp_get_session_logs",
            Self::GetSessionTranscript => "acp_get_session_transcript",
            Self::GetSessionMetrics => "acp_get_session_metrics",
            Self::LabelSession => "acp_label_resource",
            Self::UnlabelSession => "acp_unlabel_resource",
            Self::ListSessionsByLabel => "acp_list_sessions_by_label",
            Self::BulkLabelSessions => "acp_bulk_label_resources",
            Self::BulkUnlabelSessions => "acp_bulk_unlabel_resources",
            Self::BulkDeleteSessions => "acp_bulk_delete_sessions",
            Self::BulkStopSessions => "acp_bulk_stop_sessions",
            Self::BulkRestartSessions => "acp_bulk_restart_sessions",
            Self::BulkDeleteSessionsByLabel => "acp_bulk_delete_sessions_by_label",
            Self::BulkStopSessionsByLabel => "acp_bulk_stop_sessions_by_label",
            Self::BulkRestartSessionsByLabel => "acp_bulk_restart_sessions_by_label",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// Bulk actions that mutate only with `confirm=true`.
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            Self::BulkLabelSessions
                | Self::BulkUnlabelSessions
                | Self::BulkDeleteSessions
                | Self::BulkStopSessions
                | Self::BulkRestartSessions
                | Self::BulkDeleteSessionsByLabel
                | Self::BulkStopSessionsByLabel
                | Self::BulkRestartSessionsByLabel
        )
    }

    /// Decode `args` into the action's argument record and run it.
    pub async fn dispatch<A: RemoteSessionApi>(
        self,
        args: Value,
        ops: &SessionOperations<A>,
        target: &ClusterTarget,
    ) -> AcpResult<Value> {
        match self {
            Self::ListSessions => run::<ListSessionsArgs, A>(args, ops, target).await,
            Self::GetSession => run::<GetSessionArgs, A>(args, ops, target).await,
            Self::CreateSession => run::<CreateSessionArgs, A>(args, ops, target).await,
            Self::CreateSessionFromTemplate => run::<CreateFromTemplateArgs, A>(args, ops, target).await,
            Self::DeleteSession => run::<DeleteSessionArgs, A>(args, ops, target).await,
            Self::RestartSession => run::<RestartSessionArgs, A>(args, ops, target).await,
            Self::StopSession => run::<StopSessionArgs, A>(args, ops, target).await,
            Self::CloneSession => run::<CloneSessionArgs, A>(args, ops, target).await,
            Self::UpdateSession => run::<UpdateSessionArgs, A>(args, ops, target).await,
            Self::GetSessionLogs => run::<SessionLogsArgs, A>(args, ops, target).await,
            Self::GetSessionTranscript => run::<SessionTranscriptArgs, A>(args, ops, target).await,
            Self::GetSessionMetrics => run::<SessionMetricsArgs, A>(args, ops, target).await,
            Self::LabelSession => run::<LabelSessionArgs, A>(args, ops, target).await,
            Self::UnlabelSession => run::<UnlabelSessionArgs, A>(args, ops, target).await,
            Self::ListSessionsByLabel => run::<ListByLabelArgs, A>(args, ops, target).await,
            Self::BulkLabelSessions => run::<BulkLabelArgs, A>(args, ops, target).await,
            Self::BulkUnlabelSessions => run::<BulkUnlabelArgs, A>(args, ops, target).await,
            Self::BulkDeleteSessions => run::<BulkDeleteArgs, A>(args, ops, target).await,
            Self::BulkStopSessions => run::<BulkStopArgs, A>(args, ops, target).await,
            Self::BulkRestartSessions => run::<BulkRestartArgs, A>(args, ops, target).await,
            Self::BulkDeleteSessionsByLabel => run::<BulkDeleteByLabelArgs, A>(args, ops, target).await,
            Self::BulkStopSessionsByLabel => run::<BulkStopByLabelArgs, A>(args, ops, target).await,
            Self::BulkRestartSessionsByLabel => run::<BulkRestartByLabelArgs, A>(args, ops, target).await,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::Unsupported {
            field: "tool".to_string(),
            value: s.to_string(),
            allowed: "see tools/list".to_string(),
        })
    }
}

/// An argument record that knows which operation it drives.
#[async_trait]
pub trait Execute: DeserializeOwned + Send {
    type Output: Serialize + Send;

    async fn execute<A: RemoteSessionApi>(
        self,
        ops: &SessionOperations<A>,
        target: &ClusterTarget,
    ) -> AcpResult<Self::Output>;
}

async fn run<T: Execute, A: RemoteSessionApi>(
    args: Value,
    ops: &SessionOperations<A>,
    target: &ClusterTarget,
) -> AcpResult<Value> {
    let args: T = serde_json::from_value(args).map_err(|e| ValidationError::Arguments(e.to_string()))?;
    let output = args.execute(ops, target).await?;
    Ok(serde_json::to_value(output)?)
}

const RESOURCE_TYPE: &str = "agenticsession";

fn check_resource_type(resource_type: Option<&str>) -> Result<(), ValidationError> {
    match resource_type {
        None | Some(RESOURCE_TYPE) => Ok(()),
        Some(other) => Err(ValidationError::unsupported("resource_type", other, &[RESOURCE_TYPE])),
    }
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListSessionsArgs {
    #[serde(flatten)]
    pub filter: FilterOptions,
}

#[async_trait]
impl Execute for ListSessionsArgs {
    type Output = SessionList;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<SessionList> {
        ops.list_sessions(target, &self.filter).await
    }
}

#[derive(Debug, Deserialize)]
pub struct GetSessionArgs {
    pub session: String,
}

#[async_trait]
impl Execute for GetSessionArgs {
    type Output = Session;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Session> {
        ops.get_session(target, &self.session).await
    }
}

#[derive(Debug, Deserialize)]
pub struct ListByLabelArgs {
    pub labels: Labels,
}

#[async_trait]
impl Execute for ListByLabelArgs {
    type Output = SessionList;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<SessionList> {
        ops.list_sessions_by_label(target, &self.labels).await
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionLogsArgs {
    pub session: String,
    #[serde(flatten)]
    pub request: LogRequest,
}

#[async_trait]
impl Execute for SessionLogsArgs {
    type Output = SessionLogs;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<SessionLogs> {
        ops.get_session_logs(target, &self.session, &self.request).await
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionTranscriptArgs {
    pub session: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[async_trait]
impl Execute for SessionTranscriptArgs {
    type Output = SessionTranscript;

    async fn execute<A: RemoteSessionApi>(
        self,
        ops: &SessionOperations<A>,
        target: &ClusterTarget,
    ) -> AcpResult<SessionTranscript> {
        ops.get_session_transcript(target, &self.session, self.format.as_deref())
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionMetricsArgs {
    pub session: String,
}

#[async_trait]
impl Execute for SessionMetricsArgs {
    type Output = SessionMetrics;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<SessionMetrics> {
        ops.get_session_metrics(target, &self.session).await
    }
}

// ============================================================================
// Creation
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionArgs {
    #[serde(flatten)]
    pub session: NewSession,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for CreateSessionArgs {
    type Output = Planned<Created>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Created>> {
        ops.create_session(target, self.session, self.dry_run).await
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFromTemplateArgs {
    #[serde(flatten)]
    pub session: TemplateSession,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for CreateFromTemplateArgs {
    type Output = Planned<Created>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Created>> {
        ops.create_session_from_template(target, self.session, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct CloneSessionArgs {
    pub source_session: String,
    pub new_display_name: String,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for CloneSessionArgs {
    type Output = Planned<Created>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Created>> {
        ops.clone_session(target, &self.source_session, &self.new_display_name, self.dry_run)
            .await
    }
}

// ============================================================================
// Single-session mutations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DeleteSessionArgs {
    pub session: String,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for DeleteSessionArgs {
    type Output = Planned<Applied>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Applied>> {
        ops.delete_session(target, &self.session, self.dry_run).await
    }
}

#[derive(Debug, Deserialize)]
pub struct RestartSessionArgs {
    pub session: String,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for RestartSessionArgs {
    type Output = Planned<Applied>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Applied>> {
        ops.restart_session(target, &self.session, self.dry_run).await
    }
}

#[derive(Debug, Deserialize)]
pub struct StopSessionArgs {
    pub session: String,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for StopSessionArgs {
    type Output = Planned<Applied>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Applied>> {
        ops.stop_session(target, &self.session, self.dry_run).await
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionArgs {
    pub session: String,
    #[serde(flatten)]
    pub update: SessionUpdate,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for UpdateSessionArgs {
    type Output = Planned<Applied>;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<Planned<Applied>> {
        ops.update_session(target, &self.session, self.update, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct LabelSessionArgs {
    #[serde(alias = "session")]
    pub name: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    pub labels: Labels,
}

#[async_trait]
impl Execute for LabelSessionArgs {
    type Output = LabelChange;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<LabelChange> {
        check_resource_type(self.resource_type.as_deref())?;
        ops.label_session(target, &self.name, &self.labels).await
    }
}

#[derive(Debug, Deserialize)]
pub struct UnlabelSessionArgs {
    #[serde(alias = "session")]
    pub name: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    pub label_keys: Vec<String>,
}

#[async_trait]
impl Execute for UnlabelSessionArgs {
    type Output = LabelChange;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<LabelChange> {
        check_resource_type(self.resource_type.as_deref())?;
        ops.unlabel_session(target, &self.name, &self.label_keys).await
    }
}

// ============================================================================
// Bulk
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BulkDeleteArgs {
    pub sessions: Vec<String>,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkDeleteArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_delete_sessions(target, self.sessions, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkStopArgs {
    pub sessions: Vec<String>,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkStopArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_stop_sessions(target, self.sessions, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkRestartArgs {
    pub sessions: Vec<String>,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkRestartArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_restart_sessions(target, self.sessions, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkLabelArgs {
    pub sessions: Vec<String>,
    pub labels: Labels,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkLabelArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_label_sessions(target, self.sessions, self.labels, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkUnlabelArgs {
    pub sessions: Vec<String>,
    pub label_keys: Vec<String>,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkUnlabelArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_unlabel_sessions(target, self.sessions, self.label_keys, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteByLabelArgs {
    pub labels: Labels,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkDeleteByLabelArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_delete_sessions_by_label(target, self.labels, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkStopByLabelArgs {
    pub labels: Labels,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkStopByLabelArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_stop_sessions_by_label(target, self.labels, self.confirm, self.dry_run)
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkRestartByLabelArgs {
    pub labels: Labels,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[async_trait]
impl Execute for BulkRestartByLabelArgs {
    type Output = BulkReport;

    async fn execute<A: RemoteSessionApi>(self, ops: &SessionOperations<A>, target: &ClusterTarget) -> AcpResult<BulkReport> {
        ops.bulk_restart_sessions_by_label(target, self.labels, self.confirm, self.dry_run)
            .await
    }
}
