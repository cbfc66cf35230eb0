//! Session operations
//!
//! Every method validates its inputs before the first remote call, bounds each
//! remote call with [`SessionOperations::call_timeout`], and returns sessions
//! with user-facing labels.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::api::{RemoteResult, RemoteSessionApi};
use crate::filter::FilterOptions;
use crate::gate::{run_bulk, BulkAction, BulkChange, BulkReport, BulkRequest, BulkTargets, Mutation};
use crate::labels::{build_labels, build_selector, matches_selector, prefix_keys, user_facing, Labels};
use crate::templates::SessionTemplate;
use crate::types::{
    ClusterTarget, ListQuery, LlmConfig, LogOptions, Session, SessionPage, SessionPatch, SessionSpec,
    TranscriptFormat, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECONDS, MIN_TIMEOUT_SECONDS,
};
use crate::validate::{validate_identifier, validate_non_empty};
use crate::{AcpError, AcpResult, RemoteError, ValidationError};

/// Default bound on a single remote call.
pub const REMOTE_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_TAIL_LINES: u32 = 1000;
pub const MAX_TAIL_LINES: u32 = 10_000;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewSession {
    pub initial_prompt: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TemplateSession {
    pub template: String,
    pub display_name: String,
    #[serde(default)]
    pub repos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogRequest {
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub tail_lines: Option<i64>,
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionList {
    pub sessions: Vec<Session>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters_applied: Option<FilterOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_filter: Option<Labels>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Created {
    pub created: bool,
    pub session: String,
    pub project: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<SessionTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_session: Option<String>,
}

/// Result of a single-session mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applied {
    pub session: String,
    pub action: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<Session>,
}

/// What a mutation would do, gathered without side effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub dry_run: bool,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Session>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<SessionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<SessionPatch>,
}

impl Preview {
    fn ok(message: String) -> Self {
        Self {
            dry_run: true,
            success: true,
            message,
            current: None,
            manifest: None,
            patch: None,
        }
    }

    fn missing(id: &str) -> Self {
        Self {
            success: false,
            ..Self::ok(format!("Session '{id}' not found"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Planned<T> {
    Applied(T),
    Preview(Preview),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelChange {
    pub session: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_added: Option<Labels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_removed: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionLogs {
    pub session: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub tail_lines: u32,
    pub logs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTranscript {
    pub session: String,
    pub format: TranscriptFormat,
    pub transcript: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub session: String,
    pub metrics: serde_json::Value,
}

fn validate_timeout(timeout: u64) -> Result<u64, ValidationError> {
    if timeout < MIN_TIMEOUT_SECONDS {
        return Err(ValidationError::BelowMinimum {
            field: "timeout".to_string(),
            min: MIN_TIMEOUT_SECONDS as i64,
            actual: timeout as i64,
        });
    }
    Ok(timeout)
}

fn validate_tail_lines(tail_lines: Option<i64>) -> Result<u32, ValidationError> {
    let lines = tail_lines.unwrap_or(DEFAULT_TAIL_LINES as i64);
    if lines < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "tail_lines".to_string(),
            min: 1,
            actual: lines,
        });
    }
    if lines > MAX_TAIL_LINES as i64 {
        return Err(ValidationError::AboveMaximum {
            field: "tail_lines".to_string(),
            max: MAX_TAIL_LINES as i64,
            actual: lines,
        });
    }
    Ok(lines as u32)
}

// ============================================================================
// Operations
// ============================================================================

/// Executes session actions against a [`RemoteSessionApi`].
///
/// Holds no per-call state; the same instance may serve concurrent calls
/// against different [`ClusterTarget`]s.
#[derive(Debug, Clone)]
pub struct SessionOperations<A> {
    api: A,
    call_timeout: Duration,
}

impl<A: RemoteSessionApi> SessionOperations<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            call_timeout: REMOTE_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Run one remote call under the per-call timeout and attach context to failures.
    async fn call<T, F>(&self, operation: &'static str, subject: &str, fut: F) -> AcpResult<T>
    where
        F: Future<Output = RemoteResult<T>>,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.call_timeout, fut).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(value)) => {
                debug!(operation, subject, elapsed_ms, "remote call succeeded");
                Ok(value)
            }
            Ok(Err(RemoteError::Timeout)) | Err(_) => {
                warn!(operation, subject, elapsed_ms, "remote call timed out");
                Err(AcpError::Timeout {
                    operation,
                    target: subject.to_string(),
                    limit: self.call_timeout,
                })
            }
            Ok(Err(source)) => {
                warn!(operation, subject, elapsed_ms, error = %source, "remote call failed");
                Err(AcpError::Remote {
                    operation,
                    target: subject.to_string(),
                    source,
                })
            }
        }
    }

    pub(crate) async fn list_page(&self, target: &ClusterTarget, query: &ListQuery) -> AcpResult<SessionPage> {
        self.call("list sessions in", &target.project, self.api.list(target, query))
            .await
    }

    pub(crate) async fn fetch(&self, target: &ClusterTarget, id: &str) -> AcpResult<Session> {
        self.call("get", id, self.api.get(target, id)).await
    }

    pub(crate) async fn apply_mutation(
        &self,
        target: &ClusterTarget,
        id: &str,
        mutation: &Mutation,
        action: BulkAction,
    ) -> AcpResult<()> {
        match mutation {
            Mutation::Delete => self.call("delete", id, self.api.delete(target, id)).await,
            Mutation::Patch(patch) => self
                .call(action.as_str(), id, self.api.patch(target, id, patch))
                .await
                .map(|_| ()),
        }
    }

    /// Dry-run helper for single-session mutations: one `get`, nothing else.
    async fn preview_existing(
        &self,
        target: &ClusterTarget,
        id: &str,
        message: String,
        patch: Option<SessionPatch>,
    ) -> AcpResult<Preview> {
        match self.fetch(target, id).await {
            Ok(current) => Ok(Preview {
                current: Some(user_facing(current)),
                patch,
                ..Preview::ok(message)
            }),
            Err(err) if err.is_not_found() => Ok(Preview::missing(id)),
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn list_sessions(&self, target: &ClusterTarget, options: &FilterOptions) -> AcpResult<SessionList> {
        validate_identifier(&target.project, "project")?;
        let filter = options.parse()?;

        let query = ListQuery {
            label_selector: filter.labels.as_ref().map(build_selector).transpose()?,
        };
        let page = self.list_page(target, &query).await?;
        let fetched = page.items.len();

        let sessions = page.items.into_iter().map(user_facing).collect();
        let sessions = filter.apply(sessions, Utc::now());

        debug!(
            project = %target.project,
            fetched,
            returned = sessions.len(),
            "listed sessions"
        );

        Ok(SessionList {
            total: sessions.len(),
            sessions,
            filters_applied: Some(options.clone()),
            labels_filter: None,
        })
    }

    pub async fn get_session(&self, target: &ClusterTarget, id: &str) -> AcpResult<Session> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;
        self.fetch(target, id).await.map(user_facing)
    }

    pub async fn list_sessions_by_label(&self, target: &ClusterTarget, labels: &Labels) -> AcpResult<SessionList> {
        validate_identifier(&target.project, "project")?;
        let query = ListQuery {
            label_selector: Some(build_selector(labels)?),
        };

        let page = self.list_page(target, &query).await?;
        let sessions: Vec<Session> = page
            .items
            .into_iter()
            .map(user_facing)
            .filter(|session| matches_selector(session, labels))
            .collect();

        Ok(SessionList {
            total: sessions.len(),
            sessions,
            filters_applied: None,
            labels_filter: Some(labels.clone()),
        })
    }

    pub async fn get_session_logs(
        &self,
        target: &ClusterTarget,
        id: &str,
        request: &LogRequest,
    ) -> AcpResult<SessionLogs> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;
        let tail_lines = validate_tail_lines(request.tail_lines)?;
        let container = request
            .container
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| validate_identifier(c, "container").map(str::to_string))
            .transpose()?;

        let options = LogOptions {
            container: container.clone(),
            tail_lines,
        };
        let logs = self
            .call("get logs for", id, self.api.get_logs(target, id, &options))
            .await?;

        Ok(SessionLogs {
            session: id.to_string(),
            container,
            tail_lines,
            logs,
        })
    }

    pub async fn get_session_transcript(
        &self,
        target: &ClusterTarget,
        id: &str,
        format: Option<&str>,
    ) -> AcpResult<SessionTranscript> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;
        let format: TranscriptFormat = format.map(str::parse).transpose()?.unwrap_or_default();

        let transcript = self
            .call("get transcript for", id, self.api.get_transcript(target, id, format))
            .await?;

        Ok(SessionTranscript {
            session: id.to_string(),
            format,
            transcript,
        })
    }

    pub async fn get_session_metrics(&self, target: &ClusterTarget, id: &str) -> AcpResult<SessionMetrics> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;

        let metrics = self
            .call("get metrics for", id, self.api.get_metrics(target, id))
            .await?;

        Ok(SessionMetrics {
            session: id.to_string(),
            metrics,
        })
    }

    // ------------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------------

    async fn submit(&self, target: &ClusterTarget, spec: &SessionSpec) -> AcpResult<String> {
        let id = self
            .call("create session in", &target.project, self.api.create(target, spec))
            .await?;
        info!(project = %target.project, session = %id, "session created");
        Ok(id)
    }

    pub async fn create_session(
        &self,
        target: &ClusterTarget,
        request: NewSession,
        dry_run: bool,
    ) -> AcpResult<Planned<Created>> {
        validate_identifier(&target.project, "project")?;
        validate_non_empty(&request.initial_prompt, "initial_prompt")?;
        let timeout = validate_timeout(request.timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS))?;

        let spec = SessionSpec {
            display_name: request.display_name.filter(|name| !name.is_empty()),
            initial_prompt: Some(request.initial_prompt),
            interactive: request.interactive,
            llm_config: Some(LlmConfig::new(
                request.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            )),
            timeout: Some(timeout),
            repos: request.repos,
            workflow: None,
        };

        if dry_run {
            return Ok(Planned::Preview(Preview {
                manifest: Some(spec),
                ..Preview::ok("Would create session with custom prompt".to_string())
            }));
        }

        let id = self.submit(target, &spec).await?;
        Ok(Planned::Applied(Created {
            created: true,
            message: format!("Session '{id}' created in project '{}'", target.project),
            session: id,
            project: target.project.clone(),
            template: None,
            source_session: None,
        }))
    }

    pub async fn create_session_from_template(
        &self,
        target: &ClusterTarget,
        request: TemplateSession,
        dry_run: bool,
    ) -> AcpResult<Planned<Created>> {
        validate_identifier(&target.project, "project")?;
        let template: SessionTemplate = request.template.parse()?;
        validate_non_empty(&request.display_name, "display_name")?;

        let spec = SessionSpec {
            display_name: Some(request.display_name),
            llm_config: Some(template.llm_config()),
            repos: request.repos,
            workflow: Some(template.workflow().to_string()),
            ..Default::default()
        };

        if dry_run {
            return Ok(Planned::Preview(Preview {
                manifest: Some(spec),
                ..Preview::ok(format!("Would create session from template '{template}'"))
            }));
        }

        let id = self.submit(target, &spec).await?;
        Ok(Planned::Applied(Created {
            created: true,
            message: format!("Session '{id}' created from template '{template}'"),
            session: id,
            project: target.project.clone(),
            template: Some(template),
            source_session: None,
        }))
    }

    /// Copy a session's configuration into a new session. Status and id are never copied.
    pub async fn clone_session(
        &self,
        target: &ClusterTarget,
        source_id: &str,
        new_display_name: &str,
        dry_run: bool,
    ) -> AcpResult<Planned<Created>> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(source_id, "source_session")?;
        validate_non_empty(new_display_name, "new_display_name")?;

        let source = self.fetch(target, source_id).await?;
        let timeout = validate_timeout(source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))?;
        let spec = SessionSpec {
            display_name: Some(new_display_name.to_string()),
            initial_prompt: source.initial_prompt,
            interactive: source.interactive,
            llm_config: source.llm_config,
            timeout: Some(timeout),
            repos: source.repos,
            workflow: None,
        };

        if dry_run {
            return Ok(Planned::Preview(Preview {
                manifest: Some(spec),
                ..Preview::ok(format!(
                    "Would clone session '{source_id}' as '{new_display_name}'"
                ))
            }));
        }

        let id = self.submit(target, &spec).await?;
        Ok(Planned::Applied(Created {
            created: true,
            message: format!("Session '{id}' cloned from '{source_id}'"),
            session: id,
            project: target.project.clone(),
            template: None,
            source_session: Some(source_id.to_string()),
        }))
    }

    // ------------------------------------------------------------------------
    // Single-session mutations
    // ------------------------------------------------------------------------

    async fn mutate_one(
        &self,
        target: &ClusterTarget,
        id: &str,
        action: BulkAction,
        mutation: Mutation,
        dry_run: bool,
    ) -> AcpResult<Planned<Applied>> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;

        if dry_run {
            let message = format!("Would {action} session '{id}' in project '{}'", target.project);
            return self
                .preview_existing(target, id, message, None)
                .await
                .map(Planned::Preview);
        }

        self.apply_mutation(target, id, &mutation, action).await?;
        info!(project = %target.project, session = %id, operation = %action, "session updated");

        let past = match action {
            BulkAction::Delete => "deleted",
            BulkAction::Stop => "stopped",
            BulkAction::Restart => "restarted",
            BulkAction::Label => "labeled",
            BulkAction::Unlabel => "unlabeled",
        };
        Ok(Planned::Applied(Applied {
            session: id.to_string(),
            action: past,
            message: format!("Successfully {past} session '{id}'"),
            updated: None,
        }))
    }

    pub async fn delete_session(&self, target: &ClusterTarget, id: &str, dry_run: bool) -> AcpResult<Planned<Applied>> {
        self.mutate_one(target, id, BulkAction::Delete, Mutation::Delete, dry_run)
            .await
    }

    pub async fn restart_session(&self, target: &ClusterTarget, id: &str, dry_run: bool) -> AcpResult<Planned<Applied>> {
        self.mutate_one(
            target,
            id,
            BulkAction::Restart,
            Mutation::Patch(SessionPatch::restart()),
            dry_run,
        )
        .await
    }

    pub async fn stop_session(&self, target: &ClusterTarget, id: &str, dry_run: bool) -> AcpResult<Planned<Applied>> {
        self.mutate_one(
            target,
            id,
            BulkAction::Stop,
            Mutation::Patch(SessionPatch::stop()),
            dry_run,
        )
        .await
    }

    pub async fn update_session(
        &self,
        target: &ClusterTarget,
        id: &str,
        update: SessionUpdate,
        dry_run: bool,
    ) -> AcpResult<Planned<Applied>> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;

        if update.display_name.is_none() && update.timeout.is_none() {
            return Err(ValidationError::NoChanges {
                fields: "display_name or timeout",
            }
            .into());
        }
        if let Some(name) = &update.display_name {
            validate_non_empty(name, "display_name")?;
        }
        let timeout = update.timeout.map(validate_timeout).transpose()?;

        let patch = SessionPatch {
            display_name: update.display_name,
            timeout,
            ..Default::default()
        };

        if dry_run {
            let message = format!("Would update session '{id}'");
            return self
                .preview_existing(target, id, message, Some(patch))
                .await
                .map(Planned::Preview);
        }

        let session = self
            .call("update", id, self.api.patch(target, id, &patch))
            .await?;
        info!(project = %target.project, session = %id, "session metadata updated");

        Ok(Planned::Applied(Applied {
            session: id.to_string(),
            action: "updated",
            message: format!("Successfully updated session '{id}'"),
            updated: Some(user_facing(session)),
        }))
    }

    pub async fn label_session(&self, target: &ClusterTarget, id: &str, labels: &Labels) -> AcpResult<LabelChange> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;
        let patch = SessionPatch::add_labels(build_labels(labels)?);

        self.call("label", id, self.api.patch(target, id, &patch))
            .await?;

        Ok(LabelChange {
            session: id.to_string(),
            message: format!("Added {} label(s) to session '{id}'", labels.len()),
            labels_added: Some(labels.clone()),
            labels_removed: None,
        })
    }

    pub async fn unlabel_session(&self, target: &ClusterTarget, id: &str, keys: &[String]) -> AcpResult<LabelChange> {
        validate_identifier(&target.project, "project")?;
        validate_identifier(id, "session")?;
        let patch = SessionPatch::remove_labels(prefix_keys(keys)?);

        self.call("unlabel", id, self.api.patch(target, id, &patch))
            .await?;

        Ok(LabelChange {
            session: id.to_string(),
            message: format!("Removed {} label(s) from session '{id}'", keys.len()),
            labels_added: None,
            labels_removed: Some(keys.to_vec()),
        })
    }

    // ------------------------------------------------------------------------
    // Bulk
    // ------------------------------------------------------------------------

    async fn bulk(
        &self,
        target: &ClusterTarget,
        change: BulkChange,
        targets: BulkTargets,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        validate_identifier(&target.project, "project")?;
        let request = BulkRequest::new(change, targets)
            .with_confirm(confirm)
            .with_dry_run(dry_run);
        run_bulk(request, self, target).await
    }

    pub async fn bulk_delete_sessions(
        &self,
        target: &ClusterTarget,
        ids: Vec<String>,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Delete, BulkTargets::Sessions(ids), confirm, dry_run)
            .await
    }

    pub async fn bulk_stop_sessions(
        &self,
        target: &ClusterTarget,
        ids: Vec<String>,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Stop, BulkTargets::Sessions(ids), confirm, dry_run)
            .await
    }

    pub async fn bulk_restart_sessions(
        &self,
        target: &ClusterTarget,
        ids: Vec<String>,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Restart, BulkTargets::Sessions(ids), confirm, dry_run)
            .await
    }

    pub async fn bulk_label_sessions(
        &self,
        target: &ClusterTarget,
        ids: Vec<String>,
        labels: Labels,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Label(labels), BulkTargets::Sessions(ids), confirm, dry_run)
            .await
    }

    pub async fn bulk_unlabel_sessions(
        &self,
        target: &ClusterTarget,
        ids: Vec<String>,
        keys: Vec<String>,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Unlabel(keys), BulkTargets::Sessions(ids), confirm, dry_run)
            .await
    }

    pub async fn bulk_delete_sessions_by_label(
        &self,
        target: &ClusterTarget,
        labels: Labels,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Delete, BulkTargets::Selector(labels), confirm, dry_run)
            .await
    }

    pub async fn bulk_stop_sessions_by_label(
        &self,
        target: &ClusterTarget,
        labels: Labels,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Stop, BulkTargets::Selector(labels), confirm, dry_run)
            .await
    }

    pub async fn bulk_restart_sessions_by_label(
        &self,
        target: &ClusterTarget,
        labels: Labels,
        confirm: bool,
        dry_run: bool,
    ) -> AcpResult<BulkReport> {
        self.bulk(target, BulkChange::Restart, BulkTargets::Selector(labels), confirm, dry_run)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_lines_bounds() {
        assert_eq!(validate_tail_lines(None), Ok(1000));
        assert_eq!(validate_tail_lines(Some(10_000)), Ok(10_000));
        assert!(matches!(
            validate_tail_lines(Some(10_001)),
            Err(ValidationError::AboveMaximum { max: 10_000, .. })
        ));
        assert!(matches!(
            validate_tail_lines(Some(0)),
            Err(ValidationError::BelowMinimum { min: 1, .. })
        ));
    }

    #[test]
    fn test_timeout_minimum() {
        assert_eq!(validate_timeout(60), Ok(60));
        assert_eq!(
            validate_timeout(59),
            Err(ValidationError::BelowMinimum {
                field: "timeout".to_string(),
                min: 60,
                actual: 59
            })
        );
    }

    #[test]
    fn test_preview_serializes_dry_run_flag() {
        let value = serde_json::to_value(Preview::missing("gone")).unwrap();
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Session 'gone' not found");
        assert!(value.get("current").is_none());
    }
}
