//! Safety gate for bulk operations
//!
//! A bulk request moves through a fixed chain of states:
//!
//! ```text
//! BulkRequest --validate--> Requested --resolve--> Resolved --authorize--> Gated
//!                                                               |
//!                      NoMatches | DryRun --preview--> DryRunPreview
//!                                | Authorized --execute--> BulkOutcome
//! ```
//!
//! Each transition consumes the previous state, so a request cannot reach
//! execution without passing the size limit and the confirmation check.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::api::RemoteSessionApi;
use crate::labels::{build_labels, build_selector, matches_selector, prefix_keys, user_facing, Labels};
use crate::operations::SessionOperations;
use crate::types::{ClusterTarget, ListQuery, SessionPatch, SessionStatus};
use crate::validate::validate_identifier;
use crate::{AcpError, AcpResult, ValidationError};

/// Upper bound on targets processed by one bulk request.
pub const MAX_BULK_ITEMS: usize = 3;

pub const NO_MATCHES_MESSAGE: &str = "No sessions match the given labels";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Delete,
    Stop,
    Restart,
    Label,
    Unlabel,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Label => "label",
            Self::Unlabel => "unlabel",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a bulk request applies to each target.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkChange {
    Delete,
    Stop,
    Restart,
    /// Bare user label keys and values
    Label(Labels),
    /// Bare user label keys
    Unlabel(Vec<String>),
}

impl BulkChange {
    pub fn action(&self) -> BulkAction {
        match self {
            Self::Delete => BulkAction::Delete,
            Self::Stop => BulkAction::Stop,
            Self::Restart => BulkAction::Restart,
            Self::Label(_) => BulkAction::Label,
            Self::Unlabel(_) => BulkAction::Unlabel,
        }
    }
}

/// The remote mutation for one target, with label keys already namespaced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Mutation {
    Delete,
    Patch(SessionPatch),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BulkTargets {
    Sessions(Vec<String>),
    Selector(Labels),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkRequest {
    pub change: BulkChange,
    pub targets: BulkTargets,
    pub confirm: bool,
    pub dry_run: bool,
}

impl BulkRequest {
    pub fn new(change: BulkChange, targets: BulkTargets) -> Self {
        Self {
            change,
            targets,
            confirm: false,
            dry_run: false,
        }
    }

    pub fn with_confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check every explicit id and the label payload. No remote calls.
    pub fn validate(self) -> Result<Requested, ValidationError> {
        let action = self.change.action();

        let mutation = match self.change {
            BulkChange::Delete => Mutation::Delete,
            BulkChange::Stop => Mutation::Patch(SessionPatch::stop()),
            BulkChange::Restart => Mutation::Patch(SessionPatch::restart()),
            BulkChange::Label(labels) => Mutation::Patch(SessionPatch::add_labels(build_labels(&labels)?)),
            BulkChange::Unlabel(keys) => Mutation::Patch(SessionPatch::remove_labels(prefix_keys(&keys)?)),
        };

        let targets = match self.targets {
            BulkTargets::Sessions(ids) => {
                if ids.is_empty() {
                    return Err(ValidationError::empty("sessions"));
                }
                for id in &ids {
                    validate_identifier(id, "session")?;
                }
                BulkTargets::Sessions(ids)
            }
            BulkTargets::Selector(labels) => {
                // Validated here so an invalid selector never reaches `list`.
                build_selector(&labels)?;
                BulkTargets::Selector(labels)
            }
        };

        Ok(Requested {
            action,
            mutation,
            targets,
            confirm: self.confirm,
            dry_run: self.dry_run,
        })
    }
}

/// A validated bulk request whose targets may still be a selector.
#[derive(Debug)]
pub struct Requested {
    action: BulkAction,
    mutation: Mutation,
    targets: BulkTargets,
    confirm: bool,
    dry_run: bool,
}

impl Requested {
    pub fn action(&self) -> BulkAction {
        self.action
    }

    /// Materialize the target list. Selector requests perform one read-only `list`.
    pub async fn resolve<A: RemoteSessionApi>(
        self,
        ops: &SessionOperations<A>,
        target: &ClusterTarget,
    ) -> AcpResult<Resolved> {
        let (ids, count, selector) = match self.targets {
            BulkTargets::Sessions(ids) => {
                let count = ids.len();
                (ids, count, None)
            }
            BulkTargets::Selector(labels) => {
                let query = ListQuery {
                    label_selector: Some(build_selector(&labels)?),
                };
                let page = ops.list_page(target, &query).await?;
                let fetched = page.items.len();
                let reported = page.match_count();

                let ids: Vec<String> = page
                    .items
                    .into_iter()
                    .map(user_facing)
                    .filter(|session| matches_selector(session, &labels))
                    .map(|session| session.id)
                    .collect();

                // A page with non-matching items means the selector was ignored
                // upstream, so its total says nothing about the match count.
                let count = if ids.len() == fetched {
                    reported
                } else {
                    warn!(
                        operation = %self.action,
                        fetched,
                        matched = ids.len(),
                        "list returned sessions outside the selector"
                    );
                    ids.len()
                };
                (ids, count, Some(labels))
            }
        };

        debug!(operation = %self.action, count, "bulk targets resolved");

        Ok(Resolved {
            action: self.action,
            mutation: self.mutation,
            ids,
            count,
            selector,
            confirm: self.confirm,
            dry_run: self.dry_run,
        })
    }
}

/// A bulk request with a concrete target list.
#[derive(Debug)]
pub struct Resolved {
    action: BulkAction,
    mutation: Mutation,
    ids: Vec<String>,
    count: usize,
    selector: Option<Labels>,
    confirm: bool,
    dry_run: bool,
}

impl Resolved {
    /// Apply the size limit, then route to preview, confirmation or execution.
    pub fn authorize(self) -> AcpResult<Gated> {
        if self.count > MAX_BULK_ITEMS {
            warn!(operation = %self.action, count = self.count, "bulk limit exceeded");
            return Err(AcpError::BulkLimitExceeded {
                operation: self.action,
                count: self.count,
                limit: MAX_BULK_ITEMS,
            });
        }

        if self.ids.is_empty() {
            return Ok(Gated::NoMatches(BulkOutcome {
                operation: self.action,
                status: BulkStatus::Completed,
                succeeded: Vec::new(),
                failed: Vec::new(),
                message: Some(NO_MATCHES_MESSAGE.to_string()),
                labels_filter: self.selector,
            }));
        }

        if self.dry_run {
            return Ok(Gated::DryRun(DryRun {
                action: self.action,
                ids: self.ids,
                selector: self.selector,
            }));
        }

        if !self.confirm {
            return Err(AcpError::ConfirmationRequired {
                operation: self.action,
            });
        }

        Ok(Gated::Authorized(Authorized {
            action: self.action,
            mutation: self.mutation,
            ids: self.ids,
            selector: self.selector,
        }))
    }
}

#[derive(Debug)]
pub enum Gated {
    NoMatches(BulkOutcome),
    DryRun(DryRun),
    Authorized(Authorized),
}

/// A read-only preview of a bulk request.
#[derive(Debug)]
pub struct DryRun {
    action: BulkAction,
    ids: Vec<String>,
    selector: Option<Labels>,
}

impl DryRun {
    /// Check each target exists. Only `get` is called.
    pub async fn preview<A: RemoteSessionApi>(
        self,
        ops: &SessionOperations<A>,
        target: &ClusterTarget,
    ) -> DryRunPreview {
        let mut would_execute = Vec::new();
        let mut skipped = Vec::new();

        for id in self.ids {
            match ops.fetch(target, &id).await {
                Ok(session) => would_execute.push(PreviewEntry {
                    id,
                    status: session.status,
                }),
                Err(err) => skipped.push(SkippedEntry {
                    reason: err.target_message(),
                    id,
                }),
            }
        }

        DryRunPreview {
            operation: self.action,
            dry_run: true,
            would_execute,
            skipped,
            labels_filter: self.selector,
        }
    }
}

/// A confirmed bulk request within the size limit.
#[derive(Debug)]
pub struct Authorized {
    action: BulkAction,
    mutation: Mutation,
    ids: Vec<String>,
    selector: Option<Labels>,
}

impl Authorized {
    /// Apply the change to each target in order. A failing target never stops the rest.
    pub async fn execute<A: RemoteSessionApi>(
        self,
        ops: &SessionOperations<A>,
        target: &ClusterTarget,
    ) -> BulkOutcome {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for id in self.ids {
            match ops.apply_mutation(target, &id, &self.mutation, self.action).await {
                Ok(()) => succeeded.push(id),
                Err(err) => {
                    warn!(operation = %self.action, session = %id, error = %err, "bulk target failed");
                    failed.push(TargetFailure {
                        error: err.target_message(),
                        id,
                    });
                }
            }
        }

        let status = BulkStatus::from_counts(succeeded.len(), failed.len());
        info!(
            operation = %self.action,
            succeeded = succeeded.len(),
            failed = failed.len(),
            "bulk operation finished"
        );

        BulkOutcome {
            operation: self.action,
            status,
            succeeded,
            failed,
            message: None,
            labels_filter: self.selector,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    Completed,
    PartiallyFailed,
    Failed,
}

impl BulkStatus {
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => Self::Completed,
            (0, _) => Self::Failed,
            _ => Self::PartiallyFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOutcome {
    pub operation: BulkAction,
    pub status: BulkStatus,
    pub succeeded: Vec<String>,
    pub failed: Vec<TargetFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_filter: Option<Labels>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewEntry {
    pub id: String,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DryRunPreview {
    pub operation: BulkAction,
    pub dry_run: bool,
    pub would_execute: Vec<PreviewEntry>,
    pub skipped: Vec<SkippedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_filter: Option<Labels>,
}

/// Final result of a bulk request that passed the gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BulkReport {
    Executed(BulkOutcome),
    Preview(DryRunPreview),
}

/// Drive a bulk request through every gate state.
pub async fn run_bulk<A: RemoteSessionApi>(
    request: BulkRequest,
    ops: &SessionOperations<A>,
    target: &ClusterTarget,
) -> AcpResult<BulkReport> {
    let resolved = request.validate()?.resolve(ops, target).await?;

    match resolved.authorize()? {
        Gated::NoMatches(outcome) => Ok(BulkReport::Executed(outcome)),
        Gated::DryRun(dry_run) => Ok(BulkReport::Preview(dry_run.preview(ops, target).await)),
        Gated::Authorized(authorized) => Ok(BulkReport::Executed(authorized.execute(ops, target).await)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(ids: &[&str], confirm: bool, dry_run: bool) -> Resolved {
        Resolved {
            action: BulkAction::Delete,
            mutation: Mutation::Delete,
            ids: ids.iter().map(|s| s.to_string()).collect(),
            count: ids.len(),
            selector: None,
            confirm,
            dry_run,
        }
    }

    #[test]
    fn test_limit_checked_before_confirmation() {
        let err = resolved(&["a", "b", "c", "d"], false, false)
            .authorize()
            .unwrap_err();
        assert!(matches!(
            err,
            AcpError::BulkLimitExceeded {
                count: 4,
                limit: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_limit_applies_to_dry_run() {
        let err = resolved(&["a", "b", "c", "d"], false, true)
            .authorize()
            .unwrap_err();
        assert!(matches!(err, AcpError::BulkLimitExceeded { .. }));
    }

    #[test]
    fn test_limit_uses_reported_count() {
        let mut request = resolved(&["a"], true, false);
        request.count = 7;
        assert!(matches!(
            request.authorize(),
            Err(AcpError::BulkLimitExceeded { count: 7, .. })
        ));
    }

    #[test]
    fn test_confirmation_required() {
        let err = resolved(&["a", "b"], false, false).authorize().unwrap_err();
        assert!(matches!(
            err,
            AcpError::ConfirmationRequired {
                operation: BulkAction::Delete
            }
        ));
    }

    #[test]
    fn test_dry_run_wins_over_confirm() {
        assert!(matches!(
            resolved(&["a"], true, true).authorize(),
            Ok(Gated::DryRun(_))
        ));
        assert!(matches!(
            resolved(&["a"], false, true).authorize(),
            Ok(Gated::DryRun(_))
        ));
    }

    #[test]
    fn test_no_matches_is_empty_completion() {
        let mut request = resolved(&[], false, false);
        request.selector = Some(Labels::from([("env".to_string(), "test".to_string())]));
        match request.authorize() {
            Ok(Gated::NoMatches(outcome)) => {
                assert_eq!(outcome.status, BulkStatus::Completed);
                assert!(outcome.succeeded.is_empty());
                assert_eq!(outcome.message.as_deref(), Some(NO_MATCHES_MESSAGE));
            }
            other => panic!("unexpected gate result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_targets() {
        let empty = BulkRequest::new(BulkChange::Stop, BulkTargets::Sessions(vec![]));
        assert_eq!(empty.validate().unwrap_err(), ValidationError::empty("sessions"));

        let bad_id = BulkRequest::new(
            BulkChange::Delete,
            BulkTargets::Sessions(vec!["ok".into(), "Not_OK".into()]),
        );
        assert!(bad_id.validate().is_err());

        let empty_selector = BulkRequest::new(BulkChange::Delete, BulkTargets::Selector(Labels::new()));
        assert!(empty_selector.validate().is_err());

        let bad_label = BulkRequest::new(
            BulkChange::Label(Labels::from([("env".to_string(), "a b".to_string())])),
            BulkTargets::Sessions(vec!["a".into()]),
        );
        assert!(bad_label.validate().is_err());
    }

    #[test]
    fn test_validate_namespaces_label_changes() {
        let requested = BulkRequest::new(
            BulkChange::Unlabel(vec!["env".into()]),
            BulkTargets::Sessions(vec!["a".into()]),
        )
        .validate()
        .unwrap();
        assert_eq!(requested.action(), BulkAction::Unlabel);
        assert_eq!(
            requested.mutation,
            Mutation::Patch(SessionPatch::remove_labels(vec![
                "acp.ambient-code.io/env".to_string()
            ]))
        );
    }

    #[test]
    fn test_status_from_counts() {
        assert_eq!(BulkStatus::from_counts(2, 0), BulkStatus::Completed);
        assert_eq!(BulkStatus::from_counts(1, 1), BulkStatus::PartiallyFailed);
        assert_eq!(BulkStatus::from_counts(0, 2), BulkStatus::Failed);
    }
}
