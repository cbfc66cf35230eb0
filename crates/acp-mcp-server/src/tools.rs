//! Tool catalog advertised through `tools/list`

use acp_core::{Action, SessionStatus, SessionTemplate, MAX_BULK_ITEMS};
use std::fmt;

use crate::protocol::{JsonSchema, ToolSpec};

/// Tools that act on the server's cluster selection rather than on sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterTool {
    ListClusters,
    Whoami,
    SwitchCluster,
    Login,
}

impl ClusterTool {
    pub const ALL: [ClusterTool; 4] = [
        Self::ListClusters,
        Self::Whoami,
        Self::SwitchCluster,
        Self::Login,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListClusters => "acp_list_clusters",
            Self::Whoami => "acp_whoami",
            Self::SwitchCluster => "acp_switch_cluster",
            Self::Login => "acp_login",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

impl fmt::Display for ClusterTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved `tools/call` name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Session(Action),
    Cluster(ClusterTool),
}

impl Tool {
    pub fn from_name(name: &str) -> Option<Self> {
        Action::from_name(name)
            .map(Self::Session)
            .or_else(|| ClusterTool::from_name(name).map(Self::Cluster))
    }
}

fn project() -> JsonSchema {
    JsonSchema::string().description("Project/namespace name (uses default if not provided)")
}

fn session() -> JsonSchema {
    JsonSchema::string().description("Session ID")
}

fn dry_run() -> JsonSchema {
    JsonSchema::boolean()
        .description("Preview without executing (default: false)")
        .default_value(false)
}

fn confirm() -> JsonSchema {
    JsonSchema::boolean()
        .description("Required for destructive operations (default: false)")
        .default_value(false)
}

fn sessions_array() -> JsonSchema {
    JsonSchema::array(JsonSchema::string())
        .description(format!("List of session names (max {MAX_BULK_ITEMS})"))
}

fn labels_object() -> JsonSchema {
    JsonSchema::map_of(JsonSchema::string())
        .description(r#"Labels as key-value pairs (e.g., {"env": "test", "team": "qa"})"#)
}

fn label_keys_array() -> JsonSchema {
    JsonSchema::array(JsonSchema::string()).description("List of label keys to remove")
}

fn repos() -> JsonSchema {
    JsonSchema::array(JsonSchema::string()).description("Repository URLs to clone")
}

fn resource_type() -> JsonSchema {
    JsonSchema::string()
        .description("Resource type")
        .one_of(&["agenticsession"])
        .default_value("agenticsession")
}

/// Session-scoped schema: always accepts `project`.
fn scoped() -> JsonSchema {
    JsonSchema::object().property("project", project())
}

fn single_session(with_dry_run: bool) -> JsonSchema {
    let schema = scoped().property("session", session());
    let schema = if with_dry_run {
        schema.property("dry_run", dry_run())
    } else {
        schema
    };
    schema.required(&["session"])
}

fn bulk_by_id() -> JsonSchema {
    scoped()
        .property("sessions", sessions_array())
        .property("confirm", confirm())
        .property("dry_run", dry_run())
}

fn bulk_by_label() -> JsonSchema {
    scoped()
        .property("labels", labels_object())
        .property("confirm", confirm())
        .property("dry_run", dry_run())
        .required(&["labels"])
}

fn template_names() -> Vec<&'static str> {
    SessionTemplate::ALL.iter().map(|t| t.name()).collect()
}

pub fn action_spec(action: Action) -> ToolSpec {
    let (description, schema): (String, JsonSchema) = match action {
        Action::ListSessions => (
            "List and filter AgenticSessions in a project. Filter by status (running/stopped/failed), age. Sort and limit results.".into(),
            scoped()
                .property(
                    "status",
                    JsonSchema::string()
                        .description("Filter by status")
                        .one_of(SessionStatus::FILTERABLE),
                )
                .property(
                    "older_than",
                    JsonSchema::string().description("Filter by age (e.g., '7d', '24h', '30m')"),
                )
                .property(
                    "label_selector",
                    JsonSchema::string().description("Label selector (e.g., 'env=test,team=qa')"),
                )
                .property(
                    "sort_by",
                    JsonSchema::string()
                        .description("Sort field")
                        .one_of(&["created", "stopped", "name"]),
                )
                .property(
                    "limit",
                    JsonSchema::integer()
                        .description("Maximum number of results")
                        .minimum(1),
                ),
        ),
        Action::GetSession => (
            "Get details of a specific session by ID.".into(),
            single_session(false),
        ),
        Action::CreateSession => (
            "Create an ACP AgenticSession with a custom prompt. Supports dry-run mode.".into(),
            scoped()
                .property(
                    "initial_prompt",
                    JsonSchema::string().description("The prompt/instructions to send to the session"),
                )
                .property(
                    "display_name",
                    JsonSchema::string().description("Human-readable display name"),
                )
                .property("repos", repos())
                .property(
                    "interactive",
                    JsonSchema::boolean()
                        .description("Create an interactive session")
                        .default_value(false),
                )
                .property(
                    "model",
                    JsonSchema::string()
                        .description("LLM model to use")
                        .default_value(acp_core::types::DEFAULT_MODEL),
                )
                .property(
                    "timeout",
                    JsonSchema::integer()
                        .description("Timeout in seconds")
                        .default_value(acp_core::types::DEFAULT_TIMEOUT_SECONDS)
                        .minimum(acp_core::types::MIN_TIMEOUT_SECONDS as i64),
                )
                .property("dry_run", dry_run())
                .required(&["initial_prompt"]),
        ),
        Action::CreateSessionFromTemplate => (
            format!(
                "Create a session from a predefined template ({}). Each template has optimized settings.",
                template_names().join("/")
            ),
            scoped()
                .property(
                    "template",
                    JsonSchema::string()
                        .description("Template name")
                        .one_of(&template_names()),
                )
                .property(
                    "display_name",
                    JsonSchema::string().description("Display name for the session"),
                )
                .property("repos", repos())
                .property("dry_run", dry_run())
                .required(&["template", "display_name"]),
        ),
        Action::DeleteSession => (
            "Delete an AgenticSession. Supports dry-run mode.".into(),
            single_session(true),
        ),
        Action::RestartSession => (
            "Restart a stopped session. Supports dry-run mode.".into(),
            single_session(true),
        ),
        Action::StopSession => (
            "Stop a running session. Supports dry-run mode.".into(),
            single_session(true),
        ),
        Action::CloneSession => (
            "Clone an existing session's configuration into a new session.".into(),
            scoped()
                .property(
                    "source_session",
                    JsonSchema::string().description("Session ID to clone from"),
                )
                .property(
                    "new_display_name",
                    JsonSchema::string().description("Display name for the cloned session"),
                )
                .property("dry_run", dry_run())
                .required(&["source_session", "new_display_name"]),
        ),
        Action::UpdateSession => (
            "Update session metadata (display name, timeout). Supports dry-run mode.".into(),
            scoped()
                .property("session", session())
                .property(
                    "display_name",
                    JsonSchema::string().description("New display name"),
                )
                .property(
                    "timeout",
                    JsonSchema::integer()
                        .description("New timeout in seconds")
                        .minimum(acp_core::types::MIN_TIMEOUT_SECONDS as i64),
                )
                .property("dry_run", dry_run())
                .required(&["session"]),
        ),
        Action::GetSessionLogs => (
            "Retrieve container logs for a session. Useful for debugging.".into(),
            scoped()
                .property("session", session())
                .property(
                    "container",
                    JsonSchema::string().description("Container name (optional)"),
                )
                .property(
                    "tail_lines",
                    JsonSchema::integer()
                        .description("Number of log lines (default: 1000, max: 10000)")
                        .default_value(acp_core::operations::DEFAULT_TAIL_LINES)
                        .minimum(1)
                        .maximum(acp_core::operations::MAX_TAIL_LINES.into()),
                )
                .required(&["session"]),
        ),
        Action::GetSessionTranscript => (
            "Retrieve conversation history for a session in JSON or Markdown format.".into(),
            scoped()
                .property("session", session())
                .property(
                    "format",
                    JsonSchema::string()
                        .description("Output format")
                        .one_of(&["json", "markdown"])
                        .default_value("json"),
                )
                .required(&["session"]),
        ),
        Action::GetSessionMetrics => (
            "Get usage statistics for a session (tokens, duration, tool calls).".into(),
            single_session(false),
        ),
        Action::LabelSession => (
            "Add labels to a session. Labels are key-value pairs for organizing and filtering.".into(),
            scoped()
                .property("name", JsonSchema::string().description("Session name"))
                .property("resource_type", resource_type())
                .property("labels", labels_object())
                .required(&["name", "labels"]),
        ),
        Action::UnlabelSession => (
            "Remove labels from a session by key.".into(),
            scoped()
                .property("name", JsonSchema::string().description("Session name"))
                .property("resource_type", resource_type())
                .property("label_keys", label_keys_array())
                .required(&["name", "label_keys"]),
        ),
        Action::ListSessionsByLabel => (
            "List sessions matching label selectors.".into(),
            scoped()
                .property("labels", labels_object())
                .required(&["labels"]),
        ),
        Action::BulkLabelSessions => (
            format!("Add labels to multiple sessions (max {MAX_BULK_ITEMS}). DESTRUCTIVE: requires confirm=true."),
            bulk_by_id()
                .property("labels", labels_object())
                .required(&["sessions", "labels"]),
        ),
        Action::BulkUnlabelSessions => (
            format!("Remove labels from multiple sessions (max {MAX_BULK_ITEMS}). DESTRUCTIVE: requires confirm=true."),
            bulk_by_id()
                .property("label_keys", label_keys_array())
                .required(&["sessions", "label_keys"]),
        ),
        Action::BulkDeleteSessions => (
            format!("Delete multiple sessions (max {MAX_BULK_ITEMS}). DESTRUCTIVE: requires confirm=true. Use dry_run=true first!"),
            bulk_by_id().required(&["sessions"]),
        ),
        Action::BulkStopSessions => (
            format!("Stop multiple running sessions (max {MAX_BULK_ITEMS}). DESTRUCTIVE: requires confirm=true."),
            bulk_by_id().required(&["sessions"]),
        ),
        Action::BulkRestartSessions => (
            format!("Restart multiple stopped sessions (max {MAX_BULK_ITEMS}). Requires confirm=true."),
            bulk_by_id().required(&["sessions"]),
        ),
        Action::BulkDeleteSessionsByLabel => (
            format!("Delete sessions matching label selectors (max {MAX_BULK_ITEMS} matches). DESTRUCTIVE: requires confirm=true."),
            bulk_by_label(),
        ),
        Action::BulkStopSessionsByLabel => (
            format!("Stop sessions matching label selectors (max {MAX_BULK_ITEMS} matches). DESTRUCTIVE: requires confirm=true."),
            bulk_by_label(),
        ),
        Action::BulkRestartSessionsByLabel => (
            format!("Restart sessions matching label selectors (max {MAX_BULK_ITEMS} matches). Requires confirm=true."),
            bulk_by_label(),
        ),
    };

    ToolSpec::new(action.name(), description, schema)
}

pub fn cluster_spec(tool: ClusterTool) -> ToolSpec {
    let cluster = || JsonSchema::string().description("Cluster alias name");

    let (description, schema) = match tool {
        ClusterTool::ListClusters => (
            "List configured cluster aliases from clusters.yaml.",
            JsonSchema::object(),
        ),
        ClusterTool::Whoami => (
            "Get current configuration and authentication status.",
            JsonSchema::object(),
        ),
        ClusterTool::SwitchCluster => (
            "Switch to a different cluster context.",
            JsonSchema::object()
                .property("cluster", cluster())
                .required(&["cluster"]),
        ),
        ClusterTool::Login => (
            "Authenticate to a cluster with a Bearer token. Sets the token in memory and verifies it works.",
            JsonSchema::object()
                .property("cluster", cluster())
                .property(
                    "token",
                    JsonSchema::string().description("Bearer token for authentication"),
                )
                .required(&["cluster"]),
        ),
    };

    ToolSpec::new(tool.name(), description, schema)
}

/// Every tool, session actions first.
pub fn tool_specs() -> Vec<ToolSpec> {
    Action::ALL
        .into_iter()
        .map(action_spec)
        .chain(ClusterTool::ALL.into_iter().map(cluster_spec))
        .collect()
}
