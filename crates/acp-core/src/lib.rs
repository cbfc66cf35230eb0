//! Core session management for the Ambient Code Platform
//!
//! Validation, label handling, filtering and the bulk safety gate sit between
//! a tool-call boundary and a [`RemoteSessionApi`] transport. Nothing here
//! knows how requests reach the cluster or how results are rendered.

pub mod actions;
pub mod age;
pub mod api;
pub mod error;
pub mod filter;
pub mod gate;
pub mod labels;
pub mod operations;
pub mod templates;
pub mod types;
pub mod validate;

pub use actions::{Action, Execute};
pub use api::{RemoteResult, RemoteSessionApi};
pub use error::{AcpError, AcpResult, RemoteError, ValidationError};
pub use filter::{FilterOptions, SessionFilter, SortKey};
pub use gate::{
    BulkAction, BulkChange, BulkOutcome, BulkReport, BulkRequest, BulkStatus, BulkTargets, DryRunPreview,
    MAX_BULK_ITEMS,
};
pub use labels::{Labels, LABEL_PREFIX};
pub use operations::{SessionOperations, REMOTE_CALL_TIMEOUT};
pub use templates::SessionTemplate;
pub use types::{
    ClusterTarget, ListQuery, LlmConfig, LogOptions, Session, SessionPage, SessionPatch, SessionSpec,
    SessionStatus, TranscriptFormat,
};
