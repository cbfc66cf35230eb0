//! MCP front end for Ambient Code Platform sessions
//!
//! Decodes JSON-RPC tool calls, snapshots the selected cluster into a
//! [`acp_core::ClusterTarget`], and hands the call to the session core.

pub mod clusters;
pub mod protocol;
pub mod server;
pub mod tools;

pub use clusters::ClusterContext;
pub use protocol::{JsonRpcRequest, JsonRpcResponse, ToolOutput};
pub use server::{serve, McpServer, SERVER_NAME};
pub use tools::{tool_specs, ClusterTool, Tool};
