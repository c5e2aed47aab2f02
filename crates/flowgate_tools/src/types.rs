//! Tool call and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request to run a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call
    pub id: String,
    /// Name of the tool to run
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    /// Create a tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Terminal state of a tool call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolCallStatus {
    /// Tool returned a value within the deadline
    Success,
    /// No tool with the requested name
    NotFound,
    /// Deadline elapsed first
    Timeout,
    /// Tool reported a failure
    Error,
}

/// Outcome of a tool call. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the call this result answers
    pub call_id: String,
    /// Name of the tool that was called
    pub name: String,
    /// Whether the call succeeded
    pub success: bool,
    /// Returned value on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Error message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Terminal state of the call
    pub status: ToolCallStatus,
}

impl ToolResult {
    /// Successful result carrying `value`.
    pub fn success(call: &ToolCall, value: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            success: true,
            value: Some(value),
            error: None,
            status: ToolCallStatus::Success,
        }
    }

    /// Failed result with a terminal `status` and message.
    pub fn failure(call: &ToolCall, status: ToolCallStatus, error: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            success: false,
            value: None,
            error: Some(error.into()),
            status,
        }
    }
}
