use serde::{Deserialize, Serialize};

/// Fixed denial text the agent sees in place of a blocked call's real result.
pub const BLOCKED_MESSAGE: &str = "Action blocked by policy.";
/// Error tag marking the denial as a policy decision, not an execution failure.
pub const BLOCKED_ERROR_TAG: &str = "PolicyViolation: action blocked before execution.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One candidate tool invocation. Immutable once created: it either passes
/// through to the executor unchanged or is dropped and answered by a
/// [`BlockedResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }

    /// Canonical `name(arguments)` rendering handed to the oracle. serde_json
    /// keeps object keys sorted, so equal payloads render identically.
    pub fn describe(&self) -> String {
        let args = serde_json::to_string(&self.arguments).unwrap_or_default();
        format!("{}({})", self.name, args)
    }
}

/// One unit of agent output. Tool-result turns carry `tool_call_id` and,
/// for failures and denials, `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            error: None,
        }
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
            error: None,
        }
    }
}

/// Synthesized stand-in for a denied call's would-be execution result.
/// Only the filter stage produces these; the real executor never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub message: String,
    pub error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl BlockedResult {
    pub fn from_call(call: &ToolCall) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            message: BLOCKED_MESSAGE.to_string(),
            error: BLOCKED_ERROR_TAG.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Renders the denial as a tool-result turn the agent can react to.
    pub fn into_turn(self) -> Turn {
        Turn {
            role: Role::Tool,
            content: Some(self.message),
            tool_calls: Vec::new(),
            tool_call_id: Some(self.tool_call_id),
            error: Some(self.error),
        }
    }
}

/// Ordered turn history. Append-only, except for the single sanctioned
/// rewrite of the latest turn's call list performed by the filter stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Replaces the latest turn's call list, leaving every other field and
    /// every earlier turn untouched. No-op on an empty conversation.
    pub fn replace_latest_tool_calls(&mut self, tool_calls: Vec<ToolCall>) {
        if let Some(last) = self.turns.last_mut() {
            last.tool_calls = tool_calls;
        }
    }
}
