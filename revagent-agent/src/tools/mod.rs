//! Tools the model may call
//!
//! A handler advertises its tool definitions and resolves calls by name.
//! Failures are returned as errors; the agent folds their message back into
//! the conversation instead of aborting.

pub mod file_read;
pub mod moderation;
pub mod search;

pub use file_read::FileReadTool;
pub use moderation::ModerationTools;
pub use search::{SearchResult, WebSearch};

use revagent_core::{LlmProvider, ToolCall, ToolDefinition};
use revagent_error::{Error, Result};
use serde::de::DeserializeOwned;

/// Resolves the tool calls of one agent
#[allow(async_fn_in_trait)]
pub trait ToolHandler: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Run one call. The provider is available for tools that ask a model themselves.
    async fn call<P: LlmProvider>(&self, provider: &P, call: &ToolCall) -> Result<String>;
}

/// An agent without tools
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTools;

impl ToolHandler for NoTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    async fn call<P: LlmProvider>(&self, _provider: &P, call: &ToolCall) -> Result<String> {
        Err(Error::tool_unknown(call.name.as_str()))
    }
}

/// Decode call arguments into the tool's parameter struct
pub(crate) fn arguments<T: DeserializeOwned>(call: &ToolCall) -> Result<T> {
    call.parse_arguments().map_err(|e| {
        Error::tool_failed(call.name.as_str(), format!("invalid arguments: {}", e))
            .with_operation("tools::arguments")
    })
}
