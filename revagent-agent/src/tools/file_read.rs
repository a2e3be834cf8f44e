//! `file_read` tool restricted to an allow-list

use super::{arguments, ToolHandler};
use revagent_core::{LlmProvider, ToolCall, ToolDefinition};
use revagent_error::{Error, ErrorKind, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ReadArgs {
    path: String,
}

pub struct FileReadTool {
    allowed: Vec<PathBuf>,
}

impl FileReadTool {
    pub fn new(allowed: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    fn is_allowed(&self, requested: &Path) -> bool {
        let canonical = requested.canonicalize().ok();
        self.allowed.iter().any(|allowed| {
            allowed == requested
                || match (&canonical, allowed.canonicalize()) {
                    (Some(a), Ok(b)) => *a == b,
                    _ => false,
                }
        })
    }

    pub fn read(&self, path: &str) -> Result<String> {
        let requested = Path::new(path.trim());
        if !self.is_allowed(requested) {
            return Err(Error::new(ErrorKind::PermissionDenied, format!("reading '{}' is not allowed", path))
                .with_operation("tools::file_read")
                .with_context("path", path));
        }

        std::fs::read_to_string(requested).map_err(|e| {
            Error::from(e)
                .with_operation("tools::file_read")
                .with_context("path", path)
        })
    }
}

impl ToolHandler for FileReadTool {
    fn definitions(&self) -> Vec<ToolDefinition> {
        let files: Vec<String> = self.allowed.iter().map(|p| p.display().to_string()).collect();
        vec![ToolDefinition::new(
            "file_read",
            format!("Read a UTF-8 text file. Readable files: {}", files.join(", ")),
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Path of the file to read" }
            },
            "required": ["path"]
        }))]
    }

    async fn call<P: LlmProvider>(&self, _provider: &P, call: &ToolCall) -> Result<String> {
        match call.name.as_str() {
            "file_read" => {
                let args: ReadArgs = arguments(call)?;
                self.read(&args.path)
            }
            other => Err(Error::tool_unknown(other)),
        }
    }
}
