//! In-process provider that replays scripted responses

use revagent_core::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ProviderError, ToolCall, Usage,
};
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

pub(crate) fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

fn response(content: Option<String>, tool_calls: Vec<ToolCall>) -> CompletionResponse {
    let finish_reason = if tool_calls.is_empty() {
        FinishReason::Stop
    } else {
        FinishReason::ToolCalls
    };
    CompletionResponse {
        id: "scripted".into(),
        model: "scripted-model".into(),
        content,
        tool_calls,
        finish_reason,
        usage: Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        },
    }
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn push(self, item: Result<CompletionResponse, ProviderError>) -> Self {
        self.script.lock().unwrap().push_back(item);
        self
    }

    pub(crate) fn then_text(self, text: &str) -> Self {
        self.push(Ok(response(Some(text.to_string()), Vec::new())))
    }

    pub(crate) fn then_tools(self, calls: Vec<ToolCall>) -> Self {
        self.push(Ok(response(None, calls)))
    }

    pub(crate) fn then_error(self, error: ProviderError) -> Self {
        self.push(Err(error))
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn models(&self) -> Vec<String> {
        vec!["scripted-model".into()]
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Other("script exhausted".into())))
    }
}
