//! Agent implementation - orchestrates the model <-> tool loop

use crate::tools::ToolHandler;
use revagent_core::extract::{parse_arguments, parse_structured};
use revagent_core::{
    AnalysisRequest, ChatMessage, CompletionRequest, Extraction, ExtractionMode, ImageData,
    InvocationError, LlmProvider, ResultSchema, ToolCall, ToolChoice, ToolDefinition, UsageTracker,
};
use revagent_error::{Error, ErrorKind, Result};

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model for the main conversation; provider default when unset
    pub model: Option<String>,
    /// Model for nested tool agents; falls back to `model`
    pub tool_model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    /// Tool rounds allowed before the invocation fails
    pub max_tool_rounds: usize,
    /// Print tool calls as they happen
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: None,
            tool_model: None,
            temperature: None,
            max_tokens: Some(4096),
            max_tool_rounds: 8,
            verbose: false,
        }
    }
}

impl AgentConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_tool_model(mut self, model: impl Into<String>) -> Self {
        self.tool_model = Some(model.into());
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Configuration for an agent nested inside a tool
    pub fn for_tools(&self) -> Self {
        Self {
            model: self.tool_model.clone().or_else(|| self.model.clone()),
            ..self.clone()
        }
    }
}

/// Final answer of a conversation turn
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub content: String,
    /// Tool rounds resolved before the answer
    pub tool_rounds: usize,
}

/// The agent - manages the model <-> tool loop
pub struct Agent<'a, P, H> {
    provider: &'a P,
    tools: &'a H,
    system_prompt: String,
    config: AgentConfig,
    usage: UsageTracker,
}

impl<'a, P: LlmProvider, H: ToolHandler> Agent<'a, P, H> {
    pub fn new(provider: &'a P, system_prompt: impl Into<String>, tools: &'a H, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            config,
            usage: UsageTracker::new(),
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn model(&self) -> &str {
        self.config.model.as_deref().unwrap_or(self.provider.default_model())
    }

    fn request(&self, history: &[ChatMessage], tools: Vec<ToolDefinition>) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !self.system_prompt.is_empty() {
            messages.push(ChatMessage::system(self.system_prompt.as_str()));
        }
        messages.extend(history.iter().cloned());

        let mut request = CompletionRequest::new(messages)
            .with_model(self.model())
            .with_tools(tools);
        request.temperature = self.config.temperature;
        request.max_tokens = self.config.max_tokens;
        request
    }

    /// Run the conversation until the model answers without tool calls.
    ///
    /// Assistant and tool messages are appended to `history`.
    pub async fn run(&mut self, history: &mut Vec<ChatMessage>) -> Result<AgentResponse> {
        let definitions = self.tools.definitions();

        for round in 0..=self.config.max_tool_rounds {
            let request = self.request(history, definitions.clone());
            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| e.into_error(self.provider.name()).with_context("round", round.to_string()))?;
            self.usage.track(&response.model, &response.usage);

            if response.tool_calls.is_empty() {
                let content = response.content.unwrap_or_default();
                tracing::debug!(round, chars = content.len(), "final answer");
                history.push(ChatMessage::assistant(content.as_str()));
                if content.trim().is_empty() {
                    return Err(Error::inference_failed("model returned an empty answer")
                        .with_operation("agent::run"));
                }
                return Ok(AgentResponse {
                    content,
                    tool_rounds: round,
                });
            }

            if round == self.config.max_tool_rounds {
                break;
            }

            history.push(ChatMessage::assistant_tool_calls(response.content, response.tool_calls.clone()));
            for call in &response.tool_calls {
                let output = self.call_tool(call).await;
                history.push(ChatMessage::tool_result(call.id.as_str(), output));
            }
        }

        Err(Error::tool_limit_exceeded(self.config.max_tool_rounds).with_operation("agent::run"))
    }

    async fn call_tool(&self, call: &ToolCall) -> String {
        if self.config.verbose {
            println!("   Tool: {}({})", call.name, truncate(&call.arguments, 80));
        }
        tracing::debug!(tool = %call.name, arguments = %call.arguments, "tool call");

        match self.tools.call(self.provider, call).await {
            Ok(output) => {
                tracing::debug!(tool = %call.name, output = %truncate(&output, 200), "tool result");
                output
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "tool failed");
                format!("Error: {}", e.message())
            }
        }
    }

    /// Single user turn on a fresh conversation
    pub async fn ask(&mut self, prompt: &str) -> Result<AgentResponse> {
        let mut history = vec![ChatMessage::user(prompt)];
        self.run(&mut history).await
    }

    /// Single user turn with image attachments
    pub async fn ask_with_images(&mut self, prompt: &str, images: Vec<ImageData>) -> Result<AgentResponse> {
        let mut message = ChatMessage::user(prompt);
        for image in images {
            message = message.with_image(image);
        }
        let mut history = vec![message];
        self.run(&mut history).await
    }

    /// Send `task_instruction` rendered with `subject` and coerce the answer to `S`.
    ///
    /// Never fails: every problem comes back as `Extraction::Failed`.
    pub async fn invoke<S: ResultSchema>(
        &mut self,
        task_instruction: &str,
        subject: &AnalysisRequest,
        mode: ExtractionMode,
    ) -> Extraction<S> {
        if task_instruction.trim().is_empty() {
            return Extraction::Failed(InvocationError {
                kind: ErrorKind::InvalidArgument,
                message: "task instruction must not be empty".into(),
                raw_response: None,
            });
        }

        let model = self.model().to_string();
        tracing::info!(schema = S::NAME, model = %model, ?mode, chars = subject.content.len(), "invocation started");

        let mut history = vec![ChatMessage::user(subject.render(task_instruction))];
        let answer = match self.run(&mut history).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(schema = S::NAME, error = %e, "invocation failed");
                return Extraction::Failed(InvocationError::from_error(&e, None));
            }
        };
        tracing::debug!(schema = S::NAME, raw = %answer.content, "raw answer");

        let parsed = match mode {
            ExtractionMode::Direct => parse_structured::<S>(&answer.content),
            ExtractionMode::StructuredPass => match self.structured_pass::<S>(&mut history).await {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::debug!(schema = S::NAME, error = %e, "structured pass unusable, parsing answer text");
                    parse_structured::<S>(&answer.content).map_err(|_| e)
                }
            },
        };

        match parsed {
            Ok(value) => {
                tracing::info!(schema = S::NAME, tool_rounds = answer.tool_rounds, "invocation finished");
                Extraction::Parsed {
                    value,
                    raw_response: answer.content,
                }
            }
            Err(e) => Extraction::Failed(InvocationError::from_error(&e, Some(answer.content))),
        }
    }

    /// Second call forcing a tool whose parameters are the schema
    async fn structured_pass<S: ResultSchema>(&mut self, history: &mut Vec<ChatMessage>) -> Result<S> {
        history.push(ChatMessage::user(S::DESCRIPTION));

        let mut tools = self.tools.definitions();
        tools.push(ToolDefinition::new(S::NAME, S::DESCRIPTION).with_parameters(S::parameters_schema()));
        let request = self
            .request(history, tools)
            .with_tool_choice(ToolChoice::Function { name: S::NAME.to_string() });

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| e.into_error(self.provider.name()).with_operation("agent::structured_pass"))?;
        self.usage.track(&response.model, &response.usage);

        let call = response
            .tool_calls
            .iter()
            .find(|c| c.name == S::NAME)
            .ok_or_else(|| {
                Error::parse_failed("structured pass returned no result tool call")
                    .with_operation("agent::structured_pass")
                    .with_context("schema", S::NAME)
            })?;
        parse_arguments::<S>(&call.arguments)
    }
}

/// Truncate a string to at most `max` characters, adding "..." when cut
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}
