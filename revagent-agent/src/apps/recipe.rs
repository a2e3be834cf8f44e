//! RecipeBot, a multi-turn cooking assistant with web search

use crate::agent::{Agent, AgentConfig};
use crate::prompts;
use crate::tools::WebSearch;
use revagent_core::{ChatMessage, LlmProvider};
use revagent_error::Result;

pub struct RecipeBot<'a, P> {
    provider: &'a P,
    config: AgentConfig,
    search: WebSearch,
    history: Vec<ChatMessage>,
}

impl<'a, P: LlmProvider> RecipeBot<'a, P> {
    pub fn new(provider: &'a P, config: AgentConfig, search: WebSearch) -> Self {
        Self {
            provider,
            config,
            search,
            history: Vec::new(),
        }
    }

    /// User turns and final answers so far
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// One conversation turn. A failed turn leaves the history unchanged.
    pub async fn ask(&mut self, input: &str) -> Result<String> {
        let mut turn = self.history.clone();
        turn.push(ChatMessage::user(input));

        let mut agent = Agent::new(self.provider, prompts::RECIPE_SYSTEM, &self.search, self.config.clone());
        let answer = agent.run(&mut turn).await?;
        tracing::debug!(tool_rounds = answer.tool_rounds, tokens = agent.usage().total_tokens(), "recipe turn");

        self.history.push(ChatMessage::user(input));
        self.history.push(ChatMessage::assistant(answer.content.as_str()));
        Ok(answer.content)
    }
}
