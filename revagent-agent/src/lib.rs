//! # revagent agent
//!
//! The agent sends a conversation to a hosted model and resolves the tool calls
//! it asks for until a final answer arrives:
//! 1. System prompt plus the rendered user turn go to the provider
//! 2. Each requested tool runs in order and its output becomes a tool message
//! 3. The loop ends on an answer without tool calls, or at the round limit
//! 4. `invoke` then coerces the answer into a typed result
//!
//! The apps (sentiment, keywords, moderation, recipe chat) are prompts plus
//! tool sets on top of this loop.

pub mod agent;
pub mod apps;
pub mod prompts;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{Agent, AgentConfig, AgentResponse};
pub use apps::keywords::KeywordExtractor;
pub use apps::moderation::{ProductInfo, ReviewModerator};
pub use apps::recipe::RecipeBot;
pub use apps::sentiment::SentimentAnalyzer;
pub use tools::{NoTools, ToolHandler};
