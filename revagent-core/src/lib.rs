//! # revagent core
//!
//! Building blocks shared by the review-analysis apps.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based LLM communication (OpenAI-compatible, Anthropic)
//! - **Schemas**: Typed, validated results (sentiment, keyword matches, moderation)
//! - **Extraction**: Turning a model's final text into a schema value, or a failure value
//! - **Records**: Stored analysis results keyed by review id
//! - **Session**: Reviews plus their analysis records, persisted as JSON
//! - **Registry**: File-backed list of keywords to match reviews against

pub mod error;
pub mod extract;
pub mod highlight;
pub mod image;
pub mod moderation;
pub mod provider;
pub mod record;
pub mod registry;
pub mod request;
pub mod schema;
pub mod session;

pub use error::{Error, ErrorClass, ErrorKind, Result};
pub use extract::{parse_structured, Extraction, ExtractionMode, InvocationError};
pub use highlight::{highlight, phrases_for, Marker};
pub use image::{load_image, save_image, ImageFormat};
pub use moderation::{aggregate, CheckResult, CheckStatus, ModerationResult, OverallResult, OverallStatus};
pub use provider::{
    AnthropicProvider, AnyProvider, ChatMessage, CompletionRequest, CompletionResponse,
    FinishReason, ImageData, LlmProvider, OpenAIProvider, ProviderConfig, ProviderError,
    ProviderType, Role, ToolCall, ToolChoice, ToolDefinition, Usage, UsageTracker,
};
pub use record::{AnalysisRecord, RecordOutcome, FALLBACK_CONFIDENCE};
pub use registry::{KeywordRegistry, Registration};
pub use request::AnalysisRequest;
pub use schema::{KeywordAnalysis, KeywordMatch, MatchType, ResultSchema, SentimentLabel, SentimentResult};
pub use session::{FileStore, MemoryStore, Review, ReviewSession, SessionManager, SessionStore};
