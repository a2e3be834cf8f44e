//! Keyword matching against the registered keyword file

use crate::agent::{Agent, AgentConfig};
use crate::prompts;
use crate::tools::FileReadTool;
use revagent_core::{
    AnalysisRecord, AnalysisRequest, Extraction, ExtractionMode, KeywordAnalysis, KeywordRegistry, LlmProvider,
    Registration, ReviewSession,
};
use revagent_error::Result;

pub struct KeywordExtractor<'a, P> {
    provider: &'a P,
    config: AgentConfig,
    registry: KeywordRegistry,
}

impl<'a, P: LlmProvider> KeywordExtractor<'a, P> {
    pub fn new(provider: &'a P, config: AgentConfig, registry: KeywordRegistry) -> Self {
        Self {
            provider,
            config,
            registry,
        }
    }

    pub fn registry(&self) -> &KeywordRegistry {
        &self.registry
    }

    pub fn register(&self, keyword: &str) -> Result<Registration> {
        self.registry.register(keyword)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.registry.list()
    }

    /// Match `content` against the registry; the model reads the file itself
    pub async fn analyze(&self, content: &str) -> Extraction<KeywordAnalysis> {
        let tools = FileReadTool::new([self.registry.path().to_path_buf()]);
        let system = prompts::keyword_system(self.registry.path());
        let mut agent = Agent::new(self.provider, system, &tools, self.config.clone());
        agent
            .invoke(prompts::KEYWORD_TEMPLATE, &AnalysisRequest::new(content), ExtractionMode::StructuredPass)
            .await
    }

    pub async fn analyze_review(
        &self,
        session: &mut ReviewSession,
        id: u64,
    ) -> Result<AnalysisRecord<KeywordAnalysis>> {
        let content = session.review(id)?.content.clone();
        let record = AnalysisRecord::from_extraction(self.analyze(&content).await, content);
        session.store_keywords(id, record.clone())?;
        tracing::info!(
            review_id = id,
            matches = record.payload.matched_keywords.len(),
            fallback = record.is_fallback(),
            "keyword matches stored"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tool_call, ScriptedProvider};
    use revagent_core::{ResultSchema, Role};
    use tempfile::TempDir;

    fn extractor<'a>(provider: &'a ScriptedProvider, dir: &TempDir) -> KeywordExtractor<'a, ScriptedProvider> {
        let registry = KeywordRegistry::new(dir.path().join("registered_keywords.txt"));
        KeywordExtractor::new(provider, AgentConfig::default(), registry)
    }

    #[tokio::test]
    async fn test_model_reads_registry_then_structures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registered_keywords.txt");
        let read_args = serde_json::json!({ "path": path.display().to_string() }).to_string();
        let result_args = r#"{"matched_keywords":[
            {"keyword":"배송","match_type":"exact","original_phrase":"배송도 빠르고"},
            {"keyword":"음질","match_type":"partial","original_phrase":"소리가 정말 깨끗하고"}
        ]}"#;
        let provider = ScriptedProvider::new()
            .then_tools(vec![tool_call("r1", "file_read", &read_args)])
            .then_text("배송, 음질 키워드가 매칭됩니다.")
            .then_tools(vec![tool_call("s1", KeywordAnalysis::NAME, result_args)]);
        let keywords = extractor(&provider, &dir);
        keywords.register("배송").unwrap();
        keywords.register("음질").unwrap();

        let mut session = ReviewSession::sample("test");
        let record = keywords.analyze_review(&mut session, 1).await.unwrap();
        assert_eq!(record.payload.keywords(), vec!["배송", "음질"]);
        assert_eq!(session.reviews_matching_keyword("음질").len(), 1);

        let requests = provider.requests();
        let system = requests[0].messages[0].content.as_deref().unwrap();
        assert!(system.contains(&path.display().to_string()));
        let tool_result = requests[1].messages.iter().find(|m| m.role == Role::Tool).unwrap();
        assert_eq!(tool_result.content.as_deref(), Some("배송\n음질\n"));
    }

    #[tokio::test]
    async fn test_failure_stores_empty_matches() {
        let dir = TempDir::new().unwrap();
        let provider = ScriptedProvider::new().then_text("키워드를 찾지 못했어요").then_text("없음");
        let keywords = extractor(&provider, &dir);

        let mut session = ReviewSession::sample("test");
        let record = keywords.analyze_review(&mut session, 2).await.unwrap();
        assert!(record.is_fallback());
        assert!(record.payload.matched_keywords.is_empty());
        assert_eq!(record.raw_response, "키워드를 찾지 못했어요");
    }

    #[test]
    fn test_register_and_list() {
        let dir = TempDir::new().unwrap();
        let provider = ScriptedProvider::new();
        let keywords = extractor(&provider, &dir);
        assert!(matches!(keywords.register("음질").unwrap(), Registration::Registered { total: 1, .. }));
        assert!(matches!(keywords.register("음질").unwrap(), Registration::AlreadyExists { .. }));
        assert_eq!(keywords.list().unwrap(), vec!["음질"]);
    }
}
