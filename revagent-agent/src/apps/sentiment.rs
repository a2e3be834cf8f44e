//! Review sentiment analysis

use crate::agent::{Agent, AgentConfig};
use crate::prompts;
use crate::tools::NoTools;
use revagent_core::{
    AnalysisRecord, AnalysisRequest, Extraction, ExtractionMode, LlmProvider, ReviewSession, SentimentResult,
};
use revagent_error::Result;

pub struct SentimentAnalyzer<'a, P> {
    provider: &'a P,
    config: AgentConfig,
}

impl<'a, P: LlmProvider> SentimentAnalyzer<'a, P> {
    pub fn new(provider: &'a P, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    pub async fn analyze(&self, content: &str) -> Extraction<SentimentResult> {
        let mut agent = Agent::new(self.provider, prompts::SENTIMENT_SYSTEM, &NoTools, self.config.clone());
        agent
            .invoke(prompts::SENTIMENT_TEMPLATE, &AnalysisRequest::new(content), ExtractionMode::Direct)
            .await
    }

    /// Analyze review `id` and store the record, replacing any earlier one
    pub async fn analyze_review(
        &self,
        session: &mut ReviewSession,
        id: u64,
    ) -> Result<AnalysisRecord<SentimentResult>> {
        let content = session.review(id)?.content.clone();
        let record = AnalysisRecord::from_extraction(self.analyze(&content).await, content);
        session.store_sentiment(id, record.clone())?;
        tracing::info!(review_id = id, fallback = record.is_fallback(), "sentiment stored");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use revagent_core::{ErrorKind, SentimentLabel, FALLBACK_CONFIDENCE};

    #[tokio::test]
    async fn test_analyze_review_stores_record() {
        let provider = ScriptedProvider::new().then_text(
            r#"{"sentiment":"negative","score":-0.7,"confidence":0.85,"reason":"배터리 불만"}"#,
        );
        let analyzer = SentimentAnalyzer::new(&provider, AgentConfig::default());
        let mut session = ReviewSession::sample("test");

        let record = analyzer.analyze_review(&mut session, 3).await.unwrap();
        assert_eq!(record.payload.sentiment, SentimentLabel::Negative);
        assert!(!record.is_fallback());
        let stored = session.sentiment(3).unwrap();
        assert_eq!(stored.review_text, session.review(3).unwrap().content);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].content.as_deref(), Some(prompts::SENTIMENT_SYSTEM));
        assert_eq!(request.messages[1].content, Some(session.review(3).unwrap().content.clone()));
    }

    #[tokio::test]
    async fn test_malformed_answer_falls_back() {
        let provider = ScriptedProvider::new().then_text("positive입니다!");
        let analyzer = SentimentAnalyzer::new(&provider, AgentConfig::default());
        let mut session = ReviewSession::sample("test");

        let record = analyzer.analyze_review(&mut session, 1).await.unwrap();
        assert!(record.is_fallback());
        assert_eq!(record.payload.sentiment, SentimentLabel::Neutral);
        assert!(record.payload.confidence <= FALLBACK_CONFIDENCE);
        assert!(!record.payload.reason.is_empty());
        assert_eq!(record.raw_response, "positive입니다!");
    }

    #[tokio::test]
    async fn test_reanalysis_replaces_record() {
        let provider = ScriptedProvider::new()
            .then_text(r#"{"sentiment":"positive","score":0.9,"confidence":0.9,"reason":"첫 분석"}"#)
            .then_text(r#"{"sentiment":"neutral","score":0.1,"confidence":0.6,"reason":"두번째 분석"}"#);
        let analyzer = SentimentAnalyzer::new(&provider, AgentConfig::default());
        let mut session = ReviewSession::sample("test");

        analyzer.analyze_review(&mut session, 2).await.unwrap();
        analyzer.analyze_review(&mut session, 2).await.unwrap();
        let stored = session.sentiment(2).unwrap();
        assert_eq!(stored.payload.reason, "두번째 분석");
        assert!(!stored.raw_response.contains("첫 분석"));
    }

    #[tokio::test]
    async fn test_unknown_review() {
        let provider = ScriptedProvider::new();
        let analyzer = SentimentAnalyzer::new(&provider, AgentConfig::default());
        let mut session = ReviewSession::sample("test");
        let err = analyzer.analyze_review(&mut session, 99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReviewNotFound);
        assert!(provider.requests().is_empty());
    }
}
