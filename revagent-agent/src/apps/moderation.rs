//! Review moderation: three checks aggregated into PASS/FAIL

use crate::agent::{Agent, AgentConfig};
use crate::prompts;
use crate::tools::ModerationTools;
use revagent_core::{
    AnalysisRecord, AnalysisRequest, Extraction, ExtractionMode, LlmProvider, ModerationResult, ReviewSession,
};
use revagent_error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Product the reviews are written for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub category: String,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

impl Default for ProductInfo {
    fn default() -> Self {
        Self::new("프리미엄 무선 이어폰", "전자기기")
    }
}

pub struct ReviewModerator<'a, P> {
    provider: &'a P,
    config: AgentConfig,
    product: ProductInfo,
}

impl<'a, P: LlmProvider> ReviewModerator<'a, P> {
    pub fn new(provider: &'a P, config: AgentConfig, product: ProductInfo) -> Self {
        Self {
            provider,
            config,
            product,
        }
    }

    pub fn product(&self) -> &ProductInfo {
        &self.product
    }

    fn request(&self, content: &str, rating: u8, image_path: Option<&Path>) -> AnalysisRequest {
        let request = AnalysisRequest::new(content)
            .with_meta("rating", rating)
            .with_meta("product", &self.product.name)
            .with_meta("category", &self.product.category);
        match image_path {
            Some(path) => request.with_image(path),
            None => request,
        }
    }

    /// Run the checks and return the verdict with its overall fields recomputed
    pub async fn moderate(&self, content: &str, rating: u8, image_path: Option<&Path>) -> Extraction<ModerationResult> {
        let request = self.request(content, rating, image_path);
        let tools = ModerationTools::new(&self.config);
        let mut agent = Agent::new(self.provider, prompts::MODERATOR_SYSTEM, &tools, self.config.clone());

        match agent
            .invoke::<ModerationResult>(prompts::MODERATOR_TEMPLATE, &request, ExtractionMode::StructuredPass)
            .await
        {
            Extraction::Parsed { mut value, raw_response } => {
                if let Some(reported) = value.reconcile() {
                    tracing::warn!(
                        reported = ?reported.status,
                        reported_failed = ?reported.failed_checks,
                        computed = ?value.overall_status,
                        computed_failed = ?value.failed_checks,
                        "model verdict disagrees with its checks, using the aggregate"
                    );
                }
                Extraction::Parsed { value, raw_response }
            }
            failed => failed,
        }
    }

    pub async fn moderate_review(
        &self,
        session: &mut ReviewSession,
        id: u64,
    ) -> Result<AnalysisRecord<ModerationResult>> {
        let review = session.review(id)?;
        let content = review.content.clone();
        let rating = review.rating;
        let image_path = review.image_path.clone();

        let extraction = self.moderate(&content, rating, image_path.as_deref()).await;
        let record = AnalysisRecord::from_extraction(extraction, content);
        session.store_moderation(id, record.clone())?;
        tracing::info!(
            review_id = id,
            status = ?record.payload.overall_status,
            fallback = record.is_fallback(),
            "moderation stored"
        );
        Ok(record)
    }
}
