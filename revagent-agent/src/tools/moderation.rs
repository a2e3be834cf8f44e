//! Review check tools, each answered by a nested tool-less agent

use super::{arguments, NoTools, ToolHandler};
use crate::agent::{Agent, AgentConfig};
use crate::prompts;
use revagent_core::{load_image, LlmProvider, ToolCall, ToolDefinition};
use revagent_error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const CHECK_PROFANITY: &str = "check_profanity";
pub const CHECK_RATING_CONSISTENCY: &str = "check_rating_consistency";
pub const CHECK_IMAGE_PRODUCT_MATCH: &str = "check_image_product_match";

#[derive(Debug, Deserialize)]
struct ProfanityArgs {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RatingArgs {
    rating: i64,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ImageMatchArgs {
    #[serde(default)]
    image_path: String,
    #[serde(default)]
    product_data: serde_json::Value,
}

/// The three moderation checks
pub struct ModerationTools {
    config: AgentConfig,
}

impl ModerationTools {
    /// `config` is the moderator's own; checks run on its tool model
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            config: config.for_tools(),
        }
    }

    async fn check_profanity<P: LlmProvider>(&self, provider: &P, args: ProfanityArgs) -> Result<String> {
        let mut agent = Agent::new(provider, prompts::PROFANITY_SYSTEM, &NoTools, self.config.clone());
        let answer = agent.ask(&prompts::profanity_request(&args.content)).await?;
        Ok(answer.content)
    }

    async fn check_rating<P: LlmProvider>(&self, provider: &P, args: RatingArgs) -> Result<String> {
        let mut agent = Agent::new(provider, prompts::RATING_CONSISTENCY_SYSTEM, &NoTools, self.config.clone());
        let answer = agent.ask(&prompts::rating_request(args.rating, &args.content)).await?;
        Ok(answer.content)
    }

    async fn check_image<P: LlmProvider>(&self, provider: &P, args: ImageMatchArgs) -> String {
        let path = args.image_path.trim();
        if path.is_empty() || !Path::new(path).exists() {
            return serde_json::json!({
                "status": "SKIP",
                "reason": "업로드된 이미지가 없습니다.",
                "confidence": 1.0
            })
            .to_string();
        }

        let outcome = async {
            let image = load_image(path)?;
            let mut agent = Agent::new(provider, prompts::IMAGE_MATCH_SYSTEM, &NoTools, self.config.clone());
            let prompt = prompts::image_match_request(path, &args.product_data);
            agent.ask_with_images(&prompt, vec![image]).await
        }
        .await;

        match outcome {
            Ok(answer) => answer.content,
            Err(e) => {
                tracing::warn!(image = %path, error = %e, "image check failed");
                serde_json::json!({
                    "status": "ERROR",
                    "reason": e.message(),
                    "confidence": 1.0
                })
                .to_string()
            }
        }
    }
}

impl ToolHandler for ModerationTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(CHECK_PROFANITY, "리뷰 내용의 선정적/욕설 표현을 검수합니다.").with_parameters(
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "content": { "type": "string", "description": "검사할 리뷰 내용" }
                    },
                    "required": ["content"]
                }),
            ),
            ToolDefinition::new(CHECK_RATING_CONSISTENCY, "별점과 리뷰 내용의 일치성을 분석합니다.")
                .with_parameters(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "rating": { "type": "integer", "description": "별점 (1-5)" },
                        "content": { "type": "string", "description": "리뷰 내용" }
                    },
                    "required": ["rating", "content"]
                })),
            ToolDefinition::new(
                CHECK_IMAGE_PRODUCT_MATCH,
                "리뷰에 업로드된 이미지와 실제 제품의 관련성을 검증합니다.",
            )
            .with_parameters(serde_json::json!({
                "type": "object",
                "properties": {
                    "image_path": { "type": "string", "description": "업로드된 이미지 경로" },
                    "product_data": { "type": "object", "description": "제품 정보" }
                },
                "required": ["image_path", "product_data"]
            })),
        ]
    }

    async fn call<P: LlmProvider>(&self, provider: &P, call: &ToolCall) -> Result<String> {
        match call.name.as_str() {
            CHECK_PROFANITY => self.check_profanity(provider, arguments(call)?).await,
            CHECK_RATING_CONSISTENCY => self.check_rating(provider, arguments(call)?).await,
            CHECK_IMAGE_PRODUCT_MATCH => Ok(self.check_image(provider, arguments(call)?).await),
            other => Err(Error::tool_unknown(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tool_call, ScriptedProvider};
    use tempfile::TempDir;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[tokio::test]
    async fn test_profanity_runs_nested_agent() {
        let provider = ScriptedProvider::new().then_text(r#"{"is_appropriate": true, "confidence": 0.95}"#);
        let config = AgentConfig::default().with_model("haiku").with_tool_model("sonnet");
        let tools = ModerationTools::new(&config);

        let out = tools
            .call(&provider, &tool_call("1", CHECK_PROFANITY, r#"{"content":"음질이 좋아요"}"#))
            .await
            .unwrap();
        assert!(out.contains("is_appropriate"));

        let request = &provider.requests()[0];
        assert_eq!(request.model.as_deref(), Some("sonnet"));
        assert!(request.tools.is_none());
        assert_eq!(request.messages[0].content.as_deref(), Some(prompts::PROFANITY_SYSTEM));
        assert!(request.messages[1]
            .content
            .as_deref()
            .unwrap()
            .ends_with("<review_content>음질이 좋아요</review_content>"));
    }

    #[tokio::test]
    async fn test_rating_arguments() {
        let provider = ScriptedProvider::new().then_text(r#"{"is_consistent": false}"#);
        let tools = ModerationTools::new(&AgentConfig::default());
        let out = tools
            .call(&provider, &tool_call("1", CHECK_RATING_CONSISTENCY, r#"{"rating":1,"content":"최고예요"}"#))
            .await
            .unwrap();
        assert_eq!(out, r#"{"is_consistent": false}"#);
        assert!(provider.requests()[0].messages[1].content.as_deref().unwrap().contains("<rating>1</rating>"));
    }

    #[tokio::test]
    async fn test_image_skip_without_file() {
        let provider = ScriptedProvider::new();
        let tools = ModerationTools::new(&AgentConfig::default());
        for path in ["", "/definitely/not/here.png"] {
            let args = serde_json::json!({ "image_path": path, "product_data": {} }).to_string();
            let out = tools
                .call(&provider, &tool_call("1", CHECK_IMAGE_PRODUCT_MATCH, &args))
                .await
                .unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(value["status"], "SKIP");
            assert_eq!(value["reason"], "업로드된 이미지가 없습니다.");
            assert_eq!(value["confidence"], 1.0);
        }
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_image_sent_with_product() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("review.png");
        std::fs::write(&path, PNG).unwrap();

        let provider = ScriptedProvider::new().then_text(r#"{"is_related": true}"#);
        let tools = ModerationTools::new(&AgentConfig::default());
        let args = serde_json::json!({
            "image_path": path.display().to_string(),
            "product_data": { "name": "프리미엄 무선 이어폰", "category": "전자기기" }
        })
        .to_string();
        let out = tools
            .call(&provider, &tool_call("1", CHECK_IMAGE_PRODUCT_MATCH, &args))
            .await
            .unwrap();
        assert_eq!(out, r#"{"is_related": true}"#);

        let message = &provider.requests()[0].messages[1];
        assert_eq!(message.images.len(), 1);
        assert!(message.content.as_deref().unwrap().contains("프리미엄 무선 이어폰"));
    }

    #[tokio::test]
    async fn test_image_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("review.png");
        std::fs::write(&path, PNG).unwrap();

        let provider = ScriptedProvider::new();
        let tools = ModerationTools::new(&AgentConfig::default());
        let args = serde_json::json!({ "image_path": path.display().to_string(), "product_data": {} }).to_string();
        let out = tools
            .call(&provider, &tool_call("1", CHECK_IMAGE_PRODUCT_MATCH, &args))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "ERROR");
        assert_eq!(value["confidence"], 1.0);
    }
}
