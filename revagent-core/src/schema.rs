//! Typed result schemas
//!
//! Every analysis produces one of these records. Labels come from closed sets:
//! an unknown label fails deserialization instead of being coerced.

use crate::error::{Error, Result};
use crate::record::FALLBACK_CONFIDENCE;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record the model is asked to produce
pub trait ResultSchema: Serialize + DeserializeOwned + JsonSchema + Clone + Send + Sync {
    /// Tool name used when the result is requested through a forced tool call
    const NAME: &'static str;
    /// Instruction attached to that tool
    const DESCRIPTION: &'static str;

    /// JSON schema of the record with every subschema inlined
    fn parameters_schema() -> serde_json::Value {
        let generator = SchemaSettings::draft07()
            .with(|s| {
                s.inline_subschemas = true;
                s.meta_schema = None;
            })
            .into_generator();
        let root = generator.into_root_schema_for::<Self>();
        serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
    }

    /// Check ranges and required text beyond what the type enforces
    fn validate(&self) -> Result<()>;

    /// Best-effort value used when extraction fails
    fn fallback(reason: &str) -> Self;

    /// Overall confidence, if the schema carries one
    fn confidence(&self) -> Option<f64>;
}

/// `value` must be a finite number inside `[lo, hi]`
pub(crate) fn check_range(schema: &'static str, field: &str, value: f64, lo: f64, hi: f64) -> Result<()> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(())
    } else {
        Err(Error::schema_mismatch(
            schema,
            format!("{} must be within [{}, {}], got {}", field, lo, hi, value),
        )
        .with_context("field", field.to_string()))
    }
}

pub(crate) fn check_non_empty(schema: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::schema_mismatch(schema, format!("{} must not be empty", field))
            .with_context("field", field.to_string()))
    } else {
        Ok(())
    }
}

// ============================================================================
// Sentiment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sentiment of a single review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SentimentResult {
    /// positive, negative or neutral
    pub sentiment: SentimentLabel,
    /// -1.0 (very negative) to 1.0 (very positive)
    pub score: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// Short rationale for the label
    pub reason: String,
}

impl ResultSchema for SentimentResult {
    const NAME: &'static str = "sentiment_result";
    const DESCRIPTION: &'static str = "리뷰 감정 분석 결과를 구조화된 형태로 반환합니다.";

    fn validate(&self) -> Result<()> {
        check_range(Self::NAME, "score", self.score, -1.0, 1.0)?;
        check_range(Self::NAME, "confidence", self.confidence, 0.0, 1.0)?;
        check_non_empty(Self::NAME, "reason", &self.reason)
    }

    fn fallback(reason: &str) -> Self {
        Self {
            sentiment: SentimentLabel::Neutral,
            score: 0.0,
            confidence: FALLBACK_CONFIDENCE,
            reason: format!("분석 결과를 해석하지 못했습니다: {}", reason),
        }
    }

    fn confidence(&self) -> Option<f64> {
        Some(self.confidence)
    }
}

// ============================================================================
// Keyword matches
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Partial,
    Semantic,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
            MatchType::Semantic => "semantic",
        }
    }
}

/// One registered keyword found in a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordMatch {
    /// 기준 키워드
    pub keyword: String,
    pub match_type: MatchType,
    /// 리뷰에서 발견된 원본 구문
    pub original_phrase: String,
}

/// Keyword analysis of a single review
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct KeywordAnalysis {
    pub matched_keywords: Vec<KeywordMatch>,
}

impl KeywordAnalysis {
    /// Matched keywords in answer order, deduplicated
    pub fn keywords(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for m in &self.matched_keywords {
            if !out.contains(&m.keyword.as_str()) {
                out.push(&m.keyword);
            }
        }
        out
    }

    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.matched_keywords.iter().any(|m| m.keyword == keyword)
    }
}

impl ResultSchema for KeywordAnalysis {
    const NAME: &'static str = "keyword_analysis";
    const DESCRIPTION: &'static str = "키워드 분석 결과를 구조화된 형태로 추출하시오";

    fn validate(&self) -> Result<()> {
        for m in &self.matched_keywords {
            check_non_empty(Self::NAME, "keyword", &m.keyword)?;
        }
        Ok(())
    }

    fn fallback(_reason: &str) -> Self {
        Self::default()
    }

    fn confidence(&self) -> Option<f64> {
        None
    }
}
