//! Moderation checks and their aggregation
//!
//! A review passes moderation only when none of its checks failed. Skipped
//! checks never cause a failure.

use crate::error::{Error, Result};
use crate::record::FALLBACK_CONFIDENCE;
use crate::schema::{check_non_empty, check_range, ResultSchema};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Check names in declaration order
pub const PROFANITY_CHECK: &str = "profanity_check";
pub const RATING_CONSISTENCY: &str = "rating_consistency";
pub const IMAGE_MATCH: &str = "image_match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skip => "SKIP",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Pass => write!(f, "PASS"),
            OverallStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// One sub-verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckResult {
    /// 검사 상태
    pub status: CheckStatus,
    /// 구체적인 판단 근거 (필수)
    pub reason: String,
    /// 신뢰도 (0.0-1.0)
    pub confidence: f64,
}

impl CheckResult {
    pub fn new(status: CheckStatus, reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            status,
            reason: reason.into(),
            confidence,
        }
    }

    /// A check that did not apply; always fully confident
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::new(CheckStatus::Skip, reason, 1.0)
    }
}

/// Result of folding a list of checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallResult {
    pub status: OverallStatus,
    pub failed_checks: Vec<String>,
}

/// Fold named checks into one verdict.
///
/// FAIL if any check failed, with the failing names in input order.
pub fn aggregate<'a, I>(checks: I) -> OverallResult
where
    I: IntoIterator<Item = (&'a str, &'a CheckResult)>,
{
    let failed_checks: Vec<String> = checks
        .into_iter()
        .filter(|(_, check)| check.status == CheckStatus::Fail)
        .map(|(name, _)| name.to_string())
        .collect();

    let status = if failed_checks.is_empty() {
        OverallStatus::Pass
    } else {
        OverallStatus::Fail
    };

    OverallResult {
        status,
        failed_checks,
    }
}

/// Moderation verdict for a single review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModerationResult {
    /// 욕설/비속어 검사 결과
    pub profanity_check: CheckResult,
    /// 평점-내용 일치성 검사 결과
    pub rating_consistency: CheckResult,
    /// 이미지-내용 일치성 검사 결과
    pub image_match: CheckResult,
    /// 전체 검수 통과 여부
    pub overall_status: OverallStatus,
    /// 실패한 검사 항목 리스트
    pub failed_checks: Vec<String>,
}

impl ModerationResult {
    /// Build a result whose overall fields come from `aggregate`
    pub fn from_checks(profanity_check: CheckResult, rating_consistency: CheckResult, image_match: CheckResult) -> Self {
        let mut result = Self {
            profanity_check,
            rating_consistency,
            image_match,
            overall_status: OverallStatus::Pass,
            failed_checks: Vec::new(),
        };
        result.reconcile();
        result
    }

    pub fn checks(&self) -> [(&'static str, &CheckResult); 3] {
        [
            (PROFANITY_CHECK, &self.profanity_check),
            (RATING_CONSISTENCY, &self.rating_consistency),
            (IMAGE_MATCH, &self.image_match),
        ]
    }

    pub fn overall(&self) -> OverallResult {
        aggregate(self.checks())
    }

    /// Replace the reported overall fields with the aggregate.
    ///
    /// Returns the fields the model reported when they disagreed.
    pub fn reconcile(&mut self) -> Option<OverallResult> {
        let computed = self.overall();
        let reported = OverallResult {
            status: self.overall_status,
            failed_checks: std::mem::take(&mut self.failed_checks),
        };
        self.overall_status = computed.status;
        self.failed_checks = computed.failed_checks.clone();

        if reported == computed {
            None
        } else {
            Some(reported)
        }
    }
}

impl ResultSchema for ModerationResult {
    const NAME: &'static str = "review_moderation_result";
    const DESCRIPTION: &'static str = "모델의 종합적인 리뷰 검수 결과를 구조화합니다.";

    fn validate(&self) -> Result<()> {
        for (name, check) in self.checks() {
            check_range(Self::NAME, &format!("{}.confidence", name), check.confidence, 0.0, 1.0)?;
            check_non_empty(Self::NAME, &format!("{}.reason", name), &check.reason)?;
            if check.status == CheckStatus::Skip && check.confidence != 1.0 {
                return Err(Error::schema_mismatch(
                    Self::NAME,
                    format!("{} is SKIP but has confidence {}", name, check.confidence),
                )
                .with_context("field", format!("{}.confidence", name)));
            }
        }
        Ok(())
    }

    /// Unverifiable reviews do not pass
    fn fallback(reason: &str) -> Self {
        let failed = |check: &str| {
            CheckResult::new(
                CheckStatus::Fail,
                format!("{} 결과를 확인할 수 없습니다: {}", check, reason),
                FALLBACK_CONFIDENCE,
            )
        };
        Self::from_checks(failed(PROFANITY_CHECK), failed(RATING_CONSISTENCY), failed(IMAGE_MATCH))
    }

    /// Weakest of the three checks
    fn confidence(&self) -> Option<f64> {
        self.checks()
            .iter()
            .map(|(_, c)| c.confidence)
            .reduce(f64::min)
    }
}
