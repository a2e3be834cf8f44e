//! Stored analysis records
//!
//! A record is written whole when an analysis finishes and replaced whole when
//! the review is analyzed again.

use crate::extract::Extraction;
use crate::schema::ResultSchema;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Confidence assigned to fallback payloads
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Parsed,
    Fallback { error_kind: String, error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord<S> {
    pub payload: S,
    pub created_at: DateTime<Local>,
    /// Review content at analysis time
    pub review_text: String,
    /// Final agent text, kept for display
    pub raw_response: String,
    pub outcome: RecordOutcome,
}

impl<S: ResultSchema> AnalysisRecord<S> {
    /// Turn an extraction into a record, substituting the schema fallback on failure
    pub fn from_extraction(extraction: Extraction<S>, review_text: impl Into<String>) -> Self {
        let (payload, raw_response, outcome) = match extraction {
            Extraction::Parsed { value, raw_response } => (value, raw_response, RecordOutcome::Parsed),
            Extraction::Failed(err) => {
                tracing::warn!(
                    schema = S::NAME,
                    kind = %err.kind,
                    error = %err.message,
                    "extraction failed, storing fallback record"
                );
                (
                    S::fallback(&err.message),
                    err.raw_response.unwrap_or_default(),
                    RecordOutcome::Fallback {
                        error_kind: err.kind.as_str().to_string(),
                        error: err.message,
                    },
                )
            }
        };

        Self {
            payload,
            created_at: Local::now(),
            review_text: review_text.into(),
            raw_response,
            outcome,
        }
    }
}

impl<S> AnalysisRecord<S> {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Fallback { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RecordOutcome::Parsed => None,
            RecordOutcome::Fallback { error, .. } => Some(error),
        }
    }

    /// Timestamp in the format shown next to reviews
    pub fn created_at_display(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
