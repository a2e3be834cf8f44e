//! Coercing model output into typed results

use crate::error::{Error, ErrorKind, Result};
use crate::schema::ResultSchema;

/// How the final answer of an invocation becomes a schema value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Parse the final text as JSON
    #[default]
    Direct,
    /// Ask again with a forced tool whose parameters are the schema
    StructuredPass,
}

/// Why an invocation produced no usable value
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationError {
    pub kind: ErrorKind,
    pub message: String,
    /// Final agent text when one was produced
    pub raw_response: Option<String>,
}

impl InvocationError {
    pub fn from_error(err: &Error, raw_response: Option<String>) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
            raw_response,
        }
    }
}

impl std::fmt::Display for InvocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of a structured invocation. Never an `Err`.
#[derive(Debug, Clone)]
pub enum Extraction<S> {
    Parsed { value: S, raw_response: String },
    Failed(InvocationError),
}

impl<S> Extraction<S> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Extraction::Parsed { .. })
    }

    pub fn value(&self) -> Option<&S> {
        match self {
            Extraction::Parsed { value, .. } => Some(value),
            Extraction::Failed(_) => None,
        }
    }

    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Extraction::Parsed { raw_response, .. } => Some(raw_response),
            Extraction::Failed(err) => err.raw_response.as_deref(),
        }
    }
}

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string (```json)
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Find the first balanced `{...}` object in `text`, skipping braces inside strings
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode<S: ResultSchema>(json: &str) -> std::result::Result<S, serde_json::Error> {
    serde_json::from_str(json)
}

fn classify(schema: &'static str, err: serde_json::Error) -> Error {
    match err.classify() {
        serde_json::error::Category::Data => Error::schema_mismatch(schema, err.to_string()),
        _ => Error::parse_failed(err.to_string()).with_context("schema", schema),
    }
}

/// Parse free-form model text as `S`.
///
/// Code fences and prose around the JSON object are ignored. Text that holds no
/// JSON is `ParseFailed`; JSON of the wrong shape or with values out of range
/// is `SchemaMismatch`.
pub fn parse_structured<S: ResultSchema>(text: &str) -> Result<S> {
    let body = strip_code_fences(text);
    let decoded = match decode::<S>(body) {
        Ok(value) => Ok(value),
        Err(first) => match find_json_object(body) {
            Some(object) if object.len() != body.len() => {
                decode::<S>(object).map_err(|e| classify(S::NAME, e))
            }
            _ if body.contains('{') => Err(classify(S::NAME, first)),
            _ => Err(Error::parse_failed("no JSON object in response").with_context("schema", S::NAME)),
        },
    };

    let value = decoded.map_err(|e| e.with_operation("extract::parse_structured"))?;
    value.validate()?;
    Ok(value)
}

/// Parse tool-call arguments produced by a forced structured pass
pub fn parse_arguments<S: ResultSchema>(arguments: &str) -> Result<S> {
    let value: S = serde_json::from_str(arguments)
        .map_err(|e| classify(S::NAME, e).with_operation("extract::parse_arguments"))?;
    value.validate()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeywordAnalysis, SentimentLabel, SentimentResult};

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_find_json_object_skips_string_braces() {
        let text = r#"결과입니다: {"reason": "괄호 } 포함", "n": {"x": 1}} 끝"#;
        assert_eq!(
            find_json_object(text),
            Some(r#"{"reason": "괄호 } 포함", "n": {"x": 1}}"#)
        );
        assert_eq!(find_json_object("no json here"), None);
        assert_eq!(find_json_object("{ unterminated"), None);
    }

    #[test]
    fn test_parse_with_prose_and_fences() {
        let text = "분석 결과는 다음과 같습니다.\n```json\n{\"sentiment\": \"negative\", \"score\": -0.6, \"confidence\": 0.8, \"reason\": \"귀가 아프다는 불만\"}\n```";
        let value: SentimentResult = parse_structured(text).unwrap();
        assert_eq!(value.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_parse_failures_are_classified() {
        let err = parse_structured::<SentimentResult>("I cannot help with that.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);

        let err = parse_structured::<SentimentResult>(
            r#"{"sentiment": "mixed", "score": 0.0, "confidence": 0.5, "reason": "x"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

        let err = parse_structured::<SentimentResult>(
            r#"{"sentiment": "positive", "score": 3.0, "confidence": 0.5, "reason": "x"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_parse_arguments() {
        let analysis: KeywordAnalysis = parse_arguments(
            r#"{"matched_keywords":[{"keyword":"배송","match_type":"exact","original_phrase":"빠른 배송 감사합니다"}]}"#,
        )
        .unwrap();
        assert_eq!(analysis.keywords(), vec!["배송"]);

        let err = parse_arguments::<KeywordAnalysis>("{\"matched\": 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
    }

    #[test]
    fn test_extraction_accessors() {
        let failed: Extraction<SentimentResult> = Extraction::Failed(InvocationError {
            kind: ErrorKind::RateLimited,
            message: "Rate limited".into(),
            raw_response: None,
        });
        assert!(!failed.is_parsed());
        assert!(failed.value().is_none());
        assert!(failed.raw_response().is_none());
    }
}
