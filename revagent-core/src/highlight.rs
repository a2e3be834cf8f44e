//! Phrase highlighting for keyword matches
//!
//! Phrases are applied one after another. Each pass only searches review text,
//! never marker markup inserted by an earlier pass, so a later phrase that
//! would cross an existing marker is left unmarked.

use crate::schema::KeywordAnalysis;

/// Opening and closing markup wrapped around a matched phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub open: String,
    pub close: String,
}

impl Marker {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// ANSI reverse video, for terminal output
    pub fn ansi() -> Self {
        Self::new("\x1b[7m", "\x1b[0m")
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new("<mark>", "</mark>")
    }
}

enum Segment<'a> {
    Text(&'a str),
    Open,
    Close,
}

/// Wrap every verbatim occurrence of each phrase with the marker
pub fn highlight<P: AsRef<str>>(content: &str, phrases: &[P], marker: &Marker) -> String {
    let mut segments = vec![Segment::Text(content)];

    for phrase in phrases.iter().map(AsRef::as_ref) {
        if phrase.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            let Segment::Text(text) = segment else {
                next.push(segment);
                continue;
            };
            let mut last = 0;
            for (idx, _) in text.match_indices(phrase) {
                if idx > last {
                    next.push(Segment::Text(&text[last..idx]));
                }
                next.push(Segment::Open);
                next.push(Segment::Text(&text[idx..idx + phrase.len()]));
                next.push(Segment::Close);
                last = idx + phrase.len();
            }
            if last < text.len() {
                next.push(Segment::Text(&text[last..]));
            }
        }
        segments = next;
    }

    let mut out = String::with_capacity(content.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Open => out.push_str(&marker.open),
            Segment::Close => out.push_str(&marker.close),
        }
    }
    out
}

/// Phrases to highlight for a review, optionally restricted to one keyword
pub fn phrases_for<'a>(analysis: &'a KeywordAnalysis, selected_keyword: Option<&str>) -> Vec<&'a str> {
    analysis
        .matched_keywords
        .iter()
        .filter(|m| selected_keyword.map_or(true, |k| m.keyword == k))
        .map(|m| m.original_phrase.as_str())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeywordMatch, MatchType};

    fn mark(content: &str, phrases: &[&str]) -> String {
        highlight(content, phrases, &Marker::default())
    }

    #[test]
    fn test_every_occurrence_is_wrapped() {
        assert_eq!(
            mark("좋아요 정말 좋아요", &["좋아요"]),
            "<mark>좋아요</mark> 정말 <mark>좋아요</mark>"
        );
    }

    #[test]
    fn test_absent_and_empty_phrases() {
        let content = "디자인이 제일 맘에 들어요";
        assert_eq!(mark(content, &["배터리", ""]), content);
        assert_eq!(mark(content, &[]), content);
    }

    #[test]
    fn test_markup_is_never_searched() {
        assert_eq!(
            mark("mark the spot", &["mark", "ark"]),
            "<mark>m<mark>ark</mark></mark> the spot"
        );
        assert_eq!(mark("a mark", &["mark", "mark"]), "a <mark><mark>mark</mark></mark>");
    }

    #[test]
    fn test_later_phrase_crossing_marker_is_skipped() {
        let out = mark("음질도 배터리도 만족", &["배터리", "음질도 배터리"]);
        assert_eq!(out, "음질도 <mark>배터리</mark>도 만족");
    }

    #[test]
    fn test_custom_marker() {
        let marker = Marker::new("[", "]");
        assert_eq!(highlight("빠른 배송", &["배송"], &marker), "빠른 [배송]");
    }

    #[test]
    fn test_phrases_for_filter() {
        let analysis = KeywordAnalysis {
            matched_keywords: vec![
                KeywordMatch {
                    keyword: "배터리".into(),
                    match_type: MatchType::Exact,
                    original_phrase: "배터리도 오래 갑니다".into(),
                },
                KeywordMatch {
                    keyword: "음질".into(),
                    match_type: MatchType::Semantic,
                    original_phrase: "음성이 깔끔하게 들려서".into(),
                },
                KeywordMatch {
                    keyword: "음질".into(),
                    match_type: MatchType::Partial,
                    original_phrase: String::new(),
                },
            ],
        };
        assert_eq!(phrases_for(&analysis, None).len(), 2);
        assert_eq!(phrases_for(&analysis, Some("음질")), vec!["음성이 깔끔하게 들려서"]);
        assert!(phrases_for(&analysis, Some("디자인")).is_empty());
    }
}
