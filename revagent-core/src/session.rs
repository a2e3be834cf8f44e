//! # Review sessions
//!
//! A session owns the reviews of one product page together with the latest
//! analysis record of each kind per review.
//!
//! ## Storage
//!
//! Sessions persist through a [`SessionStore`]. The file store keeps one JSON
//! document per session:
//!
//! ```text
//! {data_dir}/
//!   sessions/
//!     {session_id}.json
//! ```
//!
//! A save replaces the whole document through a temp file and a rename, so a
//! failed save leaves the previous contents intact.

use crate::error::{self, Error, Result};
use crate::moderation::ModerationResult;
use crate::record::AnalysisRecord;
use crate::schema::{KeywordAnalysis, SentimentResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A customer review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub author: String,
    pub content: String,
    /// 1 to 5 stars
    pub rating: u8,
    /// `%Y-%m-%d %H:%M`
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

impl Review {
    pub fn stars(&self) -> String {
        "★".repeat(self.rating as usize)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    reviews: Vec<Review>,
    #[serde(default)]
    sentiment: BTreeMap<u64, AnalysisRecord<SentimentResult>>,
    #[serde(default)]
    keywords: BTreeMap<u64, AnalysisRecord<KeywordAnalysis>>,
    #[serde(default)]
    moderation: BTreeMap<u64, AnalysisRecord<ModerationResult>>,
}

impl ReviewSession {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            reviews: Vec::new(),
            sentiment: BTreeMap::new(),
            keywords: BTreeMap::new(),
            moderation: BTreeMap::new(),
        }
    }

    /// A session seeded with the demo earphone reviews
    pub fn sample(id: impl Into<String>) -> Self {
        let mut session = Self::new(id);
        session.reviews = sample_reviews();
        session
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Reviews newest first
    pub fn reviews_newest_first(&self) -> impl Iterator<Item = &Review> {
        self.reviews.iter().rev()
    }

    pub fn review(&self, id: u64) -> Result<&Review> {
        self.reviews
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::review_not_found(id))
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// One past the largest id ever stored
    pub fn next_id(&self) -> u64 {
        self.reviews.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
    }

    pub fn add_review(
        &mut self,
        author: &str,
        content: &str,
        rating: u8,
        image_path: Option<PathBuf>,
    ) -> Result<&Review> {
        let author = author.trim();
        let content = content.trim();
        if author.is_empty() {
            return Err(error::empty_field("author").with_operation("session::add_review"));
        }
        if content.is_empty() {
            return Err(error::empty_field("content").with_operation("session::add_review"));
        }
        if !(1..=5).contains(&rating) {
            return Err(error::invalid_rating(rating).with_operation("session::add_review"));
        }

        let review = Review {
            id: self.next_id(),
            author: author.to_string(),
            content: content.to_string(),
            rating,
            timestamp: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            image_path,
        };
        tracing::info!(session = %self.id, review_id = review.id, "review added");
        self.reviews.push(review);
        self.touch();

        let idx = self.reviews.len() - 1;
        Ok(&self.reviews[idx])
    }

    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
        total as f64 / self.reviews.len() as f64
    }

    // =========================================================================
    // Analysis records
    // =========================================================================

    fn ensure_review(&self, id: u64, operation: &'static str) -> Result<()> {
        self.review(id).map(|_| ()).map_err(|e| e.with_operation(operation))
    }

    pub fn store_sentiment(&mut self, id: u64, record: AnalysisRecord<SentimentResult>) -> Result<()> {
        self.ensure_review(id, "session::store_sentiment")?;
        self.sentiment.insert(id, record);
        self.touch();
        Ok(())
    }

    pub fn store_keywords(&mut self, id: u64, record: AnalysisRecord<KeywordAnalysis>) -> Result<()> {
        self.ensure_review(id, "session::store_keywords")?;
        self.keywords.insert(id, record);
        self.touch();
        Ok(())
    }

    pub fn store_moderation(&mut self, id: u64, record: AnalysisRecord<ModerationResult>) -> Result<()> {
        self.ensure_review(id, "session::store_moderation")?;
        self.moderation.insert(id, record);
        self.touch();
        Ok(())
    }

    pub fn sentiment(&self, id: u64) -> Option<&AnalysisRecord<SentimentResult>> {
        self.sentiment.get(&id)
    }

    pub fn keywords(&self, id: u64) -> Option<&AnalysisRecord<KeywordAnalysis>> {
        self.keywords.get(&id)
    }

    pub fn moderation(&self, id: u64) -> Option<&AnalysisRecord<ModerationResult>> {
        self.moderation.get(&id)
    }

    /// Reviews whose keyword record matched `keyword`, newest first
    pub fn reviews_matching_keyword(&self, keyword: &str) -> Vec<&Review> {
        self.reviews_newest_first()
            .filter(|r| {
                self.keywords
                    .get(&r.id)
                    .is_some_and(|rec| rec.payload.contains_keyword(keyword))
            })
            .collect()
    }

    fn touch(&mut self) {
        self.updated_at = Local::now();
    }
}

fn sample_reviews() -> Vec<Review> {
    let seed = [
        (1, "박지훈", 5, "전반적으로 낫배드. 가격 대비 쓸만한 것 같습니다.", "2024-01-16 17:32"),
        (2, "김민수", 5, "주문한지 하루만에 왔어요! 급했는데 빠른 배송 감사합니다. ", "2024-01-15 14:30"),
        (3, "이영희", 4, "디자인이 제일 맘에 들어요, 하얀색 강추입니다! 근데 제가 귀가 작아서그런지 귀에 끼면 좀 아파요", "2024-01-14 16:45"),
        (4, "박철수", 3, "며칠 더 써봐야겠지만, 지금까지는 음질도 배터리도 만족스럽습니다.", "2024-01-13 10:20"),
        (5, "최지영", 5, "제품 맘에 듭니다. 특히 통화할 때 음성이 깔끔하게 들려서 만족스러워요. 배터리도 오래 갑니다.", "2024-01-12 09:15"),
    ];
    seed.into_iter()
        .map(|(id, author, rating, content, timestamp)| Review {
            id,
            author: author.to_string(),
            content: content.to_string(),
            rating,
            timestamp: timestamp.to_string(),
            image_path: None,
        })
        .collect()
}

fn validate_session_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']);
    if ok {
        Ok(())
    } else {
        Err(error::invalid_session_id(id))
    }
}

// =============================================================================
// Session Store Trait
// =============================================================================

/// Trait for session storage backends
pub trait SessionStore: Send + Sync {
    /// Persist the complete session
    fn save(&self, session: &ReviewSession) -> Result<()>;

    /// Load a session by id
    fn load(&self, session_id: &str) -> Result<ReviewSession>;

    /// List stored session ids, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a session; deleting a missing session is not an error
    fn delete(&self, session_id: &str) -> Result<()>;

    fn exists(&self, session_id: &str) -> bool {
        self.load(session_id).is_ok()
    }

    /// Backend name for debugging
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// File-based Store (JSON files)
// =============================================================================

pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// `data_dir/sessions` is created on demand
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let base_path = data_dir.as_ref().join("sessions");
        std::fs::create_dir_all(&base_path).map_err(|e| {
            Error::storage_failed(format!("failed to create session directory: {}", e))
                .with_operation("session::FileStore::new")
                .with_context("path", base_path.display().to_string())
        })?;
        Ok(Self { base_path })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", session_id))
    }
}

impl SessionStore for FileStore {
    fn save(&self, session: &ReviewSession) -> Result<()> {
        validate_session_id(&session.id)?;
        let path = self.session_path(&session.id);
        let tmp = self.base_path.join(format!(".{}.json.tmp", session.id));

        let json = serde_json::to_string_pretty(session).map_err(|e| {
            Error::serialization_failed(e.to_string()).with_operation("session::save")
        })?;

        let write = std::fs::write(&tmp, json).and_then(|_| std::fs::rename(&tmp, &path));
        if let Err(e) = write {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::storage_failed(format!("failed to write session: {}", e))
                .with_operation("session::save")
                .with_context("session", session.id.clone())
                .set_source(e));
        }

        tracing::debug!(session = %session.id, path = %path.display(), "session saved");
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<ReviewSession> {
        validate_session_id(session_id)?;
        let path = self.session_path(session_id);

        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::storage_not_found(session_id).with_operation("session::load"))
            }
            Err(e) => return Err(Error::from(e).with_operation("session::load")),
        };

        serde_json::from_str(&json).map_err(|e| {
            Error::parse_failed(format!("failed to parse session: {}", e))
                .with_operation("session::load")
                .with_context("session", session_id)
        })
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.base_path).map_err(|e| {
            Error::storage_failed(format!("failed to read sessions dir: {}", e)).with_operation("session::list")
        })?;

        let mut sessions: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if name.starts_with('.') {
                    return None;
                }
                name.strip_suffix(".json").map(String::from)
            })
            .collect();
        sessions.sort();
        Ok(sessions)
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        validate_session_id(session_id)?;
        match std::fs::remove_file(self.session_path(session_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from(e).with_operation("session::delete")),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// =============================================================================
// In-Memory Store (for testing)
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, ReviewSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, session: &ReviewSession) -> Result<()> {
        validate_session_id(&session.id)?;
        let mut sessions = self.sessions.write().map_err(|_| error::lock_poisoned("sessions"))?;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<ReviewSession> {
        let sessions = self.sessions.read().map_err(|_| error::lock_poisoned("sessions"))?;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::storage_not_found(session_id).with_operation("session::load"))
    }

    fn list(&self) -> Result<Vec<String>> {
        let sessions = self.sessions.read().map_err(|_| error::lock_poisoned("sessions"))?;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| error::lock_poisoned("sessions"))?;
        sessions.remove(session_id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// SessionManager (wrapper with backend)
// =============================================================================

/// Session persistence with a pluggable backend
pub struct SessionManager {
    store: Box<dyn SessionStore>,
}

impl SessionManager {
    pub fn with_store(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// File store under `data_dir` (default)
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_store(FileStore::new(data_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Load the session, or start one seeded with the sample reviews
    pub fn open(&self, session_id: &str) -> Result<ReviewSession> {
        validate_session_id(session_id)?;
        match self.store.load(session_id) {
            Ok(session) => Ok(session),
            Err(e) if e.kind() == error::ErrorKind::StorageNotFound => {
                tracing::info!(session = session_id, "creating new session with sample reviews");
                let session = ReviewSession::sample(session_id);
                self.store.save(&session)?;
                Ok(session)
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, session: &ReviewSession) -> Result<()> {
        self.store.save(session)
    }

    pub fn load(&self, session_id: &str) -> Result<ReviewSession> {
        self.store.load(session_id)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    pub fn delete(&self, session_id: &str) -> Result<()> {
        self.store.delete(session_id)
    }

    pub fn exists(&self, session_id: &str) -> bool {
        self.store.exists(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::extract::{Extraction, InvocationError};
    use crate::schema::{KeywordMatch, MatchType, SentimentLabel};
    use tempfile::TempDir;

    fn sentiment_record(reason: &str, raw: &str) -> AnalysisRecord<SentimentResult> {
        AnalysisRecord::from_extraction(
            Extraction::Parsed {
                value: SentimentResult {
                    sentiment: SentimentLabel::Positive,
                    score: 0.6,
                    confidence: 0.8,
                    reason: reason.into(),
                },
                raw_response: raw.into(),
            },
            "review",
        )
    }

    fn keyword_record(keywords: &[&str]) -> AnalysisRecord<KeywordAnalysis> {
        let matched_keywords = keywords
            .iter()
            .map(|k| KeywordMatch {
                keyword: k.to_string(),
                match_type: MatchType::Exact,
                original_phrase: k.to_string(),
            })
            .collect();
        AnalysisRecord::from_extraction(
            Extraction::Parsed {
                value: KeywordAnalysis { matched_keywords },
                raw_response: String::new(),
            },
            "review",
        )
    }

    #[test]
    fn test_sample_session() {
        let session = ReviewSession::sample("demo");
        assert_eq!(session.reviews().len(), 5);
        assert_eq!(session.next_id(), 6);
        assert!((session.average_rating() - 4.4).abs() < 1e-9);
        assert_eq!(session.reviews_newest_first().next().unwrap().id, 5);
    }

    #[test]
    fn test_ids_are_max_plus_one() {
        let mut session = ReviewSession::new("t");
        assert_eq!(session.average_rating(), 0.0);
        assert_eq!(session.add_review("a", "좋아요", 5, None).unwrap().id, 1);
        assert_eq!(session.add_review("b", "별로", 2, None).unwrap().id, 2);
        assert!((session.average_rating() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_add_review_validation() {
        let mut session = ReviewSession::new("t");
        for (author, content, rating) in [("", "내용", 3), ("작성자", "  ", 3), ("작성자", "내용", 0), ("작성자", "내용", 6)] {
            let err = session.add_review(author, content, rating, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert!(session.is_empty());
    }

    #[test]
    fn test_store_requires_existing_review() {
        let mut session = ReviewSession::sample("t");
        let err = session.store_sentiment(42, sentiment_record("x", "x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReviewNotFound);
        assert_eq!(err.operation(), "session::store_sentiment");
        assert!(session.sentiment(42).is_none());
    }

    #[test]
    fn test_reanalysis_replaces_record() {
        let mut session = ReviewSession::sample("t");
        session.store_sentiment(2, sentiment_record("first", "raw one")).unwrap();
        session.store_sentiment(2, sentiment_record("second", "raw two")).unwrap();

        let record = session.sentiment(2).unwrap();
        assert_eq!(record.payload.reason, "second");
        assert_eq!(record.raw_response, "raw two");
    }

    #[test]
    fn test_fallback_record_stored() {
        let mut session = ReviewSession::sample("t");
        let record = AnalysisRecord::<ModerationResult>::from_extraction(
            Extraction::Failed(InvocationError {
                kind: ErrorKind::ToolLimitExceeded,
                message: "too many tool rounds".into(),
                raw_response: None,
            }),
            "review",
        );
        session.store_moderation(1, record).unwrap();
        assert!(session.moderation(1).unwrap().is_fallback());
    }

    #[test]
    fn test_reviews_matching_keyword() {
        let mut session = ReviewSession::sample("t");
        session.store_keywords(4, keyword_record(&["음질", "배터리"])).unwrap();
        session.store_keywords(5, keyword_record(&["배터리"])).unwrap();
        session.store_keywords(2, keyword_record(&["배송"])).unwrap();

        let ids: Vec<u64> = session.reviews_matching_keyword("배터리").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4]);
        assert!(session.reviews_matching_keyword("디자인").is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();
        assert_eq!(manager.backend_name(), "file");

        let mut session = manager.open("main").unwrap();
        assert_eq!(session.reviews().len(), 5);
        session.add_review("정우성", "착용감이 좋아요", 4, None).unwrap();
        session.store_keywords(6, keyword_record(&["착용감"])).unwrap();
        manager.save(&session).unwrap();

        let loaded = manager.load("main").unwrap();
        assert_eq!(loaded.reviews().len(), 6);
        assert!(loaded.keywords(6).unwrap().payload.contains_keyword("착용감"));
        assert!(dir.path().join("sessions").join("main.json").exists());
        assert_eq!(manager.list().unwrap(), vec!["main"]);
    }

    #[test]
    fn test_file_store_failed_save_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let session = ReviewSession::sample("keep");
        store.save(&session).unwrap();

        // a directory in place of the temp file makes the write fail
        std::fs::create_dir(dir.path().join("sessions").join(".keep.json.tmp")).unwrap();
        let mut changed = session.clone();
        changed.add_review("x", "y", 1, None).unwrap();
        let err = store.save(&changed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailed);

        assert_eq!(store.load("keep").unwrap().reviews().len(), 5);
    }

    #[test]
    fn test_missing_and_invalid_sessions() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.load("nope").unwrap_err().kind(), ErrorKind::StorageNotFound);
        assert!(!store.exists("nope"));
        assert!(store.delete("nope").is_ok());
        assert_eq!(store.load("../etc").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_memory_store() {
        let manager = SessionManager::in_memory();
        assert_eq!(manager.backend_name(), "memory");

        let session = manager.open("mem").unwrap();
        assert!(manager.exists("mem"));
        assert_eq!(session.reviews().len(), 5);

        manager.delete("mem").unwrap();
        assert!(manager.list().unwrap().is_empty());
    }
}
