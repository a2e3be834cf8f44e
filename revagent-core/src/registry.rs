//! File-backed keyword registry
//!
//! Plain UTF-8 text, one keyword per line, in registration order.

use crate::error::{self, Error, Result};
use std::path::{Path, PathBuf};

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    AlreadyExists { keyword: String, total: usize },
    Registered { keyword: String, total: usize },
}

impl Registration {
    pub fn keyword(&self) -> &str {
        match self {
            Registration::AlreadyExists { keyword, .. } | Registration::Registered { keyword, .. } => keyword,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            Registration::AlreadyExists { total, .. } | Registration::Registered { total, .. } => *total,
        }
    }
}

pub struct KeywordRegistry {
    path: PathBuf,
}

impl KeywordRegistry {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registered keywords; a missing file is an empty registry
    pub fn list(&self) -> Result<Vec<String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::from(e)
                    .with_operation("registry::list")
                    .with_context("path", self.path.display().to_string()))
            }
        };

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn contains(&self, keyword: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|k| k == keyword))
    }

    /// Add a keyword unless an identical one is already present
    pub fn register(&self, keyword: &str) -> Result<Registration> {
        if keyword.trim().is_empty() {
            return Err(error::invalid_keyword(keyword, "keyword is empty"));
        }
        if keyword.contains(['\n', '\r']) {
            return Err(error::invalid_keyword(keyword, "keyword contains a line break"));
        }
        // stored lines are trimmed on load
        let keyword = keyword.trim();

        let mut keywords = self.list()?;
        if keywords.iter().any(|k| k == keyword) {
            return Ok(Registration::AlreadyExists {
                keyword: keyword.to_string(),
                total: keywords.len(),
            });
        }

        keywords.push(keyword.to_string());
        self.save(&keywords)?;
        tracing::info!(keyword, total = keywords.len(), "keyword registered");

        Ok(Registration::Registered {
            keyword: keyword.to_string(),
            total: keywords.len(),
        })
    }

    fn save(&self, keywords: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::from(e).with_operation("registry::save"))?;
        }

        let mut text = String::new();
        for keyword in keywords {
            text.push_str(keyword);
            text.push('\n');
        }
        std::fs::write(&self.path, text).map_err(|e| {
            Error::from(e)
                .with_operation("registry::save")
                .with_context("path", self.path.display().to_string())
        })
    }
}
