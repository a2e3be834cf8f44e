//! Input to a structured invocation

use std::path::{Path, PathBuf};

/// Review text plus whatever context the task needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisRequest {
    pub content: String,
    pub image_path: Option<PathBuf>,
    /// Ordered key/value context such as rating, product and category
    pub metadata: Vec<(String, String)>,
}

impl AnalysisRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, path: impl AsRef<Path>) -> Self {
        self.image_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add a metadata entry; a repeated key replaces the earlier value in place
    pub fn with_meta(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.metadata.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.metadata.push((key, value)),
        }
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `meta(key)` or a placeholder when absent
    pub fn meta_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.meta(key).unwrap_or(default)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "content" => Some(self.content.clone()),
            "image_path" => Some(
                self.image_path
                    .as_ref()
                    .map_or_else(|| "없음".to_string(), |p| p.display().to_string()),
            ),
            "has_image" => Some(if self.image_path.is_some() { "있음" } else { "없음" }.to_string()),
            _ => self.meta(name).map(String::from),
        }
    }

    /// Fill `{name}` placeholders from the request.
    ///
    /// Known names are `content`, `image_path`, `has_image` and any metadata
    /// key. Unknown placeholders stay as written, and substituted text is
    /// never scanned again.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + self.content.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let value = after
                .find('}')
                .filter(|&close| {
                    let name = &after[..close];
                    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                })
                .and_then(|close| self.lookup(&after[..close]).map(|v| (close, v)));

            match value {
                Some((close, value)) => {
                    out.push_str(&value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}
