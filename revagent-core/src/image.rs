//! Review image files
//!
//! Uploaded images are stored under timestamped names and loaded back as
//! base64 attachments for vision checks.

use crate::error::{Error, Result};
use crate::provider::ImageData;
use base64::Engine;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Sniff the encoded format from magic bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Write image bytes as `review_image_<timestamp>.<ext>` inside `folder`.
///
/// Unrecognized data is stored with the png extension.
pub fn save_image(bytes: &[u8], folder: impl AsRef<Path>) -> Result<PathBuf> {
    if bytes.is_empty() {
        return Err(Error::invalid_argument("image is empty").with_operation("image::save"));
    }
    let folder = folder.as_ref();
    std::fs::create_dir_all(folder).map_err(|e| Error::from(e).with_operation("image::save"))?;

    let format = ImageFormat::detect(bytes).unwrap_or(ImageFormat::Png);
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%6f");
    let path = folder.join(format!("review_image_{}.{}", timestamp, format.extension()));

    std::fs::write(&path, bytes).map_err(|e| {
        Error::from(e)
            .with_operation("image::save")
            .with_context("path", path.display().to_string())
    })?;
    tracing::debug!(path = %path.display(), format = format.extension(), "image saved");
    Ok(path)
}

/// Read an image file and encode it for a model message
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        Error::from(e)
            .with_operation("image::load")
            .with_context("path", path.display().to_string())
    })?;

    let format = ImageFormat::detect(&bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .unwrap_or(ImageFormat::Png);

    Ok(ImageData {
        media_type: format.media_type().to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    #[test]
    fn test_detect() {
        assert_eq!(ImageFormat::detect(PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(WEBP), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::detect(b"RIFF"), None);
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_save_names_file_by_timestamp() {
        let dir = TempDir::new().unwrap();
        let path = save_image(WEBP, dir.path().join("images")).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("review_image_"));
        assert!(name.ends_with(".webp"));
        // review_image_YYYYmmdd_HHMMSS_ffffff.webp
        assert_eq!(name.len(), "review_image_".len() + 22 + ".webp".len());
        assert_eq!(std::fs::read(&path).unwrap(), WEBP);
    }

    #[test]
    fn test_unknown_bytes_default_to_png() {
        let dir = TempDir::new().unwrap();
        let path = save_image(b"not really an image", dir.path()).unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert!(save_image(b"", dir.path()).is_err());
    }

    #[test]
    fn test_load_image() {
        let dir = TempDir::new().unwrap();
        let path = save_image(PNG, dir.path()).unwrap();
        let image = load_image(&path).unwrap();
        assert_eq!(image.media_type, "image/png");
        let decoded = base64::engine::general_purpose::STANDARD.decode(&image.data).unwrap();
        assert_eq!(decoded, PNG);

        let err = load_image(dir.path().join("missing.png")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::FileNotFound);
    }
}
