//! Product image storage on the local filesystem.
//!
//! Images arrive as base64 data URLs in the product payload. They are
//! written under the upload directory with a random name and served
//! back via the `/uploads` static route.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

const URL_PREFIX: &str = "/uploads";
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from storing or removing product images.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Payload is not a `data:image/...;base64,` URL.
    #[error("image must be a base64 data URL")]
    NotADataUrl,

    /// The media type is not an accepted image format.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// The base64 payload did not decode.
    #[error("image payload is not valid base64")]
    InvalidBase64,

    /// Decoded image exceeds the size cap.
    #[error("image exceeds {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    /// Filesystem failure.
    #[error("image storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem store for uploaded product images.
#[derive(Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the given directory.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Decode a base64 data URL and persist it, returning the public URL
    /// path (`/uploads/{name}`).
    ///
    /// The upload directory is created on first use.
    ///
    /// # Errors
    ///
    /// Returns an `ImageError` for a malformed payload, an unsupported
    /// media type, an oversized image, or a filesystem failure.
    pub async fn store_data_url(&self, data_url: &str) -> Result<String, ImageError> {
        let (extension, payload) = parse_data_url(data_url)?;

        let bytes = BASE64
            .decode(payload)
            .map_err(|_| ImageError::InvalidBase64)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&name), &bytes).await?;

        Ok(format!("{URL_PREFIX}/{name}"))
    }

    /// Remove the file behind a previously returned URL path.
    ///
    /// Best effort: a missing file or an IO failure is logged and
    /// swallowed so product deletion never fails over an orphan image.
    pub async fn remove_by_url(&self, image_url: &str) {
        let Some(name) = image_url.strip_prefix(&format!("{URL_PREFIX}/")) else {
            return; // externally hosted image, nothing to clean up
        };

        // The stored names are UUIDs; reject anything path-like.
        if name.contains('/') || name.contains("..") {
            warn!(image_url, "refusing to remove suspicious image path");
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(image_url, error = %e, "failed to remove product image");
            }
        }
    }

    /// The directory images are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Split a `data:image/{type};base64,{payload}` URL into an extension
/// and the raw base64 payload.
fn parse_data_url(data_url: &str) -> Result<(&'static str, &str), ImageError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(ImageError::NotADataUrl)?;
    let (media_type, payload) = rest
        .split_once(";base64,")
        .ok_or(ImageError::NotADataUrl)?;

    let extension = match media_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        other => return Err(ImageError::UnsupportedType(other.to_string())),
    };

    Ok((extension, payload))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const TINY_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_parse_data_url_png() {
        let url = format!("data:image/png;base64,{TINY_PNG}");
        let (ext, payload) = parse_data_url(&url).unwrap();
        assert_eq!(ext, "png");
        assert_eq!(payload, TINY_PNG);
    }

    #[test]
    fn test_parse_data_url_rejects_plain_base64() {
        assert!(matches!(
            parse_data_url(TINY_PNG),
            Err(ImageError::NotADataUrl)
        ));
    }

    #[test]
    fn test_parse_data_url_rejects_non_image() {
        let url = "data:application/pdf;base64,AAAA";
        assert!(matches!(
            parse_data_url(url),
            Err(ImageError::UnsupportedType(_))
        ));
    }

    #[tokio::test]
    async fn test_store_and_remove_roundtrip() {
        let dir = std::env::temp_dir().join(format!("juniper-images-{}", Uuid::new_v4()));
        let store = ImageStore::new(dir.clone());

        let url = store
            .store_data_url(&format!("data:image/png;base64,{TINY_PNG}"))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.strip_prefix("/uploads/").unwrap();
        assert!(dir.join(name).exists());

        store.remove_by_url(&url).await;
        assert!(!dir.join(name).exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_rejects_bad_base64() {
        let store = ImageStore::new(std::env::temp_dir());
        let result = store
            .store_data_url("data:image/png;base64,@@not-base64@@")
            .await;
        assert!(matches!(result, Err(ImageError::InvalidBase64)));
    }

    #[tokio::test]
    async fn test_remove_ignores_external_urls() {
        let store = ImageStore::new(std::env::temp_dir());
        // Must not panic or touch the filesystem.
        store.remove_by_url("https://cdn.example.com/pic.png").await;
    }
}
