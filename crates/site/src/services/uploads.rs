//! Review photo storage.
//!
//! Photos land under `{media_root}/reviews/` with a random file name and
//! are served back through the `/media` static route. Only the relative
//! path is persisted on the review row.

use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

/// Largest accepted photo, in bytes (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Subdirectory of the media root that holds review photos.
const REVIEWS_SUBDIR: &str = "reviews";

/// Errors that can occur while storing an uploaded photo.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Content type outside the accepted image formats.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// Upload exceeds the size limit.
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Store a review photo under the media root.
///
/// Returns the path relative to the media root, which is what gets
/// persisted and later joined onto `/media/` in templates.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` or `UploadError::TooLarge` for
/// rejected uploads, `UploadError::Io` if the write fails.
pub async fn save_review_photo(
    media_root: &Path,
    content_type: &str,
    data: &[u8],
) -> Result<String, UploadError> {
    let Some(extension) = extension_for(content_type) else {
        return Err(UploadError::UnsupportedType(content_type.to_owned()));
    };
    if data.len() > MAX_PHOTO_BYTES {
        return Err(UploadError::TooLarge {
            size: data.len(),
            limit: MAX_PHOTO_BYTES,
        });
    }

    let relative = format!("{REVIEWS_SUBDIR}/{}.{extension}", Uuid::new_v4());
    let dest = media_root.join(&relative);
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&dest, data).await?;

    Ok(relative)
}

/// Map an accepted content type to the stored file extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_accepted_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[tokio::test]
    async fn test_save_review_photo_writes_file() {
        let media_root = std::env::temp_dir().join(format!("cj-uploads-{}", Uuid::new_v4()));

        let relative = save_review_photo(&media_root, "image/png", b"not a real png")
            .await
            .unwrap();

        assert!(relative.starts_with("reviews/"));
        assert!(relative.ends_with(".png"));
        assert!(media_root.join(&relative).is_file());

        std::fs::remove_dir_all(&media_root).ok();
    }

    #[tokio::test]
    async fn test_save_review_photo_rejects_wrong_type() {
        let media_root = std::env::temp_dir().join(format!("cj-uploads-{}", Uuid::new_v4()));

        let result = save_review_photo(&media_root, "image/gif", b"GIF89a").await;
        assert!(matches!(result, Err(UploadError::UnsupportedType(_))));
        assert!(!media_root.exists());
    }

    #[tokio::test]
    async fn test_save_review_photo_rejects_oversize() {
        let media_root = std::env::temp_dir().join(format!("cj-uploads-{}", Uuid::new_v4()));
        let data = vec![0_u8; MAX_PHOTO_BYTES + 1];

        let result = save_review_photo(&media_root, "image/jpeg", &data).await;
        assert!(matches!(result, Err(UploadError::TooLarge { .. })));
        assert!(!media_root.exists());
    }
}
