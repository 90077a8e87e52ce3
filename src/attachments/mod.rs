//! Image attachments
//!
//! A submission may carry one photo. The photo is checked against an
//! [`UploadPolicy`] and handed to an [`ImageStore`], which returns the
//! public location recorded in `imagePath`. Two stores exist:
//!
//! - [`LocalImageStore`]: files in a directory served back by the router
//! - `CloudinaryImageStore`: hosted images (feature `remote-images`)

pub mod local;

#[cfg(feature = "remote-images")]
pub mod cloudinary;

#[cfg(feature = "remote-images")]
pub use cloudinary::CloudinaryImageStore;
pub use local::LocalImageStore;

use crate::config::{ImageBackend, ImageConfig};
use crate::core::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Why an image was refused or could not be kept
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("Unsupported media type '{mime_type}': only images are accepted")]
    UnsupportedMediaType { mime_type: String },

    #[error("Image is {size} bytes, the limit is {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Image file is empty")]
    EmptyFile,

    #[error("{backend} image store failed: {message}")]
    Backend { backend: String, message: String },
}

impl AttachmentError {
    /// Whether the client sent something unacceptable, as opposed to the
    /// backend failing
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AttachmentError::Backend { .. })
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AttachmentError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            AttachmentError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AttachmentError::EmptyFile => "EMPTY_FILE",
            AttachmentError::Backend { .. } => "IMAGE_STORE_ERROR",
        }
    }

    pub(crate) fn backend(backend: &str, message: impl std::fmt::Display) -> Self {
        AttachmentError::Backend {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

/// Image received with a submission
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Name supplied by the client, unsanitized
    pub file_name: String,
    pub content_type: String,
}

/// Destination for accepted images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return its public location
    async fn store(&self, upload: ImageUpload) -> Result<String, AttachmentError>;

    /// Best-effort removal of a location previously returned by `store`
    ///
    /// Failures are logged, never returned.
    async fn delete(&self, location: &str);

    fn backend(&self) -> &'static str;
}

/// Acceptance rules shared by every image store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.max_bytes)
    }

    /// Reject anything that is not a non-empty image within the size limit
    pub fn check(&self, upload: &ImageUpload) -> Result<(), AttachmentError> {
        if !upload.content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(AttachmentError::UnsupportedMediaType {
                mime_type: upload.content_type.clone(),
            });
        }
        if upload.bytes.is_empty() {
            return Err(AttachmentError::EmptyFile);
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(AttachmentError::PayloadTooLarge {
                size: upload.bytes.len(),
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Build the image store selected by `config`
pub fn open(config: &ImageConfig) -> Result<Arc<dyn ImageStore>> {
    match config.backend {
        ImageBackend::Local => Ok(Arc::new(LocalImageStore::from_config(config))),
        #[cfg(feature = "remote-images")]
        ImageBackend::Cloudinary => Ok(Arc::new(CloudinaryImageStore::from_config(config))),
        #[cfg(not(feature = "remote-images"))]
        ImageBackend::Cloudinary => Err(crate::core::error::ConfigError::InvalidValue {
            field: "images.backend".to_string(),
            value: "cloudinary".to_string(),
            message: "built without the `remote-images` feature".to_string(),
        }
        .into()),
    }
}

/// Replace everything outside `[A-Za-z0-9._-]` with `_`
///
/// Path separators never survive, so the result is always a single path
/// component.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "image".to_string(),
        rest => rest.to_string(),
    }
}

/// Eight random hex digits
pub fn name_nonce() -> String {
    let mut nonce = Uuid::new_v4().simple().to_string();
    nonce.truncate(8);
    nonce
}

/// `<unix-millis>-<8 hex>-<sanitized name>`
///
/// The millisecond prefix keeps a directory listing in upload order.
pub fn stored_name(original: &str) -> String {
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        name_nonce(),
        sanitize_file_name(original)
    )
}
