//! Images kept on the local filesystem

use super::{AttachmentError, ImageStore, ImageUpload, UploadPolicy, stored_name};
use crate::config::ImageConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const BACKEND: &str = "local";

/// Writes images into `dir` and hands out `<public_prefix>/<name>` paths
///
/// The router serves `dir` at `public_prefix`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    public_prefix: String,
    policy: UploadPolicy,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_prefix: &str, policy: UploadPolicy) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            policy,
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(
            &config.local_dir,
            &config.public_prefix,
            UploadPolicy::from_config(config),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a public location back to a file inside `dir`
    ///
    /// Only the final path component is used, so a crafted location cannot
    /// escape the upload directory.
    fn resolve(&self, location: &str) -> Option<PathBuf> {
        let name = location.rsplit('/').next()?;
        if name.is_empty() || name == "." || name == ".." {
            return None;
        }
        Some(self.dir.join(name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, AttachmentError> {
        self.policy.check(&upload)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AttachmentError::backend(BACKEND, e))?;

        let name = stored_name(&upload.file_name);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AttachmentError::backend(BACKEND, e))?;

        tracing::debug!(path = %path.display(), size = upload.bytes.len(), "stored image");
        Ok(format!("{}/{}", self.public_prefix, name))
    }

    async fn delete(&self, location: &str) {
        let Some(path) = self.resolve(location) else {
            tracing::warn!(location, "ignoring image delete for unrecognised location");
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "deleted image"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to delete image"),
        }
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
