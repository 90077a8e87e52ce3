//! Images hosted on Cloudinary
//!
//! Uses the signed upload API directly: parameters are sorted, joined as
//! `key=value&...`, suffixed with the API secret and hashed with SHA-256.

use super::{AttachmentError, ImageStore, ImageUpload, UploadPolicy, name_nonce, sanitize_file_name};
use crate::config::{CloudinaryConfig, ImageConfig};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const BACKEND: &str = "cloudinary";
const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Formats Cloudinary accepts for kitchen photos
pub const ALLOWED_FORMATS: &str = "jpg,jpeg,png,webp,heic,heif";

/// Incoming transformation: cap the width, compress, convert to WebP
pub const TRANSFORMATION: &str = "c_limit,w_1200,q_auto:good,f_webp";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Uploads images to a Cloudinary folder and returns their `secure_url`
#[derive(Debug, Clone)]
pub struct CloudinaryImageStore {
    client: reqwest::Client,
    credentials: CloudinaryConfig,
    policy: UploadPolicy,
}

impl CloudinaryImageStore {
    pub fn new(credentials: CloudinaryConfig, policy: UploadPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            policy,
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.cloudinary.clone(), UploadPolicy::from_config(config))
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.credentials.cloud_name, action)
    }

    /// Signature over the sorted parameters
    fn sign(&self, params: &BTreeMap<&str, String>) -> String {
        let joined = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.credentials.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn signed_params<'a>(&self, mut params: BTreeMap<&'a str, String>) -> BTreeMap<&'a str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = self.sign(&params);
        params.insert("api_key", self.credentials.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }

    async fn api_error(response: reqwest::Response) -> AttachmentError {
        let status = response.status();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("HTTP {}", status),
        };
        AttachmentError::backend(BACKEND, message)
    }
}

/// Public id for a new upload: `<8 hex>-<sanitized stem>`
///
/// Cloudinary records the upload time itself, so no timestamp prefix is added.
pub fn upload_public_id(file_name: &str) -> String {
    let name = sanitize_file_name(file_name);
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name.as_str(),
    };
    format!("{}-{}", name_nonce(), stem)
}

/// Public id of a delivered asset: the path after `/upload/`, without the
/// version segment and file extension
pub fn public_id(url: &str) -> Option<String> {
    let (_, path) = url.split_once("/upload/")?;
    let path = match path.split_once('/') {
        Some((version, rest))
            if version.len() > 1
                && version.starts_with('v')
                && version[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => path,
    };
    let id = match path.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => path,
    };
    (!id.is_empty()).then(|| id.to_string())
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, AttachmentError> {
        self.policy.check(&upload)?;

        let id = upload_public_id(&upload.file_name);

        let mut params = BTreeMap::new();
        params.insert("allowed_formats", ALLOWED_FORMATS.to_string());
        params.insert("folder", self.credentials.folder.clone());
        params.insert("public_id", id);
        params.insert("transformation", TRANSFORMATION.to_string());

        let part = Part::bytes(upload.bytes)
            .file_name(sanitize_file_name(&upload.file_name))
            .mime_str(&upload.content_type)
            .map_err(|e| AttachmentError::backend(BACKEND, e))?;
        let form = self
            .signed_params(params)
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AttachmentError::backend(BACKEND, e))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AttachmentError::backend(BACKEND, e))?;

        tracing::debug!(url = %uploaded.secure_url, "uploaded image to Cloudinary");
        Ok(uploaded.secure_url)
    }

    async fn delete(&self, location: &str) {
        let Some(public_id) = public_id(location) else {
            tracing::warn!(location, "cannot derive Cloudinary public id");
            return;
        };

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.clone());

        let result = self
            .client
            .post(self.endpoint("destroy"))
            .form(&self.signed_params(params))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<DestroyResponse>().await {
                    Ok(body) if body.result == "ok" => {
                        tracing::debug!(public_id = %public_id, "deleted Cloudinary image")
                    }
                    Ok(body) => {
                        tracing::warn!(public_id = %public_id, result = %body.result, "Cloudinary did not delete image")
                    }
                    Err(e) => tracing::warn!(public_id = %public_id, error = %e, "unreadable Cloudinary response"),
                }
            }
            Ok(response) => {
                let error = Self::api_error(response).await;
                tracing::warn!(public_id = %public_id, error = %error, "failed to delete Cloudinary image");
            }
            Err(e) => tracing::warn!(public_id = %public_id, error = %e, "failed to delete Cloudinary image"),
        }
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
