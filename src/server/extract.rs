//! Request extractors that reject with [`ProcurementError`]
//!
//! Axum's stock extractors answer malformed input with their own status codes
//! and plain-text bodies. These wrappers turn every rejection into a
//! `VALIDATION_ERROR` JSON body instead.

use super::host::ServerHost;
use crate::attachments::{AttachmentError, ImageUpload};
use crate::core::error::{ProcurementError, ValidationError};
use crate::entities::NewRequest;
use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

/// Form field carrying the photo
pub const IMAGE_FIELD: &str = "image";

/// JSON body whose decode failures are validation errors
///
/// Unknown fields, wrong types and invalid enum values all end up as
/// `ValidationError::InvalidJson` (400).
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ProcurementError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ValidationError::InvalidJson {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}

/// Query string whose decode failures are validation errors
///
/// Repeated or mistyped parameters become `ValidationError::InvalidQuery`
/// (400) with a JSON body.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ProcurementError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(ValidationError::InvalidQuery {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}

/// The `{id}` path segment parsed as a UUID
pub struct RequestId(pub Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = ProcurementError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationError::InvalidId {
                value: e.body_text(),
            })?;

        Uuid::parse_str(&raw)
            .map(RequestId)
            .map_err(|_| ValidationError::InvalidId { value: raw }.into())
    }
}

/// A new request together with its optional photo
///
/// Accepts `multipart/form-data` (text fields named after the record fields
/// plus an `image` file part) or a JSON body.
#[derive(Debug)]
pub struct Submission {
    pub request: NewRequest,
    pub image: Option<ImageUpload>,
}

impl FromRequest<Arc<ServerHost>> for Submission {
    type Rejection = ProcurementError;

    async fn from_request(req: Request, host: &Arc<ServerHost>) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let JsonBody(request) = JsonBody::<NewRequest>::from_request(req, host).await?;
            return Ok(Submission {
                request,
                image: None,
            });
        }

        let declared_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok());
        let too_large = |_: MultipartError| AttachmentError::PayloadTooLarge {
            size: declared_length.unwrap_or(host.body_limit() + 1),
            max: host.config.images.max_bytes,
        };

        let mut multipart = Multipart::from_request(req, host)
            .await
            .map_err(|e| ValidationError::InvalidMultipart {
                message: e.body_text(),
            })?;

        let mut request = NewRequest::default();
        let mut image = None;

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    return Err(too_large(e).into());
                }
                Err(e) => return Err(invalid_multipart(e).into()),
            };

            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                image = read_image(field).await.map_err(|e| {
                    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        ProcurementError::from(too_large(e))
                    } else {
                        invalid_multipart(e).into()
                    }
                })?;
                continue;
            }

            let value = field.text().await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ProcurementError::from(too_large(e))
                } else {
                    invalid_multipart(e).into()
                }
            })?;
            if !request.set_form_field(&name, value)? {
                tracing::debug!(field = %name, "ignoring unknown form field");
            }
        }

        Ok(Submission { request, image })
    }
}

fn invalid_multipart(e: MultipartError) -> ValidationError {
    ValidationError::InvalidMultipart {
        message: e.body_text(),
    }
}

/// Read the file part; browsers send an empty nameless part when no file
/// was chosen, which counts as no image
async fn read_image(field: Field<'_>) -> Result<Option<ImageUpload>, MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await?;

    if bytes.is_empty() && file_name.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImageUpload {
        bytes: bytes.to_vec(),
        file_name,
        content_type,
    }))
}
