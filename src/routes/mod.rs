//! HTTP endpoint implementations, organized by collection:
//!
//! - `health`: liveness
//! - `about`: profile record and profile image
//! - `photos`: the moments photo wall
//! - `journals`: travel-journal CRUD and journal photos

pub mod about;
pub mod health;
pub mod journals;
pub mod photos;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};

/// MIME types accepted for photo uploads.
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// One validated multipart file part.
pub(crate) struct UploadedFile {
    pub original_name: String,
    pub data: Bytes,
}

/// Drain a multipart request, keeping parts under `field_name` and
/// enforcing the type, per-file size, and file-count limits. Nothing is
/// written to disk here, so a rejected request persists nothing.
pub(crate) async fn collect_image_uploads(
    multipart: &mut Multipart,
    field_name: &str,
    config: &AppConfig,
) -> ApiResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::Validation(format!(
                "unsupported file type \"{content_type}\"; allowed types are image/jpeg, image/png, image/webp"
            )));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await?;
        if data.len() > config.max_upload_bytes() {
            return Err(ApiError::Validation(format!(
                "file \"{original_name}\" exceeds the {} MB size limit",
                config.max_upload_mb
            )));
        }

        files.push(UploadedFile {
            original_name,
            data,
        });
        if files.len() > config.max_files_per_upload {
            return Err(ApiError::Validation(format!(
                "too many files: at most {} per upload",
                config.max_files_per_upload
            )));
        }
    }

    if files.is_empty() {
        return Err(ApiError::Validation("no file provided".to_string()));
    }
    Ok(files)
}
