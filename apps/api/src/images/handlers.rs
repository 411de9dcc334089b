//! Axum route handlers for image upload and delivery.

use axum::{
    extract::{
        multipart::MultipartError, rejection::PathRejection, Multipart, Path, State,
    },
    http::{
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Only image uploads are accepted (got '{content_type}')"
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit))?;
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let id = state
            .images
            .put(&user.email, &filename, &content_type, data)
            .await?;

        return Ok(Json(UploadResponse {
            url: format!("/api/images/{id}"),
        }));
    }

    Err(AppError::Validation("No file provided".to_string()))
}

fn multipart_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation(format!("File exceeds {limit} bytes"))
    } else {
        AppError::Validation(e.body_text())
    }
}

/// GET /api/images/:id
///
/// Ids are never reused, so responses are cacheable indefinitely.
pub async fn handle_get_image(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(|e| AppError::Validation(e.body_text()))?;
    let image = state
        .images
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, image.content_type),
            (CONTENT_LENGTH, image.data.len().to_string()),
            (CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        image.data,
    )
        .into_response())
}
