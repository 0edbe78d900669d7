//! Attachment download handler.

use actix_web::{HttpResponse, web};
use futures::TryStreamExt;
use uuid::Uuid;

use blog_core::ports::StoreError;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /uploads/{id}
///
/// Streams the stored object chunk by chunk with its recorded content
/// type. A malformed id is a 400; an unknown one a 404.
pub async fn download(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid file id".to_string()))?;

    let (attachment, stream) = state.attachments.get(id).await.map_err(|e| match e {
        StoreError::NotFound(_) => AppError::NotFound("File not found".to_string()),
        other => AppError::from(other),
    })?;

    Ok(HttpResponse::Ok()
        .content_type(attachment.content_type)
        .streaming(stream.map_err(|e| {
            tracing::error!("Attachment stream error: {}", e);
            std::io::Error::other("stream error")
        })))
}
