//! Public file downloads for gallery links.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// GET /files/{id} and /files/{id}/view - Serve a public file inline.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let file = state
        .drive
        .get_public_file(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

    let disposition = format!("inline; filename=\"{}\"", file.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        file.data,
    )
        .into_response())
}

/// GET /files/{id}/thumbnail - Thumbnails are the original bytes; no resizing.
pub async fn serve_thumbnail(
    state: State<AppState>,
    id: Path<String>,
) -> Result<Response, AppError> {
    serve_file(state, id).await
}
