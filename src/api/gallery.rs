//! Gallery actions: list the photo folder and store uploads.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::errors::AppError;
use crate::models::{GalleryListing, UploadRequest, UploadResult};
use crate::AppState;

/// getGalleryImages
pub async fn get_gallery_images(state: &AppState) -> Result<GalleryListing, AppError> {
    state.drive.list_gallery_images().await
}

/// uploadPhoto: decode the base64 payload and write it to the folder.
pub async fn upload_photo(state: &AppState, request: UploadRequest) -> Result<UploadResult, AppError> {
    if request.filename.trim().is_empty() {
        return Err(AppError::Validation("Filename is required".to_string()));
    }

    let bytes = decode_payload(&request.file_data)?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Photo payload is empty".to_string()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "File size must be less than {} bytes",
            state.config.max_upload_bytes
        )));
    }

    state
        .drive
        .store_image(&bytes, request.filename.trim(), &request.mime_type)
        .await
        .map_err(|e| {
            tracing::error!("Error uploading photo: {}", e);
            AppError::Upload(format!("Failed to upload photo: {}", e.message()))
        })
}

/// Decode base64, tolerating a `data:<mime>;base64,` prefix.
fn decode_payload(payload: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    Ok(B64.decode(encoded.trim())?)
}
