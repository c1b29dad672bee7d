//! Photo checks and naming done before anything leaves the client.

use base64::{engine::general_purpose::STANDARD as B64, Engine};

use crate::errors::AppError;
use crate::models::{is_image_mime, ActionBody};

/// A photo picked by the user.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Where the photo is headed; decides the stored filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadContext {
    /// Attached to a guest's RSVP
    Guest(String),
    /// Dropped straight into the gallery
    Gallery,
}

/// Reject files that the backend would refuse anyway.
pub fn validate_photo(photo: &PhotoFile, max_bytes: usize) -> Result<(), AppError> {
    if photo.bytes.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    if photo.bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "File size must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    if !is_image_mime(&photo.mime_type) {
        return Err(AppError::Validation(
            "Please select an image file".to_string(),
        ));
    }
    Ok(())
}

/// Replace every character that is not an ASCII letter or digit with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// File extension from the original name, else from the MIME subtype.
pub fn extension(photo: &PhotoFile) -> String {
    let from_name = photo
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match from_name {
        Some(ext) => ext.to_ascii_lowercase(),
        None => match photo.mime_type.split_once('/').map(|(_, sub)| sub) {
            Some("jpeg") => "jpg".to_string(),
            Some(sub) if !sub.is_empty() => sanitize_name(sub).to_ascii_lowercase(),
            _ => "png".to_string(),
        },
    }
}

/// `pumpkin_{name}_{millis}.{ext}` for guests, `gallery_photo_{millis}.{ext}` for the gallery.
pub fn upload_filename(photo: &PhotoFile, context: &UploadContext, millis: i64) -> String {
    let ext = extension(photo);
    match context {
        UploadContext::Guest(name) => format!("pumpkin_{}_{}.{}", sanitize_name(name), millis, ext),
        UploadContext::Gallery => format!("gallery_photo_{}.{}", millis, ext),
    }
}

/// Request body for `uploadPhoto`.
pub fn upload_body(photo: &PhotoFile, filename: String) -> ActionBody {
    ActionBody {
        filename: Some(filename),
        file_data: Some(B64.encode(&photo.bytes)),
        mime_type: Some(photo.mime_type.clone()),
        ..Default::default()
    }
}
