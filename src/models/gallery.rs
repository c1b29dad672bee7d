//! Gallery image models matching the frontend gallery shape.

use serde::{Deserialize, Serialize};

/// One image in the shared photo folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: String,
    pub name: String,
    pub drive_url: String,
    pub direct_url: String,
    pub thumbnail_url: String,
    pub mime_type: String,
    pub size: i64,
    pub last_modified: String,
}

/// Response data for `getGalleryImages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryListing {
    pub images: Vec<GalleryImage>,
    pub folder_url: String,
    pub count: usize,
}

/// Request body for `uploadPhoto`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub filename: String,
    /// Base64 payload; older forms sent it as `data`
    #[serde(alias = "data")]
    pub file_data: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

/// Response data for `uploadPhoto`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    pub file_id: String,
    pub drive_url: String,
    pub direct_url: String,
    pub thumbnail_url: String,
    pub filename: String,
}

/// Whether a MIME type names an image.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_accepts_legacy_data_field() {
        let req: UploadRequest =
            serde_json::from_str(r#"{"filename":"a.jpg","data":"AAAA","mimeType":"image/jpeg"}"#)
                .unwrap();
        assert_eq!(req.file_data, "AAAA");
        assert_eq!(req.mime_type, "image/jpeg");
    }

    #[test]
    fn test_upload_request_default_mime() {
        let req: UploadRequest =
            serde_json::from_str(r#"{"filename":"a.png","fileData":"AAAA"}"#).unwrap();
        assert_eq!(req.mime_type, "image/png");
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/jpeg"));
        assert!(is_image_mime("IMAGE/PNG"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(""));
    }
}
