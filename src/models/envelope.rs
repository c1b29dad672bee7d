//! Request/response envelope shared by every action.

use serde::{Deserialize, Serialize};

use super::Rsvp;

/// Operations understood by the action endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetRsvps,
    AddRsvp,
    UpdateRsvp,
    UploadPhoto,
    GetGalleryImages,
    GetLastModified,
    Test,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::GetRsvps,
        Action::AddRsvp,
        Action::UpdateRsvp,
        Action::UploadPhoto,
        Action::GetGalleryImages,
        Action::GetLastModified,
        Action::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetRsvps => "getRSVPs",
            Action::AddRsvp => "addRSVP",
            Action::UpdateRsvp => "updateRSVP",
            Action::UploadPhoto => "uploadPhoto",
            Action::GetGalleryImages => "getGalleryImages",
            Action::GetLastModified => "getLastModified",
            Action::Test => "test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == s)
    }
}

/// Wrapper around every response: `{success, data, timestamp, error?, code?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: crate::mapper::format_timestamp(chrono::Utc::now()),
            error: None,
            code: None,
        }
    }
}

/// JSON body accepted by `POST /exec`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBody {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsvp: Option<Rsvp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}
