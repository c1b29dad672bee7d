//! RSVP record model matching the frontend RSVP shape.

use serde::{Deserialize, Serialize};

/// One guest's RSVP entry.
///
/// Enum-like columns (`attendance`, `needPumpkin`, `pumpkinPatch`) stay plain
/// strings: the sheet is edited by hand and may hold anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub attendance: String,
    #[serde(default)]
    pub need_pumpkin: String,
    #[serde(default)]
    pub bringing: String,
    #[serde(default)]
    pub pumpkin_patch: String,
    #[serde(default)]
    pub patch_dates: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Rsvp {
    /// A guest who has not picked an attendance value yet.
    pub fn is_unanswered(&self) -> bool {
        self.attendance.trim().is_empty()
    }

    /// Synthetic id for a persisted sheet row (1-based).
    pub fn row_id(row_number: u32) -> String {
        format!("row-{}", row_number)
    }

    /// Synthetic id for a record that only exists locally.
    pub fn temp_id(millis: i64) -> String {
        format!("temp_{}", millis)
    }

    /// Query parameters carrying this record's fields over the wire.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("attendance", self.attendance.clone()),
            ("needPumpkin", self.need_pumpkin.clone()),
            ("bringing", self.bringing.clone()),
            ("pumpkinPatch", self.pumpkin_patch.clone()),
            ("patchDates", self.patch_dates.clone()),
            ("timestamp", self.timestamp.clone()),
        ]
    }
}

/// The RSVP form as the guest fills it in.
///
/// `pumpkin_patch` is the checkbox; `patch_dates` are the ticked date labels,
/// only meaningful while the box is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsvpForm {
    pub name: String,
    pub email: String,
    pub attendance: String,
    pub need_pumpkin: String,
    pub bringing: String,
    pub pumpkin_patch: bool,
    pub patch_dates: Vec<String>,
}

impl RsvpForm {
    /// Flatten into the record sent to the backend.
    pub fn into_rsvp(self) -> Rsvp {
        let patch_dates = if self.pumpkin_patch {
            self.patch_dates
                .iter()
                .map(|date| date.trim())
                .filter(|date| !date.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            String::new()
        };

        Rsvp {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            attendance: self.attendance.trim().to_string(),
            need_pumpkin: self.need_pumpkin.trim().to_string(),
            bringing: self.bringing.trim().to_string(),
            pumpkin_patch: if self.pumpkin_patch { "Yes" } else { "No" }.to_string(),
            patch_dates,
            ..Default::default()
        }
    }

    /// Prefill the form from an existing record.
    pub fn from_rsvp(rsvp: &Rsvp) -> Self {
        let pumpkin_patch = rsvp.pumpkin_patch.trim() == "Yes";
        let patch_dates = if pumpkin_patch {
            rsvp.patch_dates
                .split(", ")
                .map(str::trim)
                .filter(|date| !date.is_empty())
                .map(String::from)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            name: rsvp.name.clone(),
            email: rsvp.email.clone(),
            attendance: rsvp.attendance.clone(),
            need_pumpkin: rsvp.need_pumpkin.clone(),
            bringing: rsvp.bringing.clone(),
            pumpkin_patch,
            patch_dates,
        }
    }
}

/// Response data for `getRSVPs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpList {
    pub rsvps: Vec<Rsvp>,
    pub last_modified: String,
    #[serde(default)]
    pub headers: Vec<String>,
}

/// How a write landed in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Added,
    Updated,
}

/// Response data for `addRSVP` and `updateRSVP`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub success: bool,
    pub rsvp_id: String,
    pub row_index: u32,
    pub action: WriteAction,
}

/// Response data for `getLastModified`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastModified {
    pub last_modified: String,
}
