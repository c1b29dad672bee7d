//! RSVP actions: read the sheet, add or update one guest's row.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::errors::AppError;
use crate::mapper::format_timestamp;
use crate::models::{LastModified, Rsvp, RsvpList, WriteResult};
use crate::AppState;

/// getRSVPs
pub async fn get_rsvps(state: &AppState) -> Result<RsvpList, AppError> {
    state.repo.get_rsvps().await
}

/// getLastModified
pub async fn get_last_modified(state: &AppState) -> Result<LastModified, AppError> {
    Ok(LastModified {
        last_modified: state.repo.last_modified().await?,
    })
}

/// addRSVP: update the row with this name, or append one.
pub async fn add_rsvp(state: &AppState, record: Rsvp) -> Result<WriteResult, AppError> {
    validate(&record)?;
    state.repo.add_rsvp(&record).await
}

/// updateRSVP: the name must already have a row.
pub async fn update_rsvp(state: &AppState, record: Rsvp) -> Result<WriteResult, AppError> {
    validate(&record)?;
    state.repo.update_rsvp(&record).await
}

fn validate(record: &Rsvp) -> Result<(), AppError> {
    if record.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(())
}

/// Build a record from GET query parameters; missing fields are empty.
pub fn record_from_params(params: &BTreeMap<String, String>) -> Rsvp {
    let field = |key: &str| params.get(key).cloned().unwrap_or_default();

    let timestamp = params
        .get("timestamp")
        .filter(|ts| !ts.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| format_timestamp(Utc::now()));

    Rsvp {
        name: field("name"),
        email: field("email"),
        attendance: field("attendance"),
        need_pumpkin: field("needPumpkin"),
        bringing: field("bringing"),
        pumpkin_patch: field("pumpkinPatch"),
        patch_dates: field("patchDates"),
        timestamp,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_params() {
        let params: BTreeMap<String, String> = [
            ("name", "Alex"),
            ("attendance", "Yes"),
            ("needPumpkin", "No"),
            ("patchDates", "Sat 10/25, Sun 10/26"),
            ("t", "12345"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let record = record_from_params(&params);
        assert_eq!(record.name, "Alex");
        assert_eq!(record.need_pumpkin, "No");
        assert_eq!(record.patch_dates, "Sat 10/25, Sun 10/26");
        assert_eq!(record.email, "");
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn test_validate_requires_name() {
        assert!(validate(&Rsvp::default()).is_err());
        let record = Rsvp {
            name: "Sam".into(),
            ..Default::default()
        };
        assert!(validate(&record).is_ok());
    }
}
