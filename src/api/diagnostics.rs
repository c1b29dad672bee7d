//! Diagnostic responses for the `test` action and unknown GET actions.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{json, Value};

use crate::mapper::format_timestamp;
use crate::models::Action;
use crate::AppState;

/// test: echo the request back with some backend facts.
pub fn test_echo(state: &AppState, params: &BTreeMap<String, String>) -> Value {
    json!({
        "message": "Pumpkinfest RSVP backend is working!",
        "timestamp": format_timestamp(Utc::now()),
        "folderId": state.config.folder_id,
        "maxUploadBytes": state.config.max_upload_bytes,
        "parameters": params,
    })
}

/// Reply for a GET with an action this backend does not know.
pub fn default_response(action: &str, params: &BTreeMap<String, String>) -> Value {
    let available: Vec<&str> = Action::ALL.iter().map(Action::as_str).collect();
    json!({
        "message": "Default response - RSVP backend is accessible",
        "action": action,
        "availableActions": available,
        "parameters": params,
    })
}
