//! Action endpoint.
//!
//! Every operation goes through `/exec`, selected by an `action` parameter:
//! query parameters on GET, a JSON body on POST. GET requests may ask for the
//! envelope wrapped in a named callback for script-tag delivery.

mod diagnostics;
mod files;
mod gallery;
mod rsvps;

pub use files::*;

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{Action, ActionBody, Envelope, UploadRequest};
use crate::AppState;

/// GET /exec - Dispatch on the `action` query parameter.
pub async fn exec_get(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let action = params.get("action").map(String::as_str).unwrap_or("test");
    tracing::debug!("GET action {}", action);

    let result = match Action::parse(action) {
        Some(Action::GetRsvps) => to_data(rsvps::get_rsvps(&state).await),
        Some(Action::AddRsvp) => {
            let record = rsvps::record_from_params(&params);
            if params.get("isUpdate").map(String::as_str) == Some("true") {
                to_data(rsvps::update_rsvp(&state, record).await)
            } else {
                to_data(rsvps::add_rsvp(&state, record).await)
            }
        }
        Some(Action::UpdateRsvp) => {
            let record = rsvps::record_from_params(&params);
            to_data(rsvps::update_rsvp(&state, record).await)
        }
        Some(Action::UploadPhoto) => Err(AppError::BadRequest(
            "uploadPhoto requires a POST body".to_string(),
        )),
        Some(Action::GetGalleryImages) => to_data(gallery::get_gallery_images(&state).await),
        Some(Action::GetLastModified) => to_data(rsvps::get_last_modified(&state).await),
        Some(Action::Test) => Ok(diagnostics::test_echo(&state, &params)),
        None => Ok(diagnostics::default_response(action, &params)),
    };

    match params.get("callback") {
        Some(callback) => callback_response(callback, result),
        None => json_response(result),
    }
}

/// POST /exec - Dispatch on the `action` field of a JSON body.
pub async fn exec_post(
    State(state): State<AppState>,
    payload: Result<Json<ActionBody>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(body)) => dispatch_body(&state, body).await,
        Err(rejection) => Err(AppError::BadRequest(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    };
    json_response(result)
}

async fn dispatch_body(state: &AppState, body: ActionBody) -> Result<Value, AppError> {
    tracing::debug!("POST action {}", body.action);

    match Action::parse(&body.action) {
        Some(Action::GetRsvps) => to_data(rsvps::get_rsvps(state).await),
        Some(Action::AddRsvp) => {
            let record = body
                .rsvp
                .ok_or_else(|| AppError::BadRequest("Missing rsvp".to_string()))?;
            to_data(rsvps::add_rsvp(state, record).await)
        }
        Some(Action::UpdateRsvp) => {
            let record = body
                .rsvp
                .ok_or_else(|| AppError::BadRequest("Missing rsvp".to_string()))?;
            to_data(rsvps::update_rsvp(state, record).await)
        }
        Some(Action::UploadPhoto) => {
            let request = UploadRequest {
                filename: body.filename.unwrap_or_default(),
                file_data: body
                    .file_data
                    .ok_or_else(|| AppError::Validation("Missing fileData".to_string()))?,
                mime_type: body.mime_type.unwrap_or_else(|| "image/png".to_string()),
            };
            to_data(gallery::upload_photo(state, request).await)
        }
        Some(Action::GetGalleryImages) => to_data(gallery::get_gallery_images(state).await),
        Some(Action::GetLastModified) => to_data(rsvps::get_last_modified(state).await),
        Some(Action::Test) => Ok(diagnostics::test_echo(state, &BTreeMap::new())),
        None => Err(AppError::BadRequest(format!(
            "Unknown action: {}",
            body.action
        ))),
    }
}

fn to_data<T: Serialize>(result: Result<T, AppError>) -> Result<Value, AppError> {
    Ok(serde_json::to_value(result?)?)
}

fn log_failure(err: &AppError) {
    if err.status_code().is_server_error() {
        tracing::error!("Action failed: {}", err);
    } else {
        tracing::warn!("Action rejected: {}", err);
    }
}

/// Plain JSON envelope; errors keep their HTTP status.
fn json_response(result: Result<Value, AppError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(Envelope::ok(data))).into_response(),
        Err(err) => {
            log_failure(&err);
            err.into_response()
        }
    }
}

/// Envelope wrapped as `callback(<json>);`.
///
/// Always 200: a script tag cannot read the status, only the payload.
fn callback_response(callback: &str, result: Result<Value, AppError>) -> Response {
    if !is_valid_callback(callback) {
        let err = AppError::BadRequest("Invalid callback name".to_string());
        log_failure(&err);
        return err.into_response();
    }

    let body = match result {
        Ok(data) => serde_json::to_string(&Envelope::ok(data)),
        Err(err) => {
            log_failure(&err);
            serde_json::to_string(&ErrorResponse::new(&err))
        }
    };

    match body {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/javascript")],
            format!("{}({});", callback, json),
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

/// Callback names are limited to identifier-ish characters so the response
/// cannot inject script.
pub fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_names() {
        assert!(is_valid_callback("jsonp_callback_1729866000000_k3j2h1g0f"));
        assert!(is_valid_callback("window.handlers.$cb"));
        assert!(!is_valid_callback(""));
        assert!(!is_valid_callback("alert(1);cb"));
        assert!(!is_valid_callback("cb</script>"));
    }
}
