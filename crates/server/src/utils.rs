use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::state::ErrorResponse;

pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn json_error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_error(status, message).into_response()
}

/// 307 to `url`. Characters a header cannot carry are percent-encoded first.
pub fn redirect_temporary(url: &str) -> Response {
    match HeaderValue::from_str(&encode_location(url)) {
        Ok(location) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
            response.headers_mut().insert(header::LOCATION, location);
            response
        }
        Err(_) => json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "invalid redirect target"),
    }
}

/// Spaces and control bytes; `utf8_percent_encode` always escapes non-ASCII. URL structure
/// (`/`, `:`, `?`, `%`) passes through.
const LOCATION: &AsciiSet = &CONTROLS.add(b' ');

pub fn encode_location(url: &str) -> String {
    utf8_percent_encode(url, LOCATION).to_string()
}
