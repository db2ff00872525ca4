use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// Bodies use the API's `{"message": ...}` shape so the client surfaces them unchanged.
fn message(status: StatusCode, msg: &str) -> Response {
    (status, Json(serde_json::json!({ "message": msg }))).into_response()
}

pub(super) fn unauthorized() -> Response {
    message(StatusCode::UNAUTHORIZED, "Bad credentials")
}

pub(super) fn not_found() -> Response {
    message(StatusCode::NOT_FOUND, "Not Found")
}

pub(super) fn bad_request(msg: &str) -> Response {
    message(StatusCode::UNPROCESSABLE_ENTITY, msg)
}

pub(super) fn conflict(msg: &str) -> Response {
    message(StatusCode::CONFLICT, msg)
}
