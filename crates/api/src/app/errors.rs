use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use chatorder_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Store(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// `{"ok": false}` with the given status.
pub fn rejected(status: StatusCode) -> axum::response::Response {
    (status, axum::Json(json!({ "ok": false }))).into_response()
}

/// `{"ok": false, "error": message}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "ok": false,
            "error": message.into(),
        })),
    )
        .into_response()
}
