use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use chatorder_core::CustomerPhone;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /`: one incoming message in, one reply out.
pub async fn receive_message(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::IncomingMessage>,
) -> axum::response::Response {
    if !services.accepts_key(body.key.as_deref()) {
        return errors::rejected(StatusCode::UNAUTHORIZED);
    }

    let phone: CustomerPhone = match body.sender().map(|raw| raw.parse()) {
        Some(Ok(phone)) => phone,
        Some(Err(e)) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
        None => return errors::json_error(StatusCode::BAD_REQUEST, "missing sender phone"),
    };
    tracing::debug!(chat_id = ?body.chat_id, "message received");

    let text = body.text.unwrap_or_default();
    match services
        .handle_message(body.data_api.as_deref(), &phone, &text)
        .await
    {
        Ok(reply) => Json(dto::ReplyResponse { reply }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
