use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{error_response, truncate_diagnostic, AppState};

/// `GET /veeqo-orders`
///
/// Relays one page of orders from the upstream API verbatim. Upstream error
/// detail is logged truncated and never returned to the caller.
pub async fn veeqo_orders(State(state): State<AppState>) -> Response {
    let Some(client) = &state.veeqo else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "VEEQO_API_KEY not set");
    };

    match client.list_orders().await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            tracing::error!(
                error = %truncate_diagnostic(&e.to_string()),
                "veeqo orders fetch failed"
            );
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch Veeqo orders",
            )
        }
    }
}
