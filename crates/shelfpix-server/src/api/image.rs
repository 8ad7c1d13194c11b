use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shelfpix_resolver::{extract_image_url, FetchTarget};

use super::{error_response, truncate_diagnostic, AppState};

#[derive(Debug, Deserialize)]
pub struct ScrapeImageParams {
    url: Option<String>,
    asin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeImageBody {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

/// `GET /scrape-image?url=…` or `?asin=…`
///
/// Validates the target, fetches the page once, and runs the extraction
/// chain. A supplied `url` takes precedence over `asin`.
pub async fn scrape_image(
    State(state): State<AppState>,
    Query(params): Query<ScrapeImageParams>,
) -> Response {
    let target = match (params.url, params.asin) {
        (Some(url), _) => FetchTarget::Url(url),
        (None, Some(asin)) => FetchTarget::Asin(asin),
        (None, None) => {
            return error_response(StatusCode::BAD_REQUEST, "Valid url parameter is required")
        }
    };

    // Validation happens before any network I/O.
    let page_url = match target.resolve() {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "rejected scrape target");
            return error_response(StatusCode::BAD_REQUEST, "Valid url parameter is required");
        }
    };

    let doc = match state.page_client.fetch_page(page_url).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::error!(
                error = %truncate_diagnostic(&e.to_string()),
                "scrape fetch failed"
            );
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Scrape failed");
        }
    };

    match extract_image_url(&doc) {
        Some(image_url) => (StatusCode::OK, Json(ScrapeImageBody { image_url })).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Image not found"),
    }
}
