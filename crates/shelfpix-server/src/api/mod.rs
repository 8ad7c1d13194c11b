mod image;
mod orders;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shelfpix_core::AppConfig;
use shelfpix_resolver::PageClient;
use shelfpix_veeqo::VeeqoClient;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

/// Timeout for the upstream orders call. Independent of the page-fetch
/// timeout, which is tuned for slow storefronts.
const VEEQO_TIMEOUT_SECS: u64 = 30;

/// Cap on upstream error detail recorded server-side. Detail is logged only,
/// never returned to callers.
const DIAGNOSTIC_MAX_CHARS: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub(crate) page_client: Arc<PageClient>,
    /// `None` when no credential was configured at startup; the orders route
    /// then fails fast without any network call.
    pub(crate) veeqo: Option<Arc<VeeqoClient>>,
}

impl AppState {
    /// Builds the shared handler state from application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let page_client = PageClient::new(
            config.fetch_timeout_secs,
            config.max_redirects,
            &config.user_agent,
        )?;
        let veeqo = config
            .veeqo_api_key
            .as_deref()
            .map(|key| VeeqoClient::new(key, VEEQO_TIMEOUT_SECS))
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            page_client: Arc::new(page_client),
            veeqo,
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

pub(super) fn error_response(status: StatusCode, message: &'static str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// Truncates a diagnostic string for server-side logging, respecting char
/// boundaries.
pub(super) fn truncate_diagnostic(msg: &str) -> &str {
    if msg.len() <= DIAGNOSTIC_MAX_CHARS {
        return msg;
    }
    let mut end = DIAGNOSTIC_MAX_CHARS;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    &msg[..end]
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let limited_routes = Router::new()
        .route("/veeqo-orders", get(orders::veeqo_orders))
        .route("/scrape-image", get(image::scrape_image))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ));

    Router::new()
        .merge(public_routes)
        .merge(limited_routes)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthData { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{header as wm_header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(veeqo: Option<VeeqoClient>) -> AppState {
        AppState {
            page_client: Arc::new(
                PageClient::new(5, 5, "shelfpix-test/0.1").expect("page client"),
            ),
            veeqo: veeqo.map(Arc::new),
        }
    }

    fn test_app(veeqo: Option<VeeqoClient>) -> Router {
        build_app(
            test_state(veeqo),
            RateLimitState::new(60, Duration::from_secs(60)),
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn truncate_diagnostic_leaves_short_strings_alone() {
        assert_eq!(truncate_diagnostic("boom"), "boom");
    }

    #[test]
    fn truncate_diagnostic_caps_long_strings() {
        let long = "x".repeat(2_000);
        assert_eq!(truncate_diagnostic(&long).len(), 500);
    }

    #[test]
    fn truncate_diagnostic_respects_char_boundaries() {
        let long = "é".repeat(400); // 800 bytes, boundary falls mid-char
        let truncated = truncate_diagnostic(&long);
        assert!(truncated.len() <= 500);
        assert!(long.starts_with(truncated));
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (status, json) = get_json(test_app(None), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"].as_str(), Some("ok"));
    }

    #[tokio::test]
    async fn scrape_image_without_params_is_bad_request() {
        let (status, json) = get_json(test_app(None), "/scrape-image").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"].as_str(),
            Some("Valid url parameter is required")
        );
    }

    #[tokio::test]
    async fn scrape_image_rejects_disallowed_scheme_without_fetching() {
        // file: scheme fails validation; a fetch attempt would surface as 500.
        let (status, json) =
            get_json(test_app(None), "/scrape-image?url=file:///etc/passwd").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"].as_str(),
            Some("Valid url parameter is required")
        );
    }

    #[tokio::test]
    async fn scrape_image_rejects_malformed_url() {
        let (status, _) = get_json(test_app(None), "/scrape-image?url=not-a-url").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scrape_image_returns_image_url_from_og_tag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta property="og:image" content="https://x.test/a.jpg?x=1"></head></html>"#,
            ))
            .mount(&server)
            .await;

        let uri = format!("/scrape-image?url={}/product", server.uri());
        let (status, json) = get_json(test_app(None), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["imageUrl"].as_str(), Some("https://x.test/a.jpg"));
    }

    #[tokio::test]
    async fn scrape_image_falls_through_to_wide_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><img width="200" src="/icon.png"><img width="400" src="/p/b.jpg"></body></html>"#,
            ))
            .mount(&server)
            .await;

        let uri = format!("/scrape-image?url={}/plain", server.uri());
        let (status, json) = get_json(test_app(None), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["imageUrl"].as_str(),
            Some(format!("{}/p/b.jpg", server.uri()).as_str())
        );
    }

    #[tokio::test]
    async fn scrape_image_not_found_when_no_tier_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>no images here</p></body></html>"),
            )
            .mount(&server)
            .await;

        let uri = format!("/scrape-image?url={}/empty", server.uri());
        let (status, json) = get_json(test_app(None), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"].as_str(), Some("Image not found"));
    }

    #[tokio::test]
    async fn scrape_image_maps_upstream_failure_to_scrape_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let uri = format!("/scrape-image?url={}/broken", server.uri());
        let (status, json) = get_json(test_app(None), &uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"].as_str(), Some("Scrape failed"));
    }

    #[tokio::test]
    async fn veeqo_orders_without_key_is_config_error() {
        let (status, json) = get_json(test_app(None), "/veeqo-orders").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"].as_str(), Some("VEEQO_API_KEY not set"));
    }

    #[tokio::test]
    async fn veeqo_orders_relays_upstream_body_verbatim() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "orders": [ { "id": 7 } ] });
        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("per_page", "250"))
            .and(wm_header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let veeqo =
            VeeqoClient::with_base_url("test-key", 5, &server.uri()).expect("veeqo client");
        let (status, json) = get_json(test_app(Some(veeqo)), "/veeqo-orders").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, body);
    }

    #[tokio::test]
    async fn veeqo_orders_sanitizes_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "message": "bad key: vq-secret" })),
            )
            .mount(&server)
            .await;

        let veeqo =
            VeeqoClient::with_base_url("test-key", 5, &server.uri()).expect("veeqo client");
        let (status, json) = get_json(test_app(Some(veeqo)), "/veeqo-orders").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json["error"].as_str(),
            Some("Failed to fetch Veeqo orders"),
            "upstream detail must never reach the caller"
        );
    }

    #[tokio::test]
    async fn rate_limit_rejects_before_handler_logic() {
        let app = build_app(test_state(None), RateLimitState::new(2, Duration::from_secs(60)));

        for _ in 0..2 {
            let (status, _) = get_json(app.clone(), "/veeqo-orders").await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }

        // Third request in the window is rejected before the handler runs:
        // 429, not the handler's 500 config error.
        let (status, json) = get_json(app, "/veeqo-orders").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"].as_str(), Some("Too many requests"));
    }

    #[tokio::test]
    async fn health_is_not_rate_limited() {
        let app = build_app(test_state(None), RateLimitState::new(1, Duration::from_secs(60)));
        let (status, _) = get_json(app.clone(), "/scrape-image").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for _ in 0..3 {
            let (status, _) = get_json(app.clone(), "/health").await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn responses_carry_request_id_header() {
        let response = test_app(None)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "test-id-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("test-id-123")
        );
    }
}
