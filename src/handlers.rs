use crate::eligibility::EligibilityService;
use crate::errors::AppError;
use crate::models::RawForm;
use crate::openapi;
use crate::response::EligibilityResult;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Path of the eligibility endpoint.
pub const ELIGIBILITY_PATH: &str = "/los/v1/online_leads_eligibility_api";

/// Shared application state injected into handlers.
pub struct AppState {
    /// Eligibility pipeline with its collaborators.
    pub service: EligibilityService,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Decodes an `application/x-www-form-urlencoded` body. When a key repeats,
/// the first value wins.
pub fn parse_form(body: &[u8]) -> RawForm {
    let mut form = RawForm::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        form.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    form
}

/// POST /los/v1/online_leads_eligibility_api
///
/// Screens a loan lead. Request-level and rule failures are answered with
/// HTTP 200 and the eligibility envelope; only internal failures map to 5xx.
#[utoipa::path(
    post,
    path = "/los/v1/online_leads_eligibility_api",
    tag = "los",
    responses(
        (status = 200, description = "Eligibility envelope for every evaluated or rejected request", body = EligibilityResult),
        (status = 500, description = "Threshold configuration or database failure"),
        (status = 502, description = "Pincode service failure")
    )
)]
pub async fn online_leads_eligibility(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<EligibilityResult>, AppError> {
    let form = parse_form(&body);
    tracing::info!(
        "POST {} - application_id: {}",
        ELIGIBILITY_PATH,
        form.get("application_id").map(String::as_str).unwrap_or("unknown")
    );

    let result = state.service.evaluate(&form).await?;

    tracing::info!(
        "Eligibility response: request_status={:?}, status={:?}, code={}",
        result.request_status,
        result.body.online_leads_eligibility_status,
        result.body.error_response_code
    );
    Ok(Json(result))
}

/// Any method other than POST on the eligibility path.
pub async fn invalid_method(method: Method) -> Json<EligibilityResult> {
    tracing::warn!("Rejected {} {}", method, ELIGIBILITY_PATH);
    Json(EligibilityResult::request_failure("invalid API request method"))
}

/// Eligibility endpoint and API docs. Rate limiting is layered on by the caller.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/docs", get(openapi::serve_swagger_ui))
        .route("/api-docs/openapi.json", get(openapi::serve_openapi_spec))
        .route(
            ELIGIBILITY_PATH,
            post(online_leads_eligibility).fallback(invalid_method),
        )
}

/// Final application: health check outside `protected`, tracing and CORS on everything.
pub fn app(state: Arc<AppState>, protected: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
