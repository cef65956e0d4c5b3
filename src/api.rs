// REST API with Axum - JSON views for the dashboard page

use crate::error::CostError;
use crate::view::{ComparisonView, Dashboard, Metric, TrendSeries, ViewRequest};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. The dashboard is immutable, so no lock.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct InstitutionsResponse {
    baseline: String,
    default_year: String,
    years: Vec<String>,
    institutions: Vec<String>,
    annual_label: String,
    projected_label: String,
    difference_label: String,
}

#[derive(Deserialize)]
pub struct ComparisonQuery {
    metric: Option<String>,
    year: Option<String>,
}

#[derive(Deserialize)]
pub struct TrendsRequest {
    #[serde(default)]
    selection: Vec<String>,
}

/// Comparison payload: the view plus display-ready strings
#[derive(Serialize)]
struct ComparisonResponse {
    #[serde(flatten)]
    view: ComparisonView,
    summary: String,
}

impl From<ComparisonView> for ComparisonResponse {
    fn from(view: ComparisonView) -> Self {
        let summary = view.baseline_summary();
        Self { view, summary }
    }
}

// ============================================================================
// Error mapping
// ============================================================================

pub struct ApiError(CostError);

impl From<CostError> for ApiError {
    fn from(err: CostError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CostError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CostError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        tracing::warn!(status = %status, error = %self.0, "Request rejected");

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.0.to_string(),
                "type": self.0.kind(),
            }
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/institutions - Selectable universe plus years
async fn get_institutions(State(state): State<AppState>) -> impl IntoResponse {
    let dashboard = &state.dashboard;

    Json(ApiResponse::ok(InstitutionsResponse {
        baseline: dashboard.baseline().to_string(),
        default_year: dashboard.default_year().to_string(),
        years: dashboard.dataset().years().to_vec(),
        institutions: dashboard.all_names(),
        annual_label: dashboard.metric_label(Metric::Annual),
        projected_label: dashboard.metric_label(Metric::Projected),
        difference_label: dashboard.difference_label(),
    }))
}

/// GET /api/comparison?metric=annual&year=2025-26 - All institutions
async fn get_comparison(
    State(state): State<AppState>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Json<ApiResponse<ComparisonResponse>>, ApiError> {
    let metric = match query.metric.as_deref() {
        Some(raw) => raw.parse::<Metric>()?,
        None => Metric::default(),
    };

    let request = ViewRequest {
        metric,
        year: query.year,
        selection: state.dashboard.all_names(),
    };

    let view = state.dashboard.render_view(&request)?;
    Ok(Json(ApiResponse::ok(view.into())))
}

/// POST /api/comparison - Comparison for an explicit selection
async fn post_comparison(
    State(state): State<AppState>,
    Json(request): Json<ViewRequest>,
) -> Result<Json<ApiResponse<ComparisonResponse>>, ApiError> {
    let view = state.dashboard.render_view(&request)?;
    Ok(Json(ApiResponse::ok(view.into())))
}

/// POST /api/trends - Year-over-year series for a selection
async fn post_trends(
    State(state): State<AppState>,
    Json(request): Json<TrendsRequest>,
) -> Json<ApiResponse<Vec<TrendSeries>>> {
    Json(ApiResponse::ok(state.dashboard.trends(&request.selection)))
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    let state = AppState { dashboard };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/institutions", get(get_institutions))
        .route("/comparison", get(get_comparison).post(post_comparison))
        .route("/trends", axum::routing::post(post_trends))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ProjectionParams;
    use crate::dataset::{Dataset, DEFAULT_BASELINE};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let dashboard =
            Dashboard::new(Dataset::builtin(), DEFAULT_BASELINE, ProjectionParams::default())
                .unwrap();
        router(Arc::new(dashboard))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        send_to(app(), request).await
    }

    async fn send_to(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) =
            send(Request::get("/api/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_institutions() {
        let (status, body) =
            send(Request::get("/api/institutions").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["institutions"].as_array().unwrap().len(), 27);
        assert_eq!(body["data"]["baseline"], "Univ. of San Francisco");
        assert_eq!(body["data"]["default_year"], "2025-26");
        assert_eq!(body["data"]["projected_label"], "Projected 4-Year Total");
        assert_eq!(
            body["data"]["difference_label"],
            "Difference from Univ. of San Francisco"
        );
    }

    #[tokio::test]
    async fn test_labels_follow_settings() {
        let settings = crate::config::Settings::from_toml(
            "[dashboard]\nbaseline = \"Fordham\"\n\n[projection]\nyears = 5\n",
        )
        .unwrap();
        let dashboard = Dashboard::from_settings(Dataset::builtin(), &settings).unwrap();
        let app = router(Arc::new(dashboard));

        let (status, body) = send_to(
            app.clone(),
            Request::get("/api/institutions").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["annual_label"], "Annual Cost");
        assert_eq!(body["data"]["projected_label"], "Projected 5-Year Total");
        assert_eq!(body["data"]["difference_label"], "Difference from Fordham");

        let (status, body) = send_to(
            app,
            post_json(
                "/api/comparison",
                json!({ "metric": "projected", "selection": ["Fordham"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metric_label"], "Projected 5-Year Total");
        assert_eq!(body["data"]["difference_label"], "Difference from Fordham");
        assert_eq!(body["data"]["rows"][0]["difference_from_baseline"], 0.0);
    }

    #[tokio::test]
    async fn test_get_comparison_all() {
        let (status, body) = send(
            Request::get("/api/comparison?metric=projected")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metric"], "projected");
        assert_eq!(body["data"]["rows"].as_array().unwrap().len(), 27);
        assert_eq!(body["data"]["baseline_value"], 390312.0);
    }

    #[tokio::test]
    async fn test_post_comparison_selection() {
        let (status, body) = send(post_json(
            "/api/comparison",
            json!({
                "metric": "annual",
                "selection": ["Univ. of San Francisco", "Fordham"]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = body["data"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["institution"], "Fordham");
        assert_eq!(rows[0]["difference_from_baseline"], 5729.0);
        assert_eq!(
            body["data"]["summary"],
            "For 2025-26, the cost at Univ. of San Francisco is $92,602."
        );
    }

    #[tokio::test]
    async fn test_unknown_metric_is_bad_request() {
        let (status, body) = send(
            Request::get("/api/comparison?metric=median")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_unknown_year_is_not_found() {
        let (status, body) = send(post_json(
            "/api/comparison",
            json!({ "metric": "annual", "year": "1999-00", "selection": [] }),
        ))
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");
    }

    #[tokio::test]
    async fn test_index_page_sets_names_as_text() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(page.contains("textContent"));
        assert!(!page.contains("innerHTML"));
        assert!(page.contains("view.difference_label"));
        assert!(!page.contains("from USF"));
    }

    #[tokio::test]
    async fn test_trends() {
        let (status, body) = send(post_json(
            "/api/trends",
            json!({ "selection": ["Spring Hill"] }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let series = body["data"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["points"][0]["year"], "2022-23");
        assert_eq!(series[0]["points"][3]["cost"], 46800.0);
    }
}
