use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use svckit::errors::DashError;

use crate::charts::ChartKind;
use crate::dashboard::Dashboard;
use crate::filters::FilterSelection;

pub fn build_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/filters", get(handle_filters))
        .route("/dashboard", get(handle_dashboard_unfiltered).post(handle_dashboard))
        .route("/summaries", post(handle_summaries))
        .route("/charts/:kind", post(handle_chart))
        .route("/cache/refresh", post(handle_refresh))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(dashboard)
}

pub async fn start_server(dashboard: Arc<Dashboard>, port: u16) -> anyhow::Result<()> {
    let app = build_router(dashboard);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ICSAP dashboard API listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Bad filter values are the caller's; upstream (warehouse) failures are a
/// bad gateway; anything else is ours.
fn failure(e: DashError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if e.is_data_source() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error!("Request failed ({}): {}", status, e);
    (
        status,
        Json(json!({
            "success": false,
            "error": e.to_string(),
        })),
    )
        .into_response()
}

async fn handle_health(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    let driver = dashboard.repository().driver_name().to_string();
    match dashboard.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": "icsap-dash",
                "driver": driver,
                "timestamp": chrono::Utc::now(),
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "driver": driver,
                    "error": e.to_string(),
                })),
            )
        }
    }
}

async fn handle_filters(State(dashboard): State<Arc<Dashboard>>) -> Response {
    match dashboard.options().await {
        Ok(options) => Json(options).into_response(),
        Err(e) => failure(e),
    }
}

async fn handle_dashboard_unfiltered(State(dashboard): State<Arc<Dashboard>>) -> Response {
    render_view(&dashboard, &FilterSelection::all()).await
}

async fn handle_dashboard(
    State(dashboard): State<Arc<Dashboard>>,
    Json(selection): Json<FilterSelection>,
) -> Response {
    render_view(&dashboard, &selection).await
}

async fn render_view(dashboard: &Dashboard, selection: &FilterSelection) -> Response {
    match dashboard.render(selection).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => failure(e),
    }
}

async fn handle_summaries(
    State(dashboard): State<Arc<Dashboard>>,
    Json(selection): Json<FilterSelection>,
) -> Response {
    match dashboard.summaries(&selection).await {
        Ok(summaries) => Json(summaries).into_response(),
        Err(e) => failure(e),
    }
}

async fn handle_chart(
    State(dashboard): State<Arc<Dashboard>>,
    Path(kind): Path<String>,
    Json(selection): Json<FilterSelection>,
) -> Response {
    let kind: ChartKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    };
    match dashboard.chart(&selection, kind).await {
        Ok(figure) => Json(figure).into_response(),
        Err(e) => failure(e),
    }
}

async fn handle_refresh(State(dashboard): State<Arc<Dashboard>>) -> Response {
    match dashboard.refresh().await {
        Ok(rows) => Json(json!({
            "success": true,
            "rows": rows,
        }))
        .into_response(),
        Err(e) => failure(e),
    }
}

async fn handle_metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use svckit::config::WarehouseConfig;
    use svckit::database::{WarehouseConnection, WarehouseDriver};
    use svckit::types::RowData;
    use tower::ServiceExt;

    use crate::config::DashboardSettings;
    use crate::repository::AdmissionRepository;

    fn demo_router() -> Router {
        let config = WarehouseConfig {
            driver: WarehouseDriver::Demo,
            demo_months: 13,
            ..Default::default()
        };
        let repository = AdmissionRepository::from_config(&config).unwrap();
        let dashboard = Dashboard::new(Arc::new(repository), DashboardSettings::default());
        build_router(Arc::new(dashboard))
    }

    struct DownWarehouse;

    #[async_trait]
    impl WarehouseConnection for DownWarehouse {
        async fn query(&self, _sql: &str) -> Result<Vec<RowData>, DashError> {
            Err(DashError::Auth("token expired".to_string()))
        }

        async fn health_check(&self) -> Result<(), DashError> {
            Err(DashError::Network("unreachable".to_string()))
        }

        fn driver_name(&self) -> &str {
            "down"
        }
    }

    fn failing_router() -> Router {
        let repository = AdmissionRepository::new(Arc::new(DownWarehouse), "SELECT 1");
        let dashboard = Dashboard::new(Arc::new(repository), DashboardSettings::default());
        build_router(Arc::new(dashboard))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(demo_router(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["driver"], "demo");
    }

    #[tokio::test]
    async fn test_filters_lists_every_dimension() {
        let (status, body) = send(demo_router(), get("/filters")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dimensions"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_unfiltered_dashboard() {
        let (status, body) = send(demo_router(), get("/dashboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows_total"], body["rows_selected"]);
        assert_eq!(body["charts"].as_array().unwrap().len(), 4);
        assert_eq!(body["charts"][0]["kind"], "split");
        assert_eq!(body["charts"][0]["figure"]["series"][0]["type"], "pie");
        assert_eq!(
            body["summaries"]["monthly"]["points"].as_array().unwrap().len(),
            12
        );
    }

    #[tokio::test]
    async fn test_filtered_dashboard() {
        let selection = json!({ "selected": { "icsap": ["ICSAP"] } });
        let (status, body) = send(demo_router(), post_json("/dashboard", selection)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["rows_selected"].as_u64().unwrap() < body["rows_total"].as_u64().unwrap());
        assert_eq!(body["summaries"]["split"]["rows"][1]["admissions"], 0);
    }

    #[tokio::test]
    async fn test_summaries_with_empty_selection() {
        let selection = json!({ "selected": { "year": [] } });
        let (status, body) = send(demo_router(), post_json("/summaries", selection)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["split"]["total"], 0);
        assert_eq!(body["pareto"]["rows"], json!([]));
    }

    #[tokio::test]
    async fn test_single_chart_and_unknown_kind() {
        let (status, body) = send(demo_router(), post_json("/charts/pareto", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["series"][0]["type"], "bar");
        assert_eq!(body["series"][1]["yAxisIndex"].as_f64(), Some(1.0));

        let (status, body) = send(demo_router(), post_json("/charts/radar", json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_filter_values_are_coerced_or_rejected() {
        let selection = json!({ "selected": { "cost_quintile": [2], "year": ["2024"] } });
        let (status, body) = send(demo_router(), post_json("/dashboard", selection)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["rows_selected"].as_u64().unwrap() > 0);

        let selection = json!({ "selected": { "year": ["abc"] } });
        let (status, body) = send(demo_router(), post_json("/dashboard", selection)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid filter"));

        let selection = json!({ "selected": { "month": ["março"] } });
        let (status, _) = send(demo_router(), post_json("/charts/split", selection)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cache_refresh() {
        let (status, body) = send(demo_router(), post_json("/cache/refresh", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["rows"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_data_source_failure_is_bad_gateway() {
        let (status, body) = send(failing_router(), get("/dashboard")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("token expired"));

        let (status, _) = send(failing_router(), get("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let router = demo_router();
        let _ = send(router.clone(), get("/dashboard")).await;
        let response = router.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
