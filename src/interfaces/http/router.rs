//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiError, ErrorDetail, ErrorResponse};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::rate_limit::{rate_limit_middleware, RateLimiter};
use super::modules::request_id::request_id_middleware;
use super::modules::transactions::{self, TransactionAppState};
use crate::application::TransactionQueryService;
use crate::config::{AppConfig, CorsConfig};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        transactions::list_transactions,
        transactions::list_transactions_in_range,
        transactions::transactions_by_time,
        transactions::search_transactions,
        transactions::get_transaction,
    ),
    components(schemas(
        ErrorResponse,
        ErrorDetail,
        health::HealthResponse,
        health::ComponentHealth,
        transactions::TransactionDto,
        transactions::PaginationDto,
        transactions::TransactionPageDto,
        transactions::SearchResultDto,
        transactions::TimeBucketDto,
    )),
    tags(
        (name = "Health", description = "Service and database health"),
        (name = "Transactions", description = "Read-only Bitcoin transaction queries"),
    ),
    info(
        title = "Bitcoin Transaction API",
        version = "1.0.0",
        description = "Paginated read API over a TimescaleDB table of Bitcoin transactions",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let exposed = [
        transactions::X_TOTAL_COUNT,
        transactions::X_TOTAL_PAGES,
        transactions::X_CURRENT_PAGE,
        transactions::X_PER_PAGE,
    ]
    .map(HeaderName::from_static);

    let origin = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(exposed)
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// `TimeoutLayer` answers with an empty 408.
async fn envelope_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::request_timeout().into_response()
    } else {
        response
    }
}

/// Create the API router with all routes.
///
/// `rate_limiter` is `None` when rate limiting is disabled; `/metrics` is
/// only mounted when a Prometheus handle is supplied.
pub fn create_api_router(
    service: Arc<TransactionQueryService>,
    config: &AppConfig,
    metrics_handle: Option<PrometheusHandle>,
    rate_limiter: Option<RateLimiter>,
) -> Router {
    let tx_state = TransactionAppState {
        service: Arc::clone(&service),
    };
    let health_state = HealthState {
        service,
        started_at: Arc::new(Instant::now()),
    };

    let tx_routes = Router::new()
        .route("/transactions", get(transactions::list_transactions))
        .route(
            "/transactions/range",
            get(transactions::list_transactions_in_range),
        )
        .route(
            "/transactions/by-time",
            get(transactions::transactions_by_time),
        )
        .route(
            "/transactions/search",
            get(transactions::search_transactions),
        )
        .route("/transaction/{hash}", get(transactions::get_transaction))
        .with_state(tx_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let mut api = tx_routes.merge(health_routes);
    if let Some(limiter) = rate_limiter {
        api = api.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut app = Router::new().merge(swagger_routes).merge(api);

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route("/metrics", get(prometheus_metrics))
            .with_state(MetricsState { handle });
        app = app.merge(metrics_routes);
    }

    app.fallback(route_not_found)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(middleware::map_response(envelope_timeout))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
