pub mod handlers;

use std::sync::Arc;

use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::catalog::base::CatalogStore;
use crate::errors::DashboardError;
use crate::models::stock::ErrorResponse;
use crate::services::stock_service::StockService;

/// 请求处理共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore + Send + Sync>,
    pub stocks: Arc<StockService>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore + Send + Sync>, stocks: StockService) -> Self {
        Self {
            catalog,
            stocks: Arc::new(stocks),
        }
    }
}

const ALLOWED_METHODS: &str = "GET,OPTIONS";
const ALLOWED_HEADERS: &str = "content-type";

/// 构建路由；所有响应（包括预检）都带 CORS 头，错误一律为 JSON
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).fallback(handlers::method_not_allowed))
        .route("/api/companies", get(handlers::companies).fallback(handlers::method_not_allowed))
        .route("/api/stock/:symbol", get(handlers::stock_series).fallback(handlers::method_not_allowed))
        .route(
            "/api/stock/:symbol/summary",
            get(handlers::stock_summary).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(cors_layer())
}

// OPTIONS 请求由 CorsLayer 直接应答：200，空响应体
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
