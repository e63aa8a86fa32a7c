use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::errors::Result;
use crate::models::company::Company;
use crate::models::stock::{ErrorResponse, StockSeriesResponse, StockSummary};

#[derive(Debug, Serialize, Deserialize)]
pub struct Endpoints {
    pub companies: String,
    pub stock_data: String,
    pub stock_summary: String,
}

/// `GET /` 返回的服务发现文档
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiIndex {
    pub message: String,
    pub endpoints: Endpoints,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SeriesParams {
    pub period: Option<String>,
}

pub async fn index() -> Json<ApiIndex> {
    Json(ApiIndex {
        message: "Stock Market Dashboard API is running!".to_string(),
        endpoints: Endpoints {
            companies: "/api/companies".to_string(),
            stock_data: "/api/stock/{symbol}".to_string(),
            stock_summary: "/api/stock/{symbol}/summary".to_string(),
        },
        status: "online".to_string(),
    })
}

pub async fn companies(State(state): State<AppState>) -> Result<Json<Vec<Company>>> {
    let companies = state.catalog.list_companies().await?;
    Ok(Json(companies))
}

/// 统一的 JSON 错误响应
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

// 路径参数无法解码（如非 UTF-8 的百分号编码）时返回 JSON 400
fn bad_path(rejection: PathRejection) -> ApiError {
    api_error(rejection.status(), rejection.body_text())
}

pub async fn stock_series(
    State(state): State<AppState>,
    symbol: std::result::Result<Path<String>, PathRejection>,
    params: Option<Query<SeriesParams>>,
) -> std::result::Result<Json<StockSeriesResponse>, ApiError> {
    let Path(symbol) = symbol.map_err(bad_path)?;
    let period = params.and_then(|Query(p)| p.period);
    Ok(Json(state.stocks.series(&symbol, period.as_deref()).await))
}

pub async fn stock_summary(
    State(state): State<AppState>,
    symbol: std::result::Result<Path<String>, PathRejection>,
) -> std::result::Result<Json<StockSummary>, ApiError> {
    let Path(symbol) = symbol.map_err(bad_path)?;
    Ok(Json(state.stocks.summary(&symbol).await))
}

pub async fn not_found(uri: Uri) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("No route for {}", uri.path()))
}

/// 路径存在但方法不被支持
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    api_error(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} not allowed for {}", method, uri.path()),
    )
}
