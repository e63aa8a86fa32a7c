//! Behavior tests for the HTTP surface.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, using
//! stub gateways in place of the live market data provider.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use stock_dashboard_api::catalog::memory::MemoryCatalog;
use stock_dashboard_api::gateway::YahooGateway;
use stock_dashboard_api::models::stock::InfoRecord;
use stock_dashboard_api::{
    build_router, AppState, CatalogStore, Company, Config, DashboardError, MarketDataGateway,
    Period, PricePoint, Result, StockService,
};

struct OfflineGateway;

#[async_trait]
impl MarketDataGateway for OfflineGateway {
    fn provider_code(&self) -> &'static str {
        "OFFLINE"
    }

    async fn fetch_series(&self, symbol: &str, _period: Period) -> Result<Vec<PricePoint>> {
        Err(DashboardError::UpstreamUnavailable(format!("no route to host for {}", symbol)))
    }

    async fn fetch_summary(&self, symbol: &str) -> Result<InfoRecord> {
        Err(DashboardError::UpstreamUnavailable(format!("no route to host for {}", symbol)))
    }
}

struct LiveGateway;

#[async_trait]
impl MarketDataGateway for LiveGateway {
    fn provider_code(&self) -> &'static str {
        "LIVE"
    }

    async fn fetch_series(&self, _symbol: &str, period: Period) -> Result<Vec<PricePoint>> {
        let rows = match period {
            Period::FiveDays => 5,
            _ => 2,
        };
        Ok((1..=rows)
            .map(|day| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                open: 100.0,
                high: 101.5,
                low: 99.25,
                close: 100.75,
                volume: 1_000 * u64::from(day),
            })
            .collect())
    }

    async fn fetch_summary(&self, _symbol: &str) -> Result<InfoRecord> {
        let info = json!({
            "longName": "Tata Consultancy Services Limited",
            "currentPrice": 3850.4,
            "previousClose": 3801.0,
            "dayHigh": 3862.0,
            "dayLow": 3795.15,
            "averageVolume": 2250000,
            "marketCap": 13930000000000u64
        });
        Ok(info.as_object().cloned().unwrap())
    }
}

struct BrokenCatalog;

#[async_trait]
impl CatalogStore for BrokenCatalog {
    fn backend_name(&self) -> &'static str {
        "broken"
    }

    async fn list_companies(&self) -> Result<Vec<Company>> {
        Err(DashboardError::StoreError(sqlx::Error::PoolClosed))
    }
}

fn router_with(
    catalog: Arc<dyn CatalogStore + Send + Sync>,
    gateway: Arc<dyn MarketDataGateway + Send + Sync>,
) -> Router {
    let stocks = StockService::new(&Config::new(), gateway).unwrap();
    build_router(AppState::new(catalog, stocks))
}

fn offline_router() -> Router {
    router_with(Arc::new(MemoryCatalog::new()), Arc::new(OfflineGateway))
}

fn live_router() -> Router {
    router_with(Arc::new(MemoryCatalog::new()), Arc::new(LiveGateway))
}

async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, headers, body) = send(router, Method::GET, uri).await;
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["access-control-allow-origin"], "*");
    (status, serde_json::from_slice(&body).unwrap())
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn catalog_returns_the_same_twelve_symbols_every_time() {
    let (status, first) = get_json(offline_router(), "/api/companies").await;
    let (_, second) = get_json(offline_router(), "/api/companies").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let companies = first.as_array().unwrap();
    assert_eq!(companies.len(), 12);
    assert!(companies
        .iter()
        .all(|c| !c["symbol"].as_str().unwrap().is_empty()));
    assert_eq!(companies[0]["symbol"], "RELIANCE.NS");
    assert_eq!(companies[9]["name"], "Larsen & Toubro Limited");
}

#[tokio::test]
async fn catalog_store_failure_is_a_structured_500() {
    let router = router_with(Arc::new(BrokenCatalog), Arc::new(OfflineGateway));
    let (status, body) = get_json(router, "/api/companies").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("Catalog store error"));
}

// =============================================================================
// Series
// =============================================================================

#[tokio::test]
async fn series_from_upstream_is_wrapped_as_success() {
    let (status, body) = get_json(live_router(), "/api/stock/TCS.NS").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "TCS.NS");
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["data"][0],
        json!({
            "date": "2024-05-01",
            "open": 100.0,
            "high": 101.5,
            "low": 99.25,
            "close": 100.75,
            "volume": 1000
        })
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn series_passes_the_requested_period_upstream() {
    let (_, body) = get_json(live_router(), "/api/stock/TCS.NS?period=5d").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn series_falls_back_to_synthetic_data_when_upstream_fails() {
    let (status, body) = get_json(offline_router(), "/api/stock/UNKNOWNSYMBOL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "UNKNOWNSYMBOL");
    assert_eq!(body["status"], "success");

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 30);

    let mut previous: Option<NaiveDate> = None;
    for point in data {
        let date = NaiveDate::parse_from_str(point["date"].as_str().unwrap(), "%Y-%m-%d").unwrap();
        if let Some(prev) = previous {
            assert!(prev < date);
        }
        previous = Some(date);

        let open = point["open"].as_f64().unwrap();
        let high = point["high"].as_f64().unwrap();
        let low = point["low"].as_f64().unwrap();
        let close = point["close"].as_f64().unwrap();
        assert!(low <= open && open <= high);
        assert!(low <= close && close <= high);

        let volume = point["volume"].as_u64().unwrap();
        assert!((100_000..=10_000_000).contains(&volume));
    }
}

#[tokio::test]
async fn unrecognized_period_still_yields_a_series() {
    let (status, body) = get_json(live_router(), "/api/stock/TCS.NS?period=forever").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"].as_array().unwrap().len(), 30);
}

// =============================================================================
// Summary
// =============================================================================

#[tokio::test]
async fn summary_projects_upstream_record_with_defaults() {
    let (status, body) = get_json(live_router(), "/api/stock/TCS.NS/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "TCS.NS");
    assert_eq!(body["name"], "Tata Consultancy Services Limited");
    assert_eq!(body["currentPrice"], 3850.4);
    assert_eq!(body["avgVolume"], 2250000);
    assert_eq!(body["marketCap"], 13930000000000u64);
    // 上游未提供的字段
    assert_eq!(body["fiftyTwoWeekHigh"], 0.0);
    assert_eq!(body["volume"], 0);
    assert_eq!(body["sector"], "N/A");
}

#[tokio::test]
async fn summary_returns_fixed_mock_when_upstream_fails() {
    let (status, body) = get_json(offline_router(), "/api/stock/ANY/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "symbol": "ANY",
            "name": "Mock Company (ANY)",
            "currentPrice": 1250.50,
            "previousClose": 1245.30,
            "dayHigh": 1260.75,
            "dayLow": 1240.20,
            "fiftyTwoWeekHigh": 1350.00,
            "fiftyTwoWeekLow": 950.00,
            "volume": 2500000,
            "avgVolume": 2000000,
            "marketCap": 125000000000u64,
            "sector": "Technology"
        })
    );
}

// =============================================================================
// Discovery, CORS and unknown routes
// =============================================================================

#[tokio::test]
async fn index_lists_the_endpoints() {
    let (status, body) = get_json(offline_router(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["endpoints"]["companies"], "/api/companies");
    assert_eq!(body["endpoints"]["stock_data"], "/api/stock/{symbol}");
    assert_eq!(body["endpoints"]["stock_summary"], "/api/stock/{symbol}/summary");
}

#[tokio::test]
async fn preflight_on_every_endpoint_is_empty_with_cors_headers() {
    for uri in ["/", "/api/companies", "/api/stock/TCS.NS", "/api/stock/TCS.NS/summary"] {
        let (status, headers, body) = send(offline_router(), Method::OPTIONS, uri).await;

        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(body.is_empty(), "{}", uri);
        assert_eq!(headers["access-control-allow-origin"], "*");

        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("GET"));
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.eq_ignore_ascii_case("content-type"));
    }
}

#[tokio::test]
async fn get_responses_carry_all_cors_headers() {
    let (_, headers, _) = send(offline_router(), Method::GET, "/api/companies").await;

    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers["access-control-allow-methods"].to_str().unwrap().contains("GET"));
    assert_eq!(headers["access-control-allow-headers"], "content-type");
}

#[tokio::test]
async fn unknown_path_is_a_json_404() {
    let (status, body) = get_json(offline_router(), "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("/api/nothing-here"));
}

#[tokio::test]
async fn wrong_method_is_a_json_405() {
    for uri in ["/", "/api/companies", "/api/stock/TCS.NS", "/api/stock/TCS.NS/summary"] {
        let (status, headers, body) = send(offline_router(), Method::POST, uri).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["access-control-allow-origin"], "*");

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("POST"));
    }
}

#[tokio::test]
async fn undecodable_symbol_is_a_json_400() {
    for uri in ["/api/stock/%FF", "/api/stock/%FF/summary"] {
        let (status, body) = get_json(offline_router(), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("symbol"));
    }
}

// =============================================================================
// Real gateway against a local upstream
// =============================================================================

/// 本地上游：对每个连接都返回 404
async fn spawn_not_found_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found")
                    .await;
            });
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn yahoo_gateway_failure_falls_back_end_to_end() {
    let upstream = spawn_not_found_upstream().await;
    let gateway = YahooGateway::new(&upstream, Duration::from_secs(5)).unwrap();
    let router = router_with(Arc::new(MemoryCatalog::new()), Arc::new(gateway));

    let (status, body) = get_json(router.clone(), "/api/stock/TCS.NS?period=5d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["symbol"], "TCS.NS");
    assert_eq!(body["data"].as_array().unwrap().len(), 30);

    let (status, body) = get_json(router, "/api/stock/TCS.NS/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Mock Company (TCS.NS)");
}
