use crate::config::Config;
use crate::errors::Result;
use crate::gateway::MarketDataGateway;
use crate::generator;
use crate::models::stock::{Period, PricePoint, StockSeriesResponse, StockSummary};
use log::{debug, error, warn};
use std::sync::Arc;

/// 行情服务：调用上游网关，失败时回退到模拟数据
pub struct StockService {
    gateway: Arc<dyn MarketDataGateway + Send + Sync>,
    default_period: Period,
    synthetic_days: u32,
}

impl StockService {
    pub fn new(config: &Config, gateway: Arc<dyn MarketDataGateway + Send + Sync>) -> Result<Self> {
        Ok(Self {
            gateway,
            default_period: config.default_period.parse()?,
            synthetic_days: config.synthetic_days,
        })
    }

    pub fn default_period(&self) -> Period {
        self.default_period
    }

    /// 获取日线序列；上游失败时返回模拟序列，状态仍为 success
    pub async fn series(&self, symbol: &str, period: Option<&str>) -> StockSeriesResponse {
        match self.fetch_series(symbol, period).await {
            Ok(points) => {
                debug!("{} returned {} rows for {}", self.gateway.provider_code(), points.len(), symbol);
                StockSeriesResponse::success(symbol, points)
            }
            Err(e) => {
                if e.is_upstream() {
                    warn!("Falling back to synthetic series for {}: {}", symbol, e);
                } else {
                    error!("Unexpected error fetching {}, using synthetic series: {}", symbol, e);
                }
                StockSeriesResponse::success(symbol, generator::generate_series(self.synthetic_days))
            }
        }
    }

    async fn fetch_series(&self, symbol: &str, period: Option<&str>) -> Result<Vec<PricePoint>> {
        let period = match period {
            Some(p) => p.parse::<Period>()?,
            None => self.default_period,
        };
        self.gateway.fetch_series(symbol, period).await
    }

    /// 获取个股概要；上游失败时返回固定的模拟概要
    pub async fn summary(&self, symbol: &str) -> StockSummary {
        match self.gateway.fetch_summary(symbol).await {
            Ok(info) => StockSummary::from_info(symbol, &info),
            Err(e) => {
                warn!("Falling back to mock summary for {}: {}", symbol, e);
                StockSummary::mock(symbol)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DashboardError;
    use crate::models::stock::{InfoRecord, ResponseStatus};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Mutex;

    /// 记录请求周期的桩网关
    struct RecordingGateway {
        periods: Mutex<Vec<Period>>,
    }

    #[async_trait]
    impl MarketDataGateway for RecordingGateway {
        fn provider_code(&self) -> &'static str {
            "STUB"
        }

        async fn fetch_series(&self, _symbol: &str, period: Period) -> Result<Vec<PricePoint>> {
            self.periods.lock().unwrap().push(period);
            Ok(vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10,
            }])
        }

        async fn fetch_summary(&self, _symbol: &str) -> Result<InfoRecord> {
            Ok(json!({"longName": "Stub Corp", "volume": 42}).as_object().cloned().unwrap())
        }
    }

    struct DownGateway;

    #[async_trait]
    impl MarketDataGateway for DownGateway {
        fn provider_code(&self) -> &'static str {
            "DOWN"
        }

        async fn fetch_series(&self, _symbol: &str, _period: Period) -> Result<Vec<PricePoint>> {
            Err(DashboardError::UpstreamUnavailable("offline".to_string()))
        }

        async fn fetch_summary(&self, _symbol: &str) -> Result<InfoRecord> {
            Err(DashboardError::UpstreamUnavailable("offline".to_string()))
        }
    }

    fn recording() -> Arc<RecordingGateway> {
        Arc::new(RecordingGateway { periods: Mutex::new(Vec::new()) })
    }

    #[tokio::test]
    async fn uses_configured_default_period() {
        let gateway = recording();
        let config = Config::new().with_default_period("6mo");
        let service = StockService::new(&config, gateway.clone()).unwrap();

        service.series("TCS.NS", None).await;
        service.series("TCS.NS", Some("5d")).await;

        assert_eq!(*gateway.periods.lock().unwrap(), vec![Period::SixMonths, Period::FiveDays]);
    }

    #[tokio::test]
    async fn unknown_period_falls_back_without_calling_upstream() {
        let gateway = recording();
        let service = StockService::new(&Config::new(), gateway.clone()).unwrap();

        let response = service.series("TCS.NS", Some("fortnight")).await;

        assert!(gateway.periods.lock().unwrap().is_empty());
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.data.len(), 30);
    }

    #[tokio::test]
    async fn failure_yields_synthetic_series_of_configured_length() {
        let config = Config::new().with_synthetic_days(12);
        let service = StockService::new(&config, Arc::new(DownGateway)).unwrap();

        let response = service.series("ANY", None).await;
        assert_eq!(response.symbol, "ANY");
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.data.len(), 12);
    }

    #[tokio::test]
    async fn summary_projects_or_mocks() {
        let live = StockService::new(&Config::new(), recording()).unwrap();
        let summary = live.summary("STUB").await;
        assert_eq!(summary.name, "Stub Corp");
        assert_eq!(summary.volume, 42);
        assert_eq!(summary.sector, "N/A");

        let down = StockService::new(&Config::new(), Arc::new(DownGateway)).unwrap();
        assert_eq!(down.summary("ANY").await, StockSummary::mock("ANY"));
    }
}
