use crate::models::stock::{InfoRecord, Period, PricePoint};
use crate::errors::Result;
use async_trait::async_trait;

/// Upstream market data provider
#[async_trait]
pub trait MarketDataGateway {
    /// Provider code, used in logs
    fn provider_code(&self) -> &'static str;

    /// Fetch daily OHLCV rows for `symbol` over `period`, oldest first
    async fn fetch_series(&self, symbol: &str, period: Period) -> Result<Vec<PricePoint>>;

    /// Fetch the provider's flat info record for `symbol`
    async fn fetch_summary(&self, symbol: &str) -> Result<InfoRecord>;
}
