use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::DashboardError;

/// 上游返回的扁平键值记录
pub type InfoRecord = Map<String, Value>;

/// 日线数据结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// `/api/stock/{symbol}` 的响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSeriesResponse {
    pub symbol: String,
    pub data: Vec<PricePoint>,
    pub status: ResponseStatus,
}

impl StockSeriesResponse {
    pub fn success(symbol: &str, data: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.to_string(),
            data,
            status: ResponseStatus::Success,
        }
    }
}

/// 所有非 2xx 响应的统一结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: ResponseStatus,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: ResponseStatus::Error,
        }
    }
}

/// Lookback windows understood by the upstream chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    OneDay,
    FiveDays,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Period::ALL
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DashboardError::InvalidPeriod(s.to_string()))
    }
}

/// 个股概要，字段名与前端约定一致（camelCase）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub volume: u64,
    pub avg_volume: u64,
    pub market_cap: u64,
    pub sector: String,
}

const NOT_AVAILABLE: &str = "N/A";

impl StockSummary {
    /// 将上游记录投影为概要；缺失或类型不符的字段取默认值
    pub fn from_info(symbol: &str, info: &InfoRecord) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: text_field(info, "longName"),
            current_price: price_field(info, "currentPrice"),
            previous_close: price_field(info, "previousClose"),
            day_high: price_field(info, "dayHigh"),
            day_low: price_field(info, "dayLow"),
            fifty_two_week_high: price_field(info, "fiftyTwoWeekHigh"),
            fifty_two_week_low: price_field(info, "fiftyTwoWeekLow"),
            volume: count_field(info, "volume"),
            avg_volume: count_field(info, "averageVolume"),
            market_cap: count_field(info, "marketCap"),
            sector: text_field(info, "sector"),
        }
    }

    /// 上游不可用时返回的固定概要
    pub fn mock(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: format!("Mock Company ({})", symbol),
            current_price: 1250.50,
            previous_close: 1245.30,
            day_high: 1260.75,
            day_low: 1240.20,
            fifty_two_week_high: 1350.00,
            fifty_two_week_low: 950.00,
            volume: 2_500_000,
            avg_volume: 2_000_000,
            market_cap: 125_000_000_000,
            sector: "Technology".to_string(),
        }
    }
}

fn text_field(info: &InfoRecord, key: &str) -> String {
    info.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn price_field(info: &InfoRecord, key: &str) -> f64 {
    info.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or_default()
}

fn count_field(info: &InfoRecord, key: &str) -> u64 {
    match info.get(key) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or_default(),
        None => 0,
    }
}
