use crate::config::Config;
use crate::errors::{Result, DashboardError};
use crate::gateway::base::MarketDataGateway;
use crate::models::stock::{InfoRecord, Period, PricePoint};
use crate::util;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// quoteSummary 请求的模块，按此顺序合并，先出现的键优先
const SUMMARY_MODULES: [&str; 4] = ["price", "summaryDetail", "financialData", "assetProfile"];

/// Yahoo Finance 行情网关
pub struct YahooGateway {
    client: Client,
    base_url: String,
}

impl YahooGateway {
    /// 创建网关；所有请求共用同一个带超时的客户端
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(DashboardError::RequestError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.upstream_base_url, config.request_timeout)
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self.client
            .get(url)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(DashboardError::UpstreamUnavailable(format!(
                "HTTP status {} from {}", status, url
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl MarketDataGateway for YahooGateway {
    fn provider_code(&self) -> &'static str {
        "YAHOO"
    }

    async fn fetch_series(&self, symbol: &str, period: Period) -> Result<Vec<PricePoint>> {
        debug!("获取 {} 的日线数据，周期 {}", symbol, period);

        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );
        let body = self.get_text(&url, &[("range", period.as_str()), ("interval", "1d")]).await?;
        let points = parse_chart(&body, symbol)?;

        debug!("获取到 {} 条日线记录", points.len());
        Ok(points)
    }

    async fn fetch_summary(&self, symbol: &str) -> Result<InfoRecord> {
        debug!("获取 {} 的概要信息", symbol);

        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );
        let modules = SUMMARY_MODULES.join(",");
        let body = self.get_text(&url, &[("modules", modules.as_str())]).await?;
        parse_quote_summary(&body)
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn message(&self) -> String {
        format!(
            "{}: {}",
            self.code.as_deref().unwrap_or("error"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// 解析 v8 chart 响应为按日期升序的日线数据
pub(crate) fn parse_chart(body: &str, symbol: &str) -> Result<Vec<PricePoint>> {
    let response: YahooChartResponse = serde_json::from_str(body)?;

    if let Some(error) = &response.chart.error {
        return Err(DashboardError::UpstreamUnavailable(format!(
            "chart API error for {}: {}", symbol, error.message()
        )));
    }

    let result = response.chart.result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DashboardError::UpstreamUnavailable(format!("No chart data for {}", symbol)))?;

    let gmt_offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next()
        .ok_or_else(|| DashboardError::UpstreamUnavailable(format!("No quote data for {}", symbol)))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // 只保留 OHLC 完整的行
        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) {
            let volume = quote.volume.get(i).copied().flatten().unwrap_or_default();
            points.push(PricePoint {
                date: util::timestamp_to_local_date(ts, gmt_offset)?,
                open: util::round_price(*open),
                high: util::round_price(*high),
                low: util::round_price(*low),
                close: util::round_price(*close),
                volume: util::truncate_volume(volume),
            });
        }
    }

    let points = util::dedupe_by_date(points, symbol);
    if points.is_empty() {
        return Err(DashboardError::UpstreamUnavailable(format!("Empty price history for {}", symbol)));
    }
    Ok(points)
}

/// 将 quoteSummary 的各模块合并为扁平记录，`{raw, fmt}` 结构取 `raw`
pub(crate) fn parse_quote_summary(body: &str) -> Result<InfoRecord> {
    let json: Value = serde_json::from_str(body)?;
    let summary = json.get("quoteSummary")
        .ok_or_else(|| DashboardError::UpstreamUnavailable("Missing quoteSummary".to_string()))?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        let description = error.get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(DashboardError::UpstreamUnavailable(format!("quoteSummary error: {}", description)));
    }

    let result = summary.get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .and_then(Value::as_object)
        .ok_or_else(|| DashboardError::UpstreamUnavailable("Empty quoteSummary result".to_string()))?;

    let mut record = InfoRecord::new();
    for module in SUMMARY_MODULES {
        let Some(fields) = result.get(module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if record.contains_key(key) {
                continue;
            }
            if let Some(flat) = flatten_value(value) {
                record.insert(key.clone(), flat);
            }
        }
    }

    if record.is_empty() {
        return Err(DashboardError::UpstreamUnavailable("quoteSummary has no fields".to_string()));
    }
    Ok(record)
}

fn flatten_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null | Value::Array(_) => None,
        Value::Object(map) => map.get("raw").filter(|raw| !raw.is_null()).cloned(),
        scalar => Some(scalar.clone()),
    }
}
