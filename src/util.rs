use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use log::debug;
use crate::errors::{Result, DashboardError};
use crate::models::stock::PricePoint;

/// 价格保留两位小数（四舍五入，远离零）
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 成交量取整；负数或 NaN 归零
pub fn truncate_volume(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// 将 Unix 时间戳按交易所的 UTC 偏移换算为当地日期
pub fn timestamp_to_local_date(timestamp: i64, gmt_offset_secs: i32) -> Result<NaiveDate> {
    let offset = FixedOffset::east_opt(gmt_offset_secs)
        .ok_or_else(|| DashboardError::UpstreamUnavailable(format!("Invalid gmt offset: {}", gmt_offset_secs)))?;
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| DashboardError::UpstreamUnavailable(format!("Invalid timestamp: {}", timestamp)))?;
    Ok(utc.with_timezone(&offset).date_naive())
}

/// 回溯 `days_back` 天的日期
pub fn days_before(today: NaiveDate, days_back: u32) -> NaiveDate {
    today - Duration::days(i64::from(days_back))
}

// 同一日期只保留最后一条，并按日期升序排列
pub fn dedupe_by_date(mut points: Vec<PricePoint>, symbol: &str) -> Vec<PricePoint> {
    let original = points.len();
    // 稳定排序保证同一日期内保持原始顺序
    points.sort_by(|a, b| a.date.cmp(&b.date));

    let mut result: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match result.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => result.push(point),
        }
    }

    if result.len() != original {
        debug!("Dropped {} duplicate daily rows for {}", original - result.len(), symbol);
    }
    result
}
