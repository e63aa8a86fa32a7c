use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::models::stock::PricePoint;
use crate::util;

/// 模拟日线的默认长度（天）
pub const DEFAULT_DAYS: u32 = 30;

const START_PRICE_RANGE: (f64, f64) = (100.0, 2000.0);
const DAILY_CHANGE: f64 = 0.05;
const PRICE_FLOOR: f64 = 10.0;
const HIGH_SPREAD: f64 = 1.03;
const LOW_SPREAD: f64 = 0.97;
const VOLUME_RANGE: (u64, u64) = (100_000, 10_000_000);

/// 生成以今天为基准的模拟日线（使用线程随机数）
///
/// 有界随机游走：每日相对前收盘变动不超过 5%，价格不低于 10，
/// 每行满足 `low <= open <= high` 且 `low <= close <= high`
pub fn generate_series(days: u32) -> Vec<PricePoint> {
    let today = Local::now().date_naive();
    generate_series_with(&mut rand::thread_rng(), days, today)
}

/// 使用给定的随机源生成 `days` 条日线，日期为 `today - days` 到 `today - 1`
pub fn generate_series_with<R: Rng>(rng: &mut R, days: u32, today: NaiveDate) -> Vec<PricePoint> {
    let mut base_price = rng.gen_range(START_PRICE_RANGE.0..=START_PRICE_RANGE.1);
    let mut series = Vec::with_capacity(days as usize);

    for i in 0..days {
        let date = util::days_before(today, days - i);

        let change = rng.gen_range(-DAILY_CHANGE..=DAILY_CHANGE);
        base_price = (base_price * (1.0 + change)).max(PRICE_FLOOR);

        let open = base_price;
        let high = open * rng.gen_range(1.0..=HIGH_SPREAD);
        let low = open * rng.gen_range(LOW_SPREAD..=1.0);
        let close = rng.gen_range(low..=high);
        let volume = rng.gen_range(VOLUME_RANGE.0..=VOLUME_RANGE.1);

        series.push(PricePoint {
            date,
            open: util::round_price(open),
            high: util::round_price(high),
            low: util::round_price(low),
            close: util::round_price(close),
            volume,
        });

        base_price = close;
    }

    series
}
