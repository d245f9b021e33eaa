use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::util::parse_record_time;

/// One end-of-day record as returned by the light EOD endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub date: String,
    pub price: f64,
    pub volume: f64,
}

impl PricePoint {
    /// Timestamp derived from `date`; `None` when the string is not a
    /// recognised record date. Such records stay in the raw series but never
    /// reach a chart.
    pub fn time(&self) -> Option<NaiveDateTime> {
        parse_record_time(&self.date)
    }
}

/// Hourly OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradayBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl IntradayBar {
    pub fn into_price_point(self, symbol: &str) -> PricePoint {
        PricePoint {
            symbol: symbol.to_string(),
            date: self.date,
            price: self.close,
            volume: self.volume,
        }
    }
}

/// A `(date, value)` pair handed to the renderer. Aggregated buckets use the
/// same shape: the first date of the bucket and the mean of its prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDateTime,
    pub value: f64,
}

/// The displayed point matching the selected calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Annotation {
    pub date: NaiveDateTime,
    pub value: f64,
}

impl From<&ChartPoint> for Annotation {
    fn from(point: &ChartPoint) -> Self {
        Annotation {
            date: point.date,
            value: point.value,
        }
    }
}

impl Annotation {
    pub fn label(&self) -> String {
        format!("{}: {:.2}", self.date.format("%Y-%m-%d"), self.value)
    }
}
