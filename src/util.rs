use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use crate::models::price::{IntradayBar, PricePoint};
use crate::errors::Result;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a record date. Only `yyyy-MM-dd` (taken as midnight) and
/// `yyyy-MM-dd HH:mm:ss` are accepted.
pub fn parse_record_time(date_str: &str) -> Option<NaiveDateTime> {
    if let Ok(time) = NaiveDateTime::parse_from_str(date_str, DATE_TIME_FORMAT) {
        return Some(time);
    }
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse a user supplied calendar date (YYYY-MM-DD)
pub fn parse_cli_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)?)
}

/// Decode the light EOD response. Malformed JSON fails the whole body.
pub fn decode_daily(body: &[u8]) -> Result<Vec<PricePoint>> {
    let points: Vec<PricePoint> = serde_json::from_slice(body)?;
    debug!("Decoded {} daily records", points.len());
    Ok(points)
}

/// Decode the hourly chart response into price points for `symbol`
pub fn decode_intraday(body: &[u8], symbol: &str) -> Result<Vec<PricePoint>> {
    let bars: Vec<IntradayBar> = serde_json::from_slice(body)?;
    debug!("Decoded {} hourly bars", bars.len());
    Ok(bars.into_iter().map(|bar| bar.into_price_point(symbol)).collect())
}

/// Number of records whose date cannot be parsed
pub fn count_undated(points: &[PricePoint]) -> usize {
    points.iter().filter(|p| p.time().is_none()).count()
}

pub fn warn_undated(points: &[PricePoint], symbol: &str) {
    let undated = count_undated(points);
    if undated > 0 {
        warn!("{} of {} records for {} have an unparsable date and will not be charted",
              undated, points.len(), symbol);
    }
}
