use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use crate::errors::{ChartError, Result};

/// Inclusive calendar-day interval picked by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ChartError::DataError(format!(
                "Invalid date range: {} is after {}", start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Clamp both ends into `[min_date, today]`. When the clamped ends cross,
    /// the start is pulled down to the end, mirroring pickers whose bounds
    /// follow each other.
    pub fn clamped(start: NaiveDate, end: NaiveDate, min_date: NaiveDate, today: NaiveDate) -> Self {
        let upper = today.max(min_date);
        let end = end.clamp(min_date, upper);
        let start = start.clamp(min_date, upper).min(end);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Bucket size used to smooth the displayed series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    /// Positional bucket size. Not calendar-aware: a "week" is five
    /// consecutive records whatever gaps the data has.
    pub fn chunk_size(&self) -> Option<usize> {
        match self {
            Period::Daily => None,
            Period::Weekly => Some(5),
            Period::Monthly => Some(20),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Ok(Period::Daily),
            "weekly" | "w" => Ok(Period::Weekly),
            "monthly" | "m" => Ok(Period::Monthly),
            _ => Err(ChartError::DataError(format!(
                "Unknown period: '{}'. Supported: daily, weekly, monthly", s
            ))),
        }
    }
}
