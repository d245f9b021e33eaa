use chrono::NaiveDate;
use crate::fetchers::fmp::Endpoint;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";
pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_API_KEY: &str = "demo";

pub struct Config {
    pub symbol: String,
    pub api_key: String,
    pub endpoint: Endpoint,
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Earliest date the range pickers accept
    pub min_date: NaiveDate,
    /// Start of the range shown before the user picks one
    pub default_start: NaiveDate,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Config {
    pub fn new() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            endpoint: Endpoint::DailyLight,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            min_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            default_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
            chart_width: 1200,
            chart_height: 600,
        }
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.trim().to_uppercase();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = width;
        self.chart_height = height;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
