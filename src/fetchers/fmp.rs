use crate::config::Config;
use crate::errors::{ChartError, Result};
use crate::fetchers::base::PriceFetcher;
use crate::models::price::PricePoint;
use crate::util;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Url};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The two FMP response shapes the chart understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `stable/historical-price-eod/light`: symbol, date, price, volume
    DailyLight,
    /// `api/v3/historical-chart/1hour`: OHLCV bars
    Hourly,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::DailyLight => f.write_str("daily"),
            Endpoint::Hourly => f.write_str("hourly"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "eod" => Ok(Endpoint::DailyLight),
            "hourly" | "1hour" => Ok(Endpoint::Hourly),
            _ => Err(ChartError::DataError(format!(
                "Unknown endpoint: '{}'. Supported: daily, hourly", s
            ))),
        }
    }
}

/// Financial Modeling Prep price fetcher
pub struct FmpFetcher {
    client: Client,
    base_url: String,
    symbol: String,
    api_key: String,
    endpoint: Endpoint,
}

impl FmpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ChartError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            symbol: config.symbol.clone(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint,
        })
    }

    /// Request URL including the API key
    pub fn build_url(&self) -> Result<Url> {
        let url = match self.endpoint {
            Endpoint::DailyLight => Url::parse_with_params(
                &format!("{}/stable/historical-price-eod/light", self.base_url),
                &[("symbol", self.symbol.as_str()), ("apikey", self.api_key.as_str())],
            ),
            Endpoint::Hourly => Url::parse_with_params(
                &format!("{}/api/v3/historical-chart/1hour/{}", self.base_url, self.symbol),
                &[("apikey", self.api_key.as_str())],
            ),
        };

        url.map_err(|e| ChartError::UrlError(format!("{} (base: {})", e, self.base_url)))
    }
}

#[async_trait]
impl PriceFetcher for FmpFetcher {
    fn source_name(&self) -> &'static str {
        "FMP"
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn fetch_history(&self) -> Result<Vec<PricePoint>> {
        let url = self.build_url()?;
        // path only, the query carries the key
        info!("Fetching {} prices for {} from {}", self.endpoint, self.symbol, url.path());

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!("Received {} bytes", body.len());

        let mut points = match self.endpoint {
            Endpoint::DailyLight => util::decode_daily(&body)?,
            Endpoint::Hourly => util::decode_intraday(&body, &self.symbol)?,
        };

        // API returns newest first
        points.reverse();

        info!("Fetched {} records for {}", points.len(), self.symbol);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn fetcher(config: Config) -> FmpFetcher {
        FmpFetcher::new(&config).unwrap()
    }

    /// Answer a single request with a canned response. The task yields the
    /// request line it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    #[test]
    fn daily_url_uses_query_symbol() {
        let f = fetcher(Config::new().with_symbol("aapl").with_api_key("KEY"));
        assert_eq!(
            f.build_url().unwrap().as_str(),
            "https://financialmodelingprep.com/stable/historical-price-eod/light?symbol=AAPL&apikey=KEY"
        );
    }

    #[test]
    fn hourly_url_uses_path_symbol() {
        let f = fetcher(
            Config::new()
                .with_symbol("MSFT")
                .with_api_key("KEY")
                .with_endpoint(Endpoint::Hourly)
                .with_base_url("http://localhost:9000/"),
        );
        assert_eq!(
            f.build_url().unwrap().as_str(),
            "http://localhost:9000/api/v3/historical-chart/1hour/MSFT?apikey=KEY"
        );
    }

    #[test]
    fn bad_base_url_is_a_url_error() {
        let f = fetcher(Config::new().with_base_url("not a url"));
        assert!(matches!(f.build_url(), Err(ChartError::UrlError(_))));
    }

    #[test]
    fn endpoint_parsing() {
        assert_eq!("daily".parse::<Endpoint>().unwrap(), Endpoint::DailyLight);
        assert_eq!("1HOUR".parse::<Endpoint>().unwrap(), Endpoint::Hourly);
        assert!("weekly".parse::<Endpoint>().is_err());
    }

    #[tokio::test]
    async fn daily_history_comes_back_oldest_first() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[
                {"symbol": "AAPL", "date": "2025-01-03", "price": 243.36, "volume": 40244114},
                {"symbol": "AAPL", "date": "2025-01-02", "price": 243.85, "volume": 55740731}
            ]"#,
        )
        .await;
        let f = fetcher(Config::new().with_base_url(&base_url));

        let points = f.fetch_history().await.unwrap();
        let dates: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();

        assert_eq!(dates, ["2025-01-02", "2025-01-03"]);
        assert_eq!(points[0].price, 243.85);
        assert_eq!(
            server.await.unwrap(),
            "GET /stable/historical-price-eod/light?symbol=AAPL&apikey=demo HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn hourly_bars_use_close_and_come_back_oldest_first() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[
                {"date": "2025-01-02 15:30:00", "open": 1.3, "high": 1.6, "low": 1.2, "close": 1.5, "volume": 900},
                {"date": "2025-01-02 14:30:00", "open": 1.0, "high": 1.3, "low": 0.9, "close": 1.2, "volume": 700}
            ]"#,
        )
        .await;
        let f = fetcher(
            Config::new()
                .with_base_url(&base_url)
                .with_endpoint(Endpoint::Hourly),
        );

        let points = f.fetch_history().await.unwrap();
        let bars: Vec<(&str, f64)> = points.iter().map(|p| (p.date.as_str(), p.price)).collect();

        assert_eq!(bars, [("2025-01-02 14:30:00", 1.2), ("2025-01-02 15:30:00", 1.5)]);
        assert!(points.iter().all(|p| p.symbol == "AAPL"));
        assert!(server.await.unwrap().starts_with("GET /api/v3/historical-chart/1hour/AAPL?apikey=demo"));
    }

    #[tokio::test]
    async fn rejected_key_is_a_request_error() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"Error Message": "Invalid API KEY. Please retry or visit our documentation."}"#,
        )
        .await;
        let f = fetcher(Config::new().with_base_url(&base_url).with_api_key("bad"));

        assert!(matches!(f.fetch_history().await, Err(ChartError::RequestError(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        // port 9 (discard) on loopback refuses connections
        let f = fetcher(
            Config::new()
                .with_base_url("http://127.0.0.1:9")
                .with_request_timeout_secs(2),
        );
        assert!(matches!(f.fetch_history().await, Err(ChartError::RequestError(_))));
    }
}
