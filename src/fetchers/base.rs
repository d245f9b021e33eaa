use crate::models::price::PricePoint;
use crate::errors::Result;
use async_trait::async_trait;

/// Source of the historical price series for a single ticker
#[async_trait]
pub trait PriceFetcher {
    /// Short name of the data source, used in log lines
    fn source_name(&self) -> &'static str;

    /// Ticker this fetcher was built for
    fn symbol(&self) -> &str;

    /// Fetch the full history in ascending date order.
    /// A failure means nothing was decoded; there are no partial results.
    async fn fetch_history(&self) -> Result<Vec<PricePoint>>;
}
