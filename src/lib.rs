// Public modules
pub mod models;
pub mod errors;
pub mod fetchers;
pub mod services;
pub mod render;
pub mod config;
pub mod util;

// Common re-exports
pub use models::price::{PricePoint, IntradayBar, ChartPoint, Annotation};
pub use models::range::{DateRange, Period};
pub use fetchers::base::PriceFetcher;
pub use fetchers::fmp::{FmpFetcher, Endpoint};
pub use services::chart_service::{ChartService, ChartView, ViewOptions};
pub use errors::{Result, ChartError};
