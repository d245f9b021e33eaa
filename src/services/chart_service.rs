use crate::errors::Result;
use crate::fetchers::base::PriceFetcher;
use crate::models::price::{Annotation, ChartPoint, PricePoint};
use crate::models::range::{DateRange, Period};
use crate::services::series;
use crate::util;
use chrono::NaiveDate;
use log::{error, info};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// Listener called with the new series after every successful load
pub type SeriesListener = Box<dyn Fn(&[PricePoint]) + Send + Sync>;

/// What to derive from the loaded series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub range: DateRange,
    pub period: Period,
    pub selected: Option<NaiveDate>,
    pub annotate: bool,
}

impl ViewOptions {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            period: Period::Daily,
            selected: None,
            annotate: true,
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_selection(mut self, selected: Option<NaiveDate>) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_annotation(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub symbol: String,
    pub period: Period,
    pub range: DateRange,
    pub points: Vec<ChartPoint>,
    pub annotation: Option<Annotation>,
    /// Records held in memory, charted or not
    pub raw_count: usize,
    /// Records hidden because their date could not be parsed
    pub undated_count: usize,
}

/// Holds the fetched series for one ticker and derives chart views from it.
/// A load replaces the series wholesale; a failed load leaves it untouched.
pub struct ChartService {
    fetcher: Arc<dyn PriceFetcher + Send + Sync>,
    points: RwLock<Vec<PricePoint>>,
    loading: AtomicBool,
    listeners: RwLock<Vec<SeriesListener>>,
}

impl ChartService {
    pub fn new(fetcher: Arc<dyn PriceFetcher + Send + Sync>) -> Self {
        Self {
            fetcher,
            points: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn symbol(&self) -> &str {
        self.fetcher.symbol()
    }

    /// Register a "series changed" listener
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&[PricePoint]) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(listener));
    }

    /// Fetch the series and replace the held one. Returns the number of
    /// records loaded, undated ones included.
    pub async fn load(&self) -> Result<usize> {
        self.loading.store(true, Ordering::SeqCst);
        let result = self.fetcher.fetch_history().await;
        self.loading.store(false, Ordering::SeqCst);

        let points = match result {
            Ok(points) => points,
            Err(e) => {
                error!("Failed to load {} prices from {}: {}",
                       self.fetcher.symbol(), self.fetcher.source_name(), e);
                return Err(e);
            }
        };

        util::warn_undated(&points, self.fetcher.symbol());
        let count = points.len();
        *self.points.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = points;
        info!("Loaded {} records for {}", count, self.fetcher.symbol());

        self.notify();
        Ok(count)
    }

    fn notify(&self) {
        let snapshot = self.points().to_vec();
        let listeners = self.listeners.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in listeners.iter() {
            listener(&snapshot);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Raw series in ascending date order
    pub fn points(&self) -> RwLockReadGuard<'_, Vec<PricePoint>> {
        self.points.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn raw_count(&self) -> usize {
        self.points().len()
    }

    pub fn undated_count(&self) -> usize {
        util::count_undated(&self.points())
    }

    /// Derive the displayed series: range filter, then bucket averaging for
    /// weekly/monthly, then the selection lookup against what is displayed.
    pub fn view(&self, options: &ViewOptions) -> Result<ChartView> {
        let points = self.points();
        let kept = series::filter_by_range(&points, &options.range);
        let mut chart = series::to_chart_points(&kept);

        if let Some(size) = options.period.chunk_size() {
            chart = series::aggregate(&chart, size)?;
        }

        let annotation = match (options.annotate, options.selected) {
            (true, Some(selected)) => series::find_selection(&chart, selected),
            _ => None,
        };

        Ok(ChartView {
            symbol: self.fetcher.symbol().to_string(),
            period: options.period,
            range: options.range,
            points: chart,
            annotation,
            raw_count: points.len(),
            undated_count: util::count_undated(&points),
        })
    }
}
