use chrono::NaiveDate;
use crate::errors::{ChartError, Result};
use crate::models::price::{Annotation, ChartPoint, PricePoint};
use crate::models::range::DateRange;

/// Points whose calendar day lies inside `range`, in series order.
/// Records without a parsable date never match.
pub fn filter_by_range<'a>(series: &'a [PricePoint], range: &DateRange) -> Vec<&'a PricePoint> {
    series
        .iter()
        .filter(|p| p.time().is_some_and(|t| range.contains(t.date())))
        .collect()
}

/// Project price points onto the `(date, value)` pairs a chart draws
pub fn to_chart_points(points: &[&PricePoint]) -> Vec<ChartPoint> {
    points
        .iter()
        .filter_map(|p| p.time().map(|date| ChartPoint { date, value: p.price }))
        .collect()
}

/// Average consecutive buckets of `chunk_size` points. Each bucket becomes
/// one point dated at its first member; the last bucket may be shorter.
pub fn aggregate(points: &[ChartPoint], chunk_size: usize) -> Result<Vec<ChartPoint>> {
    if chunk_size == 0 {
        return Err(ChartError::DataError("Chunk size must be greater than zero".to_string()));
    }

    Ok(points
        .chunks(chunk_size)
        .map(|chunk| {
            let sum: f64 = chunk.iter().map(|p| p.value).sum();
            ChartPoint {
                date: chunk[0].date,
                value: sum / chunk.len() as f64,
            }
        })
        .collect())
}

/// First displayed point on the same calendar day as `selected`.
/// Exact day match only, no nearest-neighbour fallback.
pub fn find_selection(points: &[ChartPoint], selected: NaiveDate) -> Option<Annotation> {
    points
        .iter()
        .find(|p| p.date.date() == selected)
        .map(Annotation::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn point(d: u32, value: f64) -> ChartPoint {
        ChartPoint {
            date: day(d).and_hms_opt(0, 0, 0).unwrap(),
            value,
        }
    }

    fn record(date: &str, price: f64) -> PricePoint {
        PricePoint {
            symbol: "AAPL".to_string(),
            date: date.to_string(),
            price,
            volume: 1000.0,
        }
    }

    #[test]
    fn five_points_make_one_weekly_bucket() {
        let points: Vec<ChartPoint> = (1..=5).map(|d| point(d, d as f64 * 10.0)).collect();
        let buckets = aggregate(&points, 5).unwrap();

        assert_eq!(buckets, vec![point(1, 30.0)]);
    }

    #[test]
    fn remainder_forms_a_short_last_bucket() {
        let points: Vec<ChartPoint> = (1..=7).map(|d| point(d, d as f64)).collect();
        let buckets = aggregate(&points, 5).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0], point(1, 3.0));
        assert_eq!(buckets[1], point(6, 6.5));
    }

    #[test]
    fn bucket_count_is_ceiling_of_len_over_size() {
        for len in 0..45u32 {
            let points: Vec<ChartPoint> = (0..len).map(|i| point(1 + i % 28, i as f64)).collect();
            for size in [1usize, 5, 20] {
                let expected = (len as usize + size - 1) / size;
                assert_eq!(aggregate(&points, size).unwrap().len(), expected, "len={} size={}", len, size);
            }
        }
    }

    #[test]
    fn bucket_values_are_chunk_means() {
        let values = [1.5, 2.25, 9.0, 4.0, 7.75, 3.0, 8.5, 0.25, 6.0, 5.5, 2.0];
        let points: Vec<ChartPoint> = values.iter().enumerate().map(|(i, v)| point(i as u32 + 1, *v)).collect();
        let buckets = aggregate(&points, 4).unwrap();

        for (bucket, chunk) in buckets.iter().zip(values.chunks(4)) {
            let mean = chunk.iter().sum::<f64>() / chunk.len() as f64;
            assert!((bucket.value - mean).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_series_aggregates_to_nothing() {
        assert!(aggregate(&[], 5).unwrap().is_empty());
        assert!(aggregate(&[], 20).unwrap().is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(aggregate(&[point(1, 1.0)], 0), Err(ChartError::DataError(_))));
    }

    #[test]
    fn filter_keeps_inclusive_range_in_order() {
        let series = vec![
            record("2025-01-01", 1.0),
            record("2025-01-02", 2.0),
            record("2025-01-03", 3.0),
            record("2025-01-04", 4.0),
        ];
        let range = DateRange::new(day(2), day(3)).unwrap();
        let kept = filter_by_range(&series, &range);

        assert_eq!(kept, vec![&series[1], &series[2]]);
    }

    #[test]
    fn covering_range_returns_series_unchanged() {
        let series = vec![
            record("2025-01-02", 2.0),
            record("2025-01-03 10:00:00", 3.0),
            record("2025-01-06", 4.0),
        ];
        let range = DateRange::new(day(2), day(6)).unwrap();
        let kept: Vec<PricePoint> = filter_by_range(&series, &range).into_iter().cloned().collect();

        assert_eq!(kept, series);
    }

    #[test]
    fn undated_records_are_invisible_but_not_removed() {
        let series = vec![
            record("2025-01-02", 2.0),
            record("2024-13-01", 99.0),
            record("2025-01-03", 3.0),
        ];
        let range = DateRange::new(NaiveDate::MIN, NaiveDate::MAX).unwrap();
        let kept = filter_by_range(&series, &range);
        let chart = to_chart_points(&kept);

        assert_eq!(series.len(), 3);
        assert_eq!(chart, vec![point(2, 2.0), point(3, 3.0)]);
        assert_eq!(aggregate(&chart, 5).unwrap(), vec![point(2, 2.5)]);
    }

    #[test]
    fn selection_matches_calendar_day_only() {
        let mut afternoon = point(3, 3.0);
        afternoon.date = day(3).and_hms_opt(15, 30, 0).unwrap();
        let points = vec![point(2, 2.0), afternoon, point(6, 6.0)];

        let hit = find_selection(&points, day(3)).unwrap();
        assert_eq!(hit.value, 3.0);
        assert_eq!(hit.date, afternoon.date);

        // weekend gap, no nearest-neighbour fallback
        assert_eq!(find_selection(&points, day(4)), None);
    }
}
