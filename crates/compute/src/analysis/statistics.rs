use crate::source::SummaryStatisticsResult;

pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Population variance.
    pub fn variance(values: &[f64]) -> Option<f64> {
        let mean = Self::mean(values)?;
        let mut acc = 0.0;
        for &v in values {
            let d = v - mean;
            acc += d * d;
        }
        Some(acc / values.len() as f64)
    }

    pub fn summarize(values: &[f64]) -> SummaryStatisticsResult {
        let (min, max) = match Self::min_max(values) {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };
        let variance = Self::variance(values);
        SummaryStatisticsResult {
            avg: Self::mean(values),
            min,
            max,
            count: values.len() as u64,
            sum: values.iter().sum(),
            stddev: variance.map(f64::sqrt),
            variance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn mean_works() {
        let m = Statistics::mean(&[1.0, 2.0, 3.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9);
    }

    #[test]
    fn summarize_reports_spread() {
        let s = Statistics::summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert_eq!(s.sum, 40.0);
        assert_eq!(s.avg, Some(5.0));
        assert_eq!(s.min, Some(2.0));
        assert_eq!(s.max, Some(9.0));
        assert_eq!(s.variance, Some(4.0));
        assert_eq!(s.stddev, Some(2.0));
    }

    #[test]
    fn summarize_empty_has_no_average() {
        let s = Statistics::summarize(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.sum, 0.0);
        assert_eq!(s.avg, None);
        assert_eq!(s.stddev, None);
    }
}
