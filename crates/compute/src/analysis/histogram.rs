use crate::analysis::statistics::Statistics;
use crate::source::{Bin, HistogramResult};

/// Equal-width binning over `[lo, hi]`.
///
/// Values outside the range are ignored; a value equal to `hi` lands in the
/// last bin. A degenerate range (`lo == hi`) puts every in-range value in the
/// first bin.
pub fn bin_values(values: &[f64], lo: f64, hi: f64, num_bins: u32) -> HistogramResult {
    let n = num_bins as usize;
    let width = (hi - lo) / n.max(1) as f64;

    let mut bins: Vec<Bin> = (0..n)
        .map(|i| Bin {
            min_value: lo + width * i as f64,
            max_value: if i + 1 == n {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    if n > 0 {
        for &v in values {
            if !(lo..=hi).contains(&v) {
                continue;
            }
            let mut idx = if width > 0.0 {
                (((v - lo) / width) as usize).min(n - 1)
            } else {
                0
            };
            // Agree with the stored edges when division rounding disagrees.
            if idx > 0 && v < bins[idx].min_value {
                idx -= 1;
            } else if idx + 1 < n && v >= bins[idx + 1].min_value {
                idx += 1;
            }
            bins[idx].count += 1;
        }
    }

    HistogramResult {
        min_value: lo,
        max_value: hi,
        bins,
    }
}

/// Bins `values` using explicit bounds where given and the data range
/// otherwise. With no values and an open bound the result is empty.
pub fn histogram(
    values: &[f64],
    min_value: Option<f64>,
    max_value: Option<f64>,
    num_bins: u32,
) -> HistogramResult {
    let data = Statistics::min_max(values);
    let lo = min_value.or(data.map(|(lo, _)| lo));
    let hi = max_value.or(data.map(|(_, hi)| hi));
    match (lo, hi) {
        (Some(lo), Some(hi)) => bin_values(values, lo, hi, num_bins),
        _ => HistogramResult {
            min_value: 0.0,
            max_value: 0.0,
            bins: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{bin_values, histogram};

    #[test]
    fn bins_partition_the_range() {
        let values = [0.0, 1.0, 2.5, 5.0, 9.99, 10.0, 11.0, -1.0];
        let h = bin_values(&values, 0.0, 10.0, 4);
        assert_eq!(h.bins.len(), 4);
        let counts: Vec<u64> = h.bins.iter().map(|b| b.count).collect();
        // 0,1 | 2.5 | 5 | 9.99,10 ; 11 and -1 are out of range.
        assert_eq!(counts, vec![2, 1, 1, 2]);
        assert_eq!(h.total_count(), 6);
        assert_eq!(h.bins[0].min_value, 0.0);
        assert_eq!(h.bins[1].min_value, 2.5);
        assert_eq!(h.bins[3].max_value, 10.0);
        for pair in h.bins.windows(2) {
            assert_eq!(pair[0].max_value, pair[1].min_value);
        }
    }

    #[test]
    fn open_bounds_use_the_data_range() {
        let h = histogram(&[3.0, 4.0, 7.0], Some(0.0), None, 7);
        assert_eq!(h.min_value, 0.0);
        assert_eq!(h.max_value, 7.0);
        assert_eq!(h.total_count(), 3);
        assert_eq!(h.bins[6].count, 1);
    }

    #[test]
    fn degenerate_and_empty_inputs() {
        let h = histogram(&[5.0, 5.0], None, None, 3);
        assert_eq!(h.bins[0].count, 2);
        assert_eq!(h.total_count(), 2);

        let h = histogram(&[], Some(0.0), Some(10.0), 5);
        assert_eq!(h.bins.len(), 5);
        assert_eq!(h.total_count(), 0);

        let h = histogram(&[], Some(0.0), None, 5);
        assert!(h.bins.is_empty());
        assert_eq!((h.min_value, h.max_value), (0.0, 0.0));
    }

    #[test]
    fn values_on_an_edge_land_in_the_bin_starting_there() {
        for (lo, hi, n) in [(0.0, 0.1, 30), (0.0, 75_000.0, 30), (0.0, 0.7, 7), (1.0, 2.0, 3)] {
            let layout = bin_values(&[], lo, hi, n);
            let edges: Vec<f64> = layout.bins.iter().map(|b| b.min_value).collect();
            let h = bin_values(&edges, lo, hi, n);
            let misplaced: Vec<usize> = h
                .bins
                .iter()
                .enumerate()
                .filter(|(_, b)| b.count != 1)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(misplaced, Vec::<usize>::new(), "[{lo}, {hi}] in {n} bins");

            let top = bin_values(&[hi], lo, hi, n);
            assert_eq!(top.bins[n as usize - 1].count, 1);
        }
    }
}
