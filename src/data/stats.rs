//! Order statistics over metric samples.
//!
//! Missing values never reach these functions; callers collect only the
//! numeric cells of a group. NaN is dropped defensively as well.

/// Median and interquartile bounds of one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    /// Compute quartiles of `values`, or `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_without_nan(values);
        Some(Quartiles {
            q1: quantile_sorted(&sorted, 0.25)?,
            median: quantile_sorted(&sorted, 0.5)?,
            q3: quantile_sorted(&sorted, 0.75)?,
        })
    }
}

/// Median of `values`, ignoring NaN.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_without_nan(values), 0.5)
}

/// Inclusive percentile with linear interpolation between order statistics:
/// position `q * (n - 1)` in the sorted sample.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn sorted_without_nan(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn median_of_even_and_odd_samples() {
        assert_close(median(&[0.5, 0.7]).unwrap(), 0.6);
        assert_close(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let q = Quartiles::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_close(q.q1, 1.75);
        assert_close(q.median, 2.5);
        assert_close(q.q3, 3.25);

        let q = Quartiles::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_close(q.q1, 2.0);
        assert_close(q.median, 3.0);
        assert_close(q.q3, 4.0);
    }

    #[test]
    fn single_value_collapses_to_point() {
        let q = Quartiles::from_values(&[0.42]).unwrap();
        assert_eq!(q, Quartiles { q1: 0.42, median: 0.42, q3: 0.42 });
    }

    #[test]
    fn quartiles_are_ordered() {
        let samples: [&[f64]; 4] = [
            &[0.3, 0.3, 0.3],
            &[9.0, -1.0, 4.5, 4.5, 0.0, 12.25],
            &[1e-9, 1e9],
            &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
        ];
        for values in samples {
            let q = Quartiles::from_values(values).unwrap();
            assert!(q.q1 <= q.median && q.median <= q.q3, "{q:?}");
            assert!(q.median - q.q1 >= 0.0 && q.q3 - q.median >= 0.0);
        }
    }
}
