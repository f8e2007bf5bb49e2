use crate::config::{BINS, GRLB, GRUB, LB, MAD_SCALE, OUTLIER_THRESHOLD, PHI, UB};
use statrs::statistics::{Data, Median};

/// Exponential histogram of link distances.
///
/// Bin `k` counts distances `d` with `round(ln(d) / ln(phi)) == LB + k`;
/// anything outside `[LB, UB]` lands in the first or last bin. The exponents
/// of phi are close to integers (Lucas numbers), see [`crate::config::GR`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoldenArray(pub [u32; BINS]);

impl GoldenArray {
    pub fn from_distances(distances: &[u64]) -> Self {
        let mut counts = [0u32; BINS];
        for &d in distances {
            counts[golden_bin(d)] += 1;
        }
        GoldenArray(counts)
    }

    pub fn counts(&self) -> &[u32; BINS] {
        &self.0
    }
}

/// Bin index in `[0, UB - LB]` for a link distance
pub fn golden_bin(distance: u64) -> usize {
    if distance <= 1 {
        return 0;
    }
    let exponent = ((distance as f64).ln() / PHI).round() as i64;
    (exponent.clamp(LB, UB) - LB) as usize
}

/// Harmonic mean of the distances after clamping each to `[GRLB, GRUB]`,
/// rounded to the nearest integer. Returns 0 for an empty slice.
pub fn clamped_harmonic_mean(distances: &[u64]) -> u64 {
    if distances.is_empty() {
        return 0;
    }
    let reciprocal_sum: f64 = distances
        .iter()
        .map(|&d| 1.0 / d.clamp(GRLB, GRUB) as f64)
        .sum();
    (distances.len() as f64 / reciprocal_sum).round() as u64
}

/// Median of the finite values, `None` when there are none
pub fn median(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    Some(Data::new(finite).median())
}

/// Robust outlier bounds after Iglewicz and Hoaglin:
/// `median -/+ (3.5 / 0.6745) * MAD`.
///
/// Non-finite values (log10 of a zero density) are ignored when fitting.
/// Returns `None` when nothing is finite or the MAD is zero, meaning
/// "no outliers" rather than a zero-width band around the median.
pub fn outlier_cutoff(values: &[f64]) -> Option<(f64, f64)> {
    let m = median(values)?;
    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - m).abs())
        .collect();
    let mad = median(&deviations)?;
    if mad <= f64::EPSILON {
        return None;
    }
    let c = OUTLIER_THRESHOLD / MAD_SCALE * mad;
    Some((m - c, m + c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_golden_array_bins() {
        let g = GoldenArray::from_distances(&[5778, 9349, 1149851, 10, 50_000_000]);
        assert_eq!(g.counts()[0], 2); // 5778 and the clamped 10
        assert_eq!(g.counts()[1], 1);
        assert_eq!(g.counts()[BINS - 1], 2);
        assert_eq!(g.counts().iter().sum::<u32>(), 5);
    }

    #[test]
    fn test_harmonic_mean_clamps() {
        assert_eq!(clamped_harmonic_mean(&[]), 0);
        assert_eq!(clamped_harmonic_mean(&[10_000, 10_000]), 10_000);
        // 100 is clamped up to GRLB
        assert_eq!(clamped_harmonic_mean(&[100]), GRLB);
        assert_eq!(clamped_harmonic_mean(&[u64::MAX / 2]), GRUB);
        // n / (1/a + 1/b)
        assert_eq!(clamped_harmonic_mean(&[10_000, 40_000]), 16_000);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[f64::NEG_INFINITY]), None);
    }

    #[test]
    fn test_outlier_cutoff() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let (lb, ub) = outlier_cutoff(&values).unwrap();
        // median 3, MAD 1
        let c = 3.5 / 0.6745;
        assert!((lb - (3.0 - c)).abs() < 1e-9);
        assert!((ub - (3.0 + c)).abs() < 1e-9);
        assert!(100.0 > ub);
    }

    #[test]
    fn test_zero_mad_means_no_outliers() {
        assert_eq!(outlier_cutoff(&[2.0, 2.0, 2.0, 7.0]), None);
        assert_eq!(outlier_cutoff(&[]), None);
    }

    proptest! {
        #[test]
        fn golden_bin_is_monotonic(a in 0u64..5_000_000, b in 0u64..5_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(golden_bin(lo) <= golden_bin(hi));
            prop_assert!(golden_bin(hi) <= (UB - LB) as usize);
        }
    }
}
