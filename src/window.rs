//! C8 — Window Builder: Kaiser window of arbitrary length and smoothing
//! factor β. β=0 yields a uniform (all-ones) window.
//!
//! No crate in the reachable dependency set implements the modified Bessel
//! function I₀, so it is hand-rolled as a truncated power series, the
//! standard approach for the magnitudes of β encountered in pulse-compression
//! windows (β < 20 or so).

/// Modified Bessel function of the first kind, order 0, via its power series.
///
/// Converges quickly for the range of β used by Kaiser windows; 32 terms is
/// comfortably past double-precision convergence for β up to ~30.
fn bessel_i0(x: f64) -> f64 {
    let mut term = 1.0f64;
    let mut sum = 1.0f64;
    let half_x_sq = (x / 2.0).powi(2);
    for k in 1..32 {
        term *= half_x_sq / (k as f64 * k as f64);
        sum += term;
    }
    sum
}

/// Builds a length-`len` Kaiser window with smoothing factor `beta`.
///
/// `w[k] = I0(beta * sqrt(1 - (2k/(len-1) - 1)^2)) / I0(beta)`, for `len >= 2`.
/// A `len` of 0 or 1 returns an all-ones window (the ratio is degenerate).
pub fn kaiser(len: usize, beta: f64) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let i0_beta = bessel_i0(beta);
    let denom = (len - 1) as f64;
    (0..len)
        .map(|k| {
            let t = 2.0 * k as f64 / denom - 1.0;
            let arg = beta * (1.0 - t * t).max(0.0).sqrt();
            bessel_i0(arg) / i0_beta
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beta_zero_is_uniform() {
        let w = kaiser(16, 0.0);
        assert_eq!(w.len(), 16);
        for v in w {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn window_is_symmetric_and_peaks_at_center() {
        let w = kaiser(21, 4.0);
        for i in 0..w.len() {
            assert!((w[i] - w[w.len() - 1 - i]).abs() < 1e-9);
        }
        let mid = w[10];
        assert!(w.iter().all(|&v| v <= mid + 1e-12));
    }

    #[test]
    fn endpoints_are_smallest_for_nonzero_beta() {
        let w = kaiser(64, 6.0);
        let first = w[0];
        let center = w[32];
        assert!(first < center);
    }

    #[test]
    fn degenerate_lengths_are_all_ones() {
        assert_eq!(kaiser(0, 5.0), Vec::<f64>::new());
        assert_eq!(kaiser(1, 5.0), vec![1.0]);
    }
}
