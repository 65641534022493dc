//! C9 — Range Compressor: FFT-based matched filter. Zero-pads the
//! decompressed echo to the reference length L, multiplies its spectrum by
//! the conjugated reference, and inverse-transforms back to a length-L
//! complex range profile.
//!
//! Per the open matched-filter-domain question (see `DESIGN.md`): for `ref`
//! chirps the "reference" handed in here is actually a time-domain,
//! zero-padded vector, not a spectrum. This function does not distinguish
//! that case — it always conjugates and multiplies directly, reproducing the
//! domain-mixing behavior rather than correcting it.

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Applies the matched filter. `reference.len()` is L; `echo.len()` must be
/// <= L (3600 for every mode supported here) and is zero-padded to L.
///
/// `window` is applied to the conjugated reference only when `apply_window`
/// is true; the source leaves this path disabled by default (spec §9), so
/// callers should default `apply_window` to `false`.
pub fn range_compress(
    echo: &[f64],
    reference: &[Complex64],
    window: Option<&[f64]>,
    apply_window: bool,
) -> Vec<Complex64> {
    let l = reference.len();
    debug_assert!(echo.len() <= l);

    let mut spectrum: Vec<Complex64> = vec![Complex64::new(0.0, 0.0); l];
    for (i, &v) in echo.iter().enumerate() {
        spectrum[i] = Complex64::new(v, 0.0);
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(l);
    fft.process(&mut spectrum);
    for v in spectrum.iter_mut() {
        *v /= l as f64;
    }

    let mut matched: Vec<Complex64> = reference.iter().map(|c| c.conj()).collect();
    if apply_window {
        if let Some(w) = window {
            for (m, &wv) in matched.iter_mut().zip(w.iter()) {
                *m *= wv;
            }
        }
    }

    let mut product: Vec<Complex64> = matched
        .iter()
        .zip(spectrum.iter())
        .map(|(a, b)| a * b)
        .collect();

    let ifft = planner.plan_fft_inverse(l);
    ifft.process(&mut product);
    for v in product.iter_mut() {
        *v *= l as f64;
    }
    product
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_yields_zero_output() {
        let echo = vec![0.0; 3600];
        let reference = vec![Complex64::new(1.0, 0.0); 3600];
        let out = range_compress(&echo, &reference, None, false);
        assert_eq!(out.len(), 3600);
        for v in out {
            assert!(v.norm() < 1e-9);
        }
    }

    #[test]
    fn output_length_matches_reference_length() {
        let echo = vec![1.0; 3600];
        let reference = vec![Complex64::new(0.0, 0.0); 4096];
        let out = range_compress(&echo, &reference, None, false);
        assert_eq!(out.len(), 4096);
    }

    #[test]
    fn windowed_and_unwindowed_paths_can_differ() {
        let mut echo = vec![0.0; 3600];
        echo[1] = 1.0;
        let reference = vec![Complex64::new(1.0, 0.5); 3600];
        let window: Vec<f64> = (0..3600).map(|i| if i % 2 == 0 { 0.5 } else { 1.0 }).collect();

        let plain = range_compress(&echo, &reference, Some(&window), false);
        let windowed = range_compress(&echo, &reference, Some(&window), true);
        assert_ne!(plain, windowed);
    }
}
