//! C7 — Calibration Chirp Provider: resolves a transmitter/receiver
//! temperature pair plus a chirp mode into a length-L complex reference used
//! as the matched filter by C9.
//!
//! `ref`/`vibro` chirps are loaded from on-disk calibration files selected by
//! nearest-temperature-anchor lookup and cached by anchor index, since many
//! records in an observation share the same anchor pair. `ideal`/`upb` are
//! synthesized and have no temperature dependence.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{Error, Result};

const IDEAL_LEN: usize = 3600;
const CAL_LEN: usize = 4096;
const CAL_TIME_SAMPLES: usize = 2048;

const TX_ANCHORS: [f32; 8] = [-20.0, -15.0, -10.0, -5.0, 0.0, 20.0, 40.0, 60.0];
const TX_CODES: [&str; 8] = [
    "m20tx", "m15tx", "m10tx", "m05tx", "p00tx", "p20tx", "p40tx", "p60tx",
];
const RX_ANCHORS: [f32; 5] = [-20.0, 0.0, 20.0, 40.0, 60.0];
const RX_CODES: [&str; 5] = ["m20rx", "p00rx", "p20rx", "p40rx", "p60rx"];

/// Which calibration pathway produces the reference spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChirpMode {
    Ideal,
    Upb,
    Ref,
    Vibro,
}

impl ChirpMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "ideal" => Ok(ChirpMode::Ideal),
            "upb" => Ok(ChirpMode::Upb),
            "ref" => Ok(ChirpMode::Ref),
            "vibro" => Ok(ChirpMode::Vibro),
            other => Err(Error::UnsupportedChirpMode(other.to_string())),
        }
    }

    /// Reference length, L, for this mode (spec §4.9).
    pub fn reference_len(self) -> usize {
        match self {
            ChirpMode::Ideal | ChirpMode::Upb => IDEAL_LEN,
            ChirpMode::Ref | ChirpMode::Vibro => CAL_LEN,
        }
    }
}

/// Finds the anchor index minimizing `|value - anchor|`, tie-broken by the
/// lower (earlier) index.
fn nearest_anchor_index(value: f32, anchors: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_diff = f32::INFINITY;
    for (i, &a) in anchors.iter().enumerate() {
        let diff = (value - a).abs();
        if diff < best_diff {
            best_diff = diff;
            best = i;
        }
    }
    best
}

fn read_le_f32_vec(path: &Path, count: usize) -> Result<Vec<f32>> {
    let mut file = File::open(path).map_err(|_| {
        Error::MissingCalibrationFile(path.to_string_lossy().into_owned())
    })?;
    let mut raw = vec![0u8; count * 4];
    file.read_exact(&mut raw)?;
    Ok(raw
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
        .collect())
}

/// Loads and assembles the length-4096 `ref` reference (spec §4.7): the raw
/// time-domain calibration samples, zero-padded, with no Hermitian mirror.
fn load_ref_chirp(path: &Path) -> Result<Vec<Complex64>> {
    let floats = read_le_f32_vec(path, CAL_LEN)?;
    let mut out = vec![Complex64::new(0.0, 0.0); CAL_LEN];
    for k in 0..CAL_TIME_SAMPLES {
        out[k] = Complex64::new(floats[k] as f64, floats[CAL_TIME_SAMPLES + k] as f64);
    }
    Ok(out)
}

/// Builds the `vibro` reference: the `ref` vector with a Hermitian mirror of
/// samples `1..2047` reflected into positions `2049..4095`; position 2048
/// stays zero.
fn load_vibro_chirp(path: &Path) -> Result<Vec<Complex64>> {
    let mut out = load_ref_chirp(path)?;
    for k in 1..CAL_TIME_SAMPLES {
        out[CAL_LEN - k] = out[k].conj();
    }
    Ok(out)
}

/// Synthesizes the ideal linear-FM chirp (spec §4.7) and returns its DFT.
fn ideal_chirp_spectrum() -> Vec<Complex64> {
    const FLO: f64 = 15.0e6;
    const FHI: f64 = 25.0e6;
    const PLEN: f64 = 85.05e-6;
    const DT: f64 = 135.0e-6 / 3600.0;
    let bandwidth = FHI - FLO;
    let fslope = bandwidth / PLEN;
    let active_samples = (PLEN / DT).round() as usize;

    let mut time_domain = vec![Complex64::new(0.0, 0.0); IDEAL_LEN];
    for k in 0..active_samples.min(IDEAL_LEN) {
        let t = k as f64 * DT;
        let phase = 2.0 * std::f64::consts::PI * t * (FHI + fslope * t / 2.0);
        time_domain[k] = Complex64::new(phase.sin(), 0.0);
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(IDEAL_LEN);
    fft.process(&mut time_domain);
    time_domain
}

fn rotate_right(values: &[Complex64], shift: usize) -> Vec<Complex64> {
    let len = values.len();
    let mut out = vec![Complex64::new(0.0, 0.0); len];
    for (i, v) in values.iter().enumerate() {
        out[(i + shift) % len] = *v;
    }
    out
}

/// Loads `cal_filter.dat`, zero-pads its 1800 complex samples to length 3600,
/// and rotates the result right by 900 (spec §4.7).
fn load_cal_filter_spectrum(path: &Path) -> Result<Vec<Complex64>> {
    let floats = read_le_f32_vec(path, IDEAL_LEN)?;
    let half = IDEAL_LEN / 2;
    let mut padded = vec![Complex64::new(0.0, 0.0); IDEAL_LEN];
    for k in 0..half {
        padded[k] = Complex64::new(floats[k] as f64, floats[half + k] as f64);
    }
    Ok(rotate_right(&padded, 900))
}

fn upb_chirp_spectrum(calibration_dir: &Path) -> Result<Vec<Complex64>> {
    let ideal = ideal_chirp_spectrum();
    let cal_filter = load_cal_filter_spectrum(&calibration_dir.join("cal_filter.dat"))?;
    Ok(ideal
        .iter()
        .zip(cal_filter.iter())
        .map(|(a, b)| a * b)
        .collect())
}

/// Resolves chirps from a calibration directory, caching on-disk `ref`/
/// `vibro` loads by `(tx_anchor_index, rx_anchor_index)`.
pub struct ChirpBank {
    calibration_dir: PathBuf,
    cache: HashMap<(usize, usize, bool), Vec<Complex64>>,
}

impl ChirpBank {
    pub fn new(calibration_dir: impl Into<PathBuf>) -> Self {
        ChirpBank {
            calibration_dir: calibration_dir.into(),
            cache: HashMap::new(),
        }
    }

    /// Returns the length-L reference spectrum for `mode` at the given
    /// transmitter/receiver temperatures.
    pub fn chirp(&mut self, tx_temp: f32, rx_temp: f32, mode: ChirpMode) -> Result<Vec<Complex64>> {
        match mode {
            ChirpMode::Ideal => Ok(ideal_chirp_spectrum()),
            ChirpMode::Upb => upb_chirp_spectrum(&self.calibration_dir),
            ChirpMode::Ref | ChirpMode::Vibro => {
                let tx_idx = nearest_anchor_index(tx_temp, &TX_ANCHORS);
                let rx_idx = nearest_anchor_index(rx_temp, &RX_ANCHORS);
                let is_vibro = mode == ChirpMode::Vibro;
                let key = (tx_idx, rx_idx, is_vibro);
                if let Some(cached) = self.cache.get(&key) {
                    return Ok(cached.clone());
                }
                let filename = format!(
                    "reference_chirp_{}_{}.dat",
                    TX_CODES[tx_idx], RX_CODES[rx_idx]
                );
                let path = self.calibration_dir.join(filename);
                let chirp = if is_vibro {
                    load_vibro_chirp(&path)?
                } else {
                    load_ref_chirp(&path)?
                };
                self.cache.insert(key, chirp.clone());
                Ok(chirp)
            }
        }
    }
}
