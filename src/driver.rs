//! C10 — Presum Accumulator / Driver: orchestrates C1–C9 into the full
//! observation pipeline, coherently summing range-compressed profiles into
//! output columns and streaming them out as they complete.
//!
//! The driver holds the science, auxiliary, and calibration file handles for
//! the lifetime of one call and releases them on every exit path, including
//! error paths, by relying on ordinary Rust scoping rather than manual
//! cleanup.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use num_complex::Complex64;

use crate::ancillary;
use crate::auxiliary::{self, AuxiliaryRecord};
use crate::chirp::{ChirpBank, ChirpMode};
use crate::decompress::{self, DecompressionMode};
use crate::echo_decoder;
use crate::error::{Error, Result};
use crate::mode_table;
use crate::range_compress;
use crate::record_splitter::RecordSplitter;
use crate::window;

/// Destination for completed output columns, written in increasing column
/// order as groups of records finish accumulating.
pub trait ColumnSink {
    fn write_column(&mut self, index: usize, column: &[Complex64]) -> Result<()>;
}

/// Writes columns as a flat stream of little-endian `(re, im)` f64 pairs,
/// column-major, so the matrix never needs to be held resident (spec §5).
pub struct BinaryColumnSink<W: Write> {
    writer: W,
}

impl<W: Write> BinaryColumnSink<W> {
    pub fn new(writer: W) -> Self {
        BinaryColumnSink { writer }
    }
}

impl<W: Write> ColumnSink for BinaryColumnSink<W> {
    fn write_column(&mut self, _index: usize, column: &[Complex64]) -> Result<()> {
        for c in column {
            self.writer.write_all(&c.re.to_le_bytes())?;
            self.writer.write_all(&c.im.to_le_bytes())?;
        }
        Ok(())
    }
}

/// `filter_type` recognized by the core; only `Match` is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Match,
    Inverse,
}

/// Run configuration observed by the core (CLI parsing is a caller concern).
pub struct DriverConfig {
    pub mode_code: String,
    pub chirp_mode: ChirpMode,
    pub beta: f64,
    pub presum_proc: u32,
    pub filter_type: FilterType,
    pub decompression_mode: DecompressionMode,
    pub apply_window: bool,
}

/// `F = max(1, floor(P/N))`; warns and clamps to 1 if `P < N` (spec §7's one
/// recoverable condition).
fn effective_presum_factor(presum_proc: u32, on_board_presum: u32) -> u32 {
    if presum_proc < on_board_presum {
        log::warn!(
            "requested processing presum {presum_proc} is below the on-board presum \
             {on_board_presum}; clamping to a factor of 1"
        );
        return 1;
    }
    (presum_proc / on_board_presum).max(1)
}

/// Runs the full pipeline over one observation, streaming completed columns
/// to `sink`.
pub fn run(
    science_path: impl AsRef<Path>,
    auxiliary_path: impl AsRef<Path>,
    calibration_dir: impl AsRef<Path>,
    config: &DriverConfig,
    sink: &mut impl ColumnSink,
) -> Result<()> {
    if config.filter_type == FilterType::Inverse {
        return Err(Error::UnsupportedFilterType("inverse".to_string()));
    }

    let mode = mode_table::lookup(&config.mode_code)?;
    let aux_table = auxiliary::read_auxiliary_table(auxiliary_path)?;

    let science_file = File::open(science_path)?;
    let mut splitter = RecordSplitter::open(science_file, mode.record_length_bytes);

    let f = effective_presum_factor(config.presum_proc, mode.presum_n);
    let l = config.chirp_mode.reference_len();
    let taper = if config.beta > 0.0 {
        Some(window::kaiser(l, config.beta))
    } else {
        None
    };

    let mut chirp_bank = ChirpBank::new(calibration_dir.as_ref());

    let mut accumulator: Option<Vec<Complex64>> = None;
    let mut accumulator_group: Option<usize> = None;
    let mut record_index = 0usize;

    while let Some((anc_bytes, echo_bytes, _)) = splitter.next_record()? {
        let anc = ancillary::parse(&anc_bytes)?;
        let ints = echo_decoder::decode(&echo_bytes, mode.bits_per_sample)?;
        let decompressed = decompress::decompress(
            &ints,
            config.decompression_mode,
            mode.presum_n,
            mode.bits_per_sample,
            anc.sdi_bit_field,
        );

        let aux_record: &AuxiliaryRecord = aux_table.get(record_index).ok_or_else(|| {
            Error::CorruptAuxiliary(format!(
                "auxiliary table has {} records, science stream reached record {record_index}",
                aux_table.len()
            ))
        })?;

        let reference = chirp_bank.chirp(aux_record.tx_temp, aux_record.rx_temp, config.chirp_mode)?;
        let profile = range_compress::range_compress(
            &decompressed,
            &reference,
            taper.as_deref(),
            config.apply_window,
        );

        let group = record_index / f as usize;
        match accumulator_group {
            Some(g) if g == group => {
                let acc = accumulator.as_mut().expect("group set implies accumulator set");
                for (a, v) in acc.iter_mut().zip(profile.iter()) {
                    *a += v;
                }
            }
            _ => {
                if let Some(g) = accumulator_group {
                    sink.write_column(g, accumulator.as_ref().unwrap())?;
                }
                accumulator = Some(profile);
                accumulator_group = Some(group);
            }
        }

        record_index += 1;
    }

    if let Some(g) = accumulator_group {
        sink.write_column(g, accumulator.as_ref().unwrap())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    struct VecSink {
        columns: Vec<(usize, Vec<Complex64>)>,
    }

    impl ColumnSink for VecSink {
        fn write_column(&mut self, index: usize, column: &[Complex64]) -> Result<()> {
            self.columns.push((index, column.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn presum_factor_clamps_when_too_small() {
        assert_eq!(effective_presum_factor(2, 8), 1);
        assert_eq!(effective_presum_factor(16, 4), 4);
        assert_eq!(effective_presum_factor(4, 4), 1);
    }

    fn write_science_record(buf: &mut Vec<u8>, sample_value: u8) {
        buf.extend(std::iter::repeat(0u8).take(186));
        buf.extend(std::iter::repeat(sample_value).take(3600));
    }

    fn write_aux_record(buf: &mut Vec<u8>) {
        buf.extend(std::iter::repeat(0u8).take(267));
    }

    #[test]
    fn end_to_end_single_record_produces_one_column() {
        let dir = tempfile::tempdir().unwrap();

        let mut science = Vec::new();
        write_science_record(&mut science, 0x01);
        let science_path = dir.path().join("science.dat");
        File::create(&science_path).unwrap().write_all(&science).unwrap();

        let mut aux = Vec::new();
        write_aux_record(&mut aux);
        let aux_path = dir.path().join("aux.dat");
        File::create(&aux_path).unwrap().write_all(&aux).unwrap();

        let config = DriverConfig {
            mode_code: "SS07".to_string(),
            chirp_mode: ChirpMode::Ideal,
            beta: 0.0,
            presum_proc: 1,
            filter_type: FilterType::Match,
            decompression_mode: DecompressionMode::Static,
            apply_window: false,
        };

        let mut sink = VecSink { columns: Vec::new() };
        run(&science_path, &aux_path, dir.path(), &config, &mut sink).unwrap();

        assert_eq!(sink.columns.len(), 1);
        let (index, column) = &sink.columns[0];
        assert_eq!(*index, 0);
        assert_eq!(column.len(), 3600);
    }

    #[test]
    fn inverse_filter_is_rejected_before_any_io() {
        let config = DriverConfig {
            mode_code: "SS07".to_string(),
            chirp_mode: ChirpMode::Ideal,
            beta: 0.0,
            presum_proc: 1,
            filter_type: FilterType::Inverse,
            decompression_mode: DecompressionMode::Static,
            apply_window: false,
        };
        let mut sink = VecSink { columns: Vec::new() };
        let err = run(
            "/nonexistent/science.dat",
            "/nonexistent/aux.dat",
            "/nonexistent/cal",
            &config,
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFilterType(_)));
    }
}
