//! C1 — Mode Table: pure lookup from a 4-character instrument mode code to
//! its presumming/bit-depth/record-length descriptor.
//!
//! The table is process-global, read-only, and compile-time-known (spec
//! §3). There are 21 "SS" (subsurface-sounding) codes and 21 "RO"
//! (receive-only) codes, each with the same `{presum, bits_per_sample}`
//! pattern, so the two families share one backing array rather than
//! duplicating the arithmetic.

use crate::error::{Error, Result};

/// Number of bits per echo sample supported by the instrument.
pub type BitsPerSample = u8;

/// Immutable descriptor for one instrument operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// The 4-character mode code, e.g. `"SS04"`.
    pub mode_code: [u8; 4],
    /// On-board coherent presum count, one of {1,2,4,8,16,28,32}.
    pub presum_n: u32,
    /// Bits per packed echo sample, one of {4,6,8}.
    pub bits_per_sample: BitsPerSample,
    /// Total science record length in bytes (186-byte ancillary + echo payload).
    pub record_length_bytes: usize,
}

impl Mode {
    /// Length in bytes of the echo payload (record minus the 186-byte ancillary header).
    pub fn echo_payload_len(&self) -> usize {
        self.record_length_bytes - ANCILLARY_LEN
    }

    pub fn mode_code_str(&self) -> String {
        String::from_utf8_lossy(&self.mode_code).into_owned()
    }
}

const ANCILLARY_LEN: usize = 186;

/// `{presum, bits_per_sample}` pattern shared by SS01..SS21 and RO01..RO21,
/// indexed by `(code_number - 1)`.
const PATTERN: [(u32, BitsPerSample); 21] = [
    (32, 8),
    (28, 6),
    (16, 4),
    (8, 8),
    (4, 6),
    (2, 4),
    (1, 8),
    (32, 6),
    (28, 4),
    (16, 8),
    (8, 6),
    (4, 4),
    (2, 8),
    (1, 6),
    (32, 4),
    (28, 8),
    (16, 6),
    (8, 4),
    (4, 8),
    (2, 6),
    (1, 4),
];

fn record_length(bits_per_sample: BitsPerSample) -> usize {
    ANCILLARY_LEN + (3600 * bits_per_sample as usize) / 8
}

/// Look up a mode by its 4-character code, e.g. `"SS04"` or `"RO13"`.
///
/// The first two characters must be `"SS"` or `"RO"`; the last two must be
/// a zero-padded decimal in `01..=21`. Anything else is `Error::UnknownMode`.
pub fn lookup(code: &str) -> Result<Mode> {
    let bytes = code.as_bytes();
    if bytes.len() != 4 {
        return Err(Error::UnknownMode(code.to_string()));
    }
    let family = &code[0..2];
    if family != "SS" && family != "RO" {
        return Err(Error::UnknownMode(code.to_string()));
    }
    let number: usize = code[2..4]
        .parse()
        .map_err(|_| Error::UnknownMode(code.to_string()))?;
    if number == 0 || number > PATTERN.len() {
        return Err(Error::UnknownMode(code.to_string()));
    }
    let (presum_n, bits_per_sample) = PATTERN[number - 1];
    let mut mode_code = [0u8; 4];
    mode_code.copy_from_slice(bytes);
    Ok(Mode {
        mode_code,
        presum_n,
        bits_per_sample,
        record_length_bytes: record_length(bits_per_sample),
    })
}

/// Closed PRF-code-to-frequency mapping (spec §9 "PRF field"): the numeric
/// PRF code embedded in a product's filename maps to a calibrated frequency
/// in Hz rather than being used as a raw string.
pub fn prf_hz(prf_code: &str) -> Option<f64> {
    match prf_code {
        "335" => Some(335.12),
        "350" => Some(350.14),
        "387" => Some(387.60),
        "670" => Some(670.24),
        "700" => Some(700.28),
        "775" => Some(775.19),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ss04_matches_spec() {
        let m = lookup("SS04").unwrap();
        assert_eq!(m.presum_n, 8);
        assert_eq!(m.bits_per_sample, 8);
        assert_eq!(m.record_length_bytes, 3786);
    }

    #[test]
    fn ss06_matches_spec() {
        let m = lookup("SS06").unwrap();
        assert_eq!(m.presum_n, 2);
        assert_eq!(m.bits_per_sample, 4);
        assert_eq!(m.record_length_bytes, 1986);
    }

    #[test]
    fn ro13_matches_spec() {
        let m = lookup("RO13").unwrap();
        assert_eq!(m.presum_n, 2);
        assert_eq!(m.bits_per_sample, 8);
        assert_eq!(m.record_length_bytes, 3786);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(lookup("XX99"), Err(Error::UnknownMode(_))));
    }

    #[test]
    fn record_length_invariant_holds_for_every_mode() {
        for n in 1..=21 {
            for family in ["SS", "RO"] {
                let code = format!("{family}{n:02}");
                let m = lookup(&code).unwrap();
                let expected = 186 + (3600 * m.bits_per_sample as usize) / 8;
                assert_eq!(m.record_length_bytes, expected);
                assert!(matches!(m.bits_per_sample, 4 | 6 | 8));
            }
        }
    }

    #[test]
    fn prf_table_matches_spec() {
        assert_eq!(prf_hz("700"), Some(700.28));
        assert_eq!(prf_hz("999"), None);
    }
}
