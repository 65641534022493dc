//! Ground-processing pipeline for Mars radar-sounder Experiment Data
//! Records (EDR).
//!
//! The pipeline runs single-threaded and cooperative-sequential: each
//! science record is decoded, decompressed, range-compressed, and
//! coherently summed into its output column before the next record is
//! read. There is no parallel or streaming execution and no SAR focusing.
//!
//! # Module organization
//!
//! - `mode_table`: instrument mode code → presum/bit-depth/record-length (C1)
//! - `auxiliary`: 267-byte per-record geometry/telemetry table reader (C2)
//! - `record_splitter`: fixed-length science record framing (C3)
//! - `ancillary`: 186-byte per-record header decoder (C4)
//! - `echo_decoder`: packed two's-complement echo sample unpacking (C5)
//! - `decompress`: static/dynamic scale recovery (C6)
//! - `chirp`: calibration chirp / reference spectrum provider (C7)
//! - `window`: Kaiser window builder (C8)
//! - `range_compress`: FFT matched filter (C9)
//! - `driver`: orchestrates the above into the full presum pipeline (C10)

mod ancillary;
mod auxiliary;
mod bitfield;
mod chirp;
mod decompress;
mod driver;
mod echo_decoder;
mod error;
mod mode_table;
mod range_compress;
mod record_splitter;
mod window;

pub use ancillary::{AncillaryHeader, OstLine, Psafs};
pub use auxiliary::{read_auxiliary_table, AuxiliaryRecord};
pub use chirp::{ChirpBank, ChirpMode};
pub use decompress::{decompress, DecompressionMode};
pub use driver::{run, BinaryColumnSink, ColumnSink, DriverConfig, FilterType};
pub use echo_decoder::decode as decode_echo;
pub use error::{Error, Result};
pub use mode_table::{lookup as lookup_mode, prf_hz, Mode};
pub use range_compress::range_compress;
pub use record_splitter::RecordSplitter;
pub use window::kaiser;
