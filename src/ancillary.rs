//! C4 — Ancillary Parser: decodes the 186-byte per-record ancillary header,
//! including the two embedded bit-fields `OST_LINE` (17 bytes) and `PSAFS`
//! (2 bytes).
//!
//! Field offsets follow spec §6 exactly. `SPARE*` fields are parsed (to
//! advance the cursor and keep offsets self-checking) but carry no meaning
//! downstream.

use crate::bitfield::BitReader;
use crate::error::{Error, Result};

const HEADER_LEN: usize = 186;

/// The 17-byte `OST_LINE` control word (spec §6 bit layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OstLine {
    pub pulse_repetition_interval: u8,
    pub phase_compensation_type: u8,
    pub data_length_taken: u32,
    pub operative_mode: u8,
    pub manual_gain_control: u8,
    /// Primary input to C6 (Decompressor): selects the static vs. dynamic scaling branch.
    pub compression_selection: bool,
    pub closed_loop_tracking: bool,
    pub tracking_data_storage: bool,
    pub tracking_pre_summing: u8,
    pub tracking_logic_sel: u8,
    pub threshold_logic_sel: u8,
    pub sample_number: u8,
    pub alpha_beta: u8,
    pub reference_bit: u8,
    pub threshold: u8,
    pub threshold_increment: u8,
    pub initial_echo_value: u8,
    pub expected_echo_shift: u8,
    pub window_left_shift: u8,
    pub window_right_shift: u8,
}

fn decode_ost_line(bytes: &[u8]) -> OstLine {
    let mut r = BitReader::new(bytes);
    let pulse_repetition_interval = r.read_u64(4) as u8;
    let phase_compensation_type = r.read_u64(4) as u8;
    r.skip(2); // SPARE[8:10]
    let data_length_taken = r.read_u64(22) as u32;
    let operative_mode = r.read_u64(8) as u8;
    let manual_gain_control = r.read_u64(8) as u8;
    let compression_selection = r.read_bool();
    let closed_loop_tracking = r.read_bool();
    let tracking_data_storage = r.read_bool();
    let tracking_pre_summing = r.read_u64(3) as u8;
    let tracking_logic_sel = r.read_u64(1) as u8;
    let threshold_logic_sel = r.read_u64(1) as u8;
    let sample_number = r.read_u64(4) as u8;
    r.skip(1); // SPARE[60:61]
    let alpha_beta = r.read_u64(2) as u8;
    let reference_bit = r.read_u64(1) as u8;
    let threshold = r.read_u64(8) as u8;
    let threshold_increment = r.read_u64(8) as u8;
    r.skip(4); // SPARE[80:84]
    let initial_echo_value = r.read_u64(3) as u8;
    let expected_echo_shift = r.read_u64(3) as u8;
    let window_left_shift = r.read_u64(3) as u8;
    let window_right_shift = r.read_u64(3) as u8;
    r.skip(40); // SPARE[96:136] (spec's own table lists this as SPARE[96:128],
                // which is 8 bits short of the 17-byte/136-bit OST_LINE block)

    OstLine {
        pulse_repetition_interval,
        phase_compensation_type,
        data_length_taken,
        operative_mode,
        manual_gain_control,
        compression_selection,
        closed_loop_tracking,
        tracking_data_storage,
        tracking_pre_summing,
        tracking_logic_sel,
        threshold_logic_sel,
        sample_number,
        alpha_beta,
        reference_bit,
        threshold,
        threshold_increment,
        initial_echo_value,
        expected_echo_shift,
        window_left_shift,
        window_right_shift,
    }
}

/// The 2-byte `PSAFS` (Packet Segmentation and FPGA Status) word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Psafs {
    pub scientific_data_type: u8,
    pub segmentation_flag: u8,
    pub dma_error: bool,
    pub tc_overrun: bool,
    pub fifo_full: bool,
    pub test: bool,
}

fn decode_psafs(bytes: &[u8]) -> Psafs {
    let mut r = BitReader::new(bytes);
    let scientific_data_type = r.read_u64(1) as u8;
    let segmentation_flag = r.read_u64(2) as u8;
    r.skip(5); // SPARE1
    r.skip(4); // SPARE2
    let dma_error = r.read_bool();
    let tc_overrun = r.read_bool();
    let fifo_full = r.read_bool();
    let test = r.read_bool();

    Psafs {
        scientific_data_type,
        segmentation_flag,
        dma_error,
        tc_overrun,
        fifo_full,
        test,
    }
}

/// Decoded 186-byte ancillary header for one science record.
#[derive(Debug, Clone, PartialEq)]
pub struct AncillaryHeader {
    pub scet_block_whole: u32,
    pub scet_block_frac: u16,
    pub tlm_counter: u32,
    pub fmt_length: u16,
    pub scet_ost_whole: u32,
    pub scet_ost_frac: u16,
    pub ost_line_number: u8,
    pub ost_line: OstLine,
    pub data_block_id: u32,
    pub science_data_source_counter: u16,
    pub psafs: Psafs,
    pub data_block_first_pri: u32,
    pub time_data_block_whole: u32,
    pub time_data_block_frac: u16,
    /// Scaling-descriptor field used by the dynamic decompression branch (C6).
    pub sdi_bit_field: u16,
    pub time_n: f32,
    pub radius_n: f32,
    pub tangential_velocity_n: f32,
    pub radial_velocity_n: f32,
    pub tlp: f32,
    pub time_wpf: f32,
    pub delta_time: f32,
    pub tlp_interpolate: f32,
    pub radius_interpolate: f32,
    pub tangential_velocity_interpolate: f32,
    pub radial_velocity_interpolate: f32,
    pub end_tlp: f32,
    pub s_coeffs: [f32; 8],
    pub c_coeffs: [f32; 7],
    pub slope: f32,
    pub topography: f32,
    pub phase_compensation_step: f32,
    pub receive_window_opening_time: f32,
    pub receive_window_position: f32,
}

fn u24_at(buf: &[u8], offset: usize) -> u32 {
    ((buf[offset] as u32) << 16) | ((buf[offset + 1] as u32) << 8) | (buf[offset + 2] as u32)
}

fn f32_at(buf: &[u8], offset: usize) -> f32 {
    f32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
}

fn f32_array<const N: usize>(buf: &[u8], offset: usize) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = f32_at(buf, offset + 4 * i);
    }
    out
}

/// Decodes a 186-byte ancillary header. `data.len()` must be exactly 186.
pub fn parse(data: &[u8]) -> Result<AncillaryHeader> {
    if data.len() != HEADER_LEN {
        return Err(Error::CorruptAuxiliary(format!(
            "ancillary header must be {HEADER_LEN} bytes, got {}",
            data.len()
        )));
    }

    Ok(AncillaryHeader {
        scet_block_whole: u32::from_be_bytes(data[0..4].try_into().unwrap()),
        scet_block_frac: u16::from_be_bytes(data[4..6].try_into().unwrap()),
        tlm_counter: u32::from_be_bytes(data[6..10].try_into().unwrap()),
        fmt_length: u16::from_be_bytes(data[10..12].try_into().unwrap()),
        // SPARE1 at [12..14] parsed only to keep the offset table explicit.
        scet_ost_whole: u32::from_be_bytes(data[14..18].try_into().unwrap()),
        scet_ost_frac: u16::from_be_bytes(data[18..20].try_into().unwrap()),
        // SPARE2 at [20..21].
        ost_line_number: data[21],
        ost_line: decode_ost_line(&data[22..39]),
        // SPARE3 at [38..39] overlaps the OST_LINE tail per spec layout; not separately read.
        data_block_id: u24_at(data, 39),
        science_data_source_counter: u16::from_be_bytes(data[42..44].try_into().unwrap()),
        psafs: decode_psafs(&data[44..46]),
        // SPARE4 at [46..47].
        data_block_first_pri: u24_at(data, 47),
        time_data_block_whole: u32::from_be_bytes(data[50..54].try_into().unwrap()),
        time_data_block_frac: u16::from_be_bytes(data[54..56].try_into().unwrap()),
        sdi_bit_field: u16::from_be_bytes(data[56..58].try_into().unwrap()),
        time_n: f32_at(data, 58),
        radius_n: f32_at(data, 62),
        tangential_velocity_n: f32_at(data, 66),
        radial_velocity_n: f32_at(data, 70),
        tlp: f32_at(data, 74),
        time_wpf: f32_at(data, 78),
        delta_time: f32_at(data, 82),
        tlp_interpolate: f32_at(data, 86),
        radius_interpolate: f32_at(data, 90),
        tangential_velocity_interpolate: f32_at(data, 94),
        radial_velocity_interpolate: f32_at(data, 98),
        end_tlp: f32_at(data, 102),
        s_coeffs: f32_array::<8>(data, 106),
        c_coeffs: f32_array::<7>(data, 138),
        slope: f32_at(data, 166),
        topography: f32_at(data, 170),
        phase_compensation_step: f32_at(data, 174),
        receive_window_opening_time: f32_at(data, 178),
        receive_window_position: f32_at(data, 182),
    })
}
