//! C2 — Auxiliary Reader: fixed-width, big-endian decoder for the 267-byte
//! auxiliary table that carries per-record geometry and housekeeping
//! telemetry alongside the science stream.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

const RECORD_LEN: usize = 267;
const GEOMETRY_EPOCH_LEN: usize = 23;

/// One decoded auxiliary record.
///
/// Field set and offsets follow spec §6; every scalar the source's
/// `parseAuxFile` captured is kept (spec §SPEC_FULL 4.2) so downstream
/// geometry/CSV export has a complete, faithful record rather than a
/// cherry-picked subset.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryRecord {
    pub scet_block_whole: u32,
    pub scet_block_frac: u16,
    pub ephemeris_time: f64,
    pub elapsed_time: f64,
    pub geometry_epoch: String,
    pub solar_longitude: f64,
    pub orbit_number: i32,
    pub x_mars_sc_position_vector: f64,
    pub y_mars_sc_position_vector: f64,
    pub z_mars_sc_position_vector: f64,
    pub spacecraft_altitude: f64,
    pub sub_sc_east_longitude: f64,
    pub sub_sc_planetocentric_latitude: f64,
    pub sub_sc_planetographic_latitude: f64,
    pub x_mars_sc_velocity_vector: f64,
    pub y_mars_sc_velocity_vector: f64,
    pub z_mars_sc_velocity_vector: f64,
    pub mars_sc_radial_velocity: f64,
    pub mars_sc_tangential_velocity: f64,
    pub local_true_solar_time: f64,
    pub solar_zenith_angle: f64,
    pub sc_pitch_angle: f64,
    pub sc_yaw_angle: f64,
    pub sc_roll_angle: f64,
    pub mro_samx_inner_gimbal_angle: f64,
    pub mro_samx_outer_gimbal_angle: f64,
    pub mro_sapx_inner_gimbal_angle: f64,
    pub mro_sapx_outer_gimbal_angle: f64,
    pub mro_hga_inner_gimbal_angle: f64,
    pub mro_hga_outer_gimbal_angle: f64,
    pub des_temp: f32,
    pub des_5v: f32,
    pub des_12v: f32,
    pub des_2v5: f32,
    /// Receiver temperature (°C). Feeds the calibration chirp selector (C7).
    pub rx_temp: f32,
    /// Transmitter temperature (°C). Feeds the calibration chirp selector (C7).
    pub tx_temp: f32,
    pub tx_lev: f32,
    pub tx_curr: f32,
    pub corrupted_data_flag: i16,
}

fn f64_at(buf: &[u8], offset: usize) -> f64 {
    f64::from_be_bytes(buf[offset..offset + 8].try_into().unwrap())
}

fn f32_at(buf: &[u8], offset: usize) -> f32 {
    f32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
}

fn decode_record(buf: &[u8], first_ephemeris_time: f64) -> Result<AuxiliaryRecord> {
    let ephemeris_time = f64_at(buf, 6);
    if ephemeris_time.is_nan() {
        return Err(Error::CorruptAuxiliary(
            "EPHEMERIS_TIME is NaN".to_string(),
        ));
    }
    Ok(AuxiliaryRecord {
        scet_block_whole: u32::from_be_bytes(buf[0..4].try_into().unwrap()),
        scet_block_frac: u16::from_be_bytes(buf[4..6].try_into().unwrap()),
        ephemeris_time,
        elapsed_time: ephemeris_time - first_ephemeris_time,
        geometry_epoch: String::from_utf8_lossy(&buf[14..14 + GEOMETRY_EPOCH_LEN]).into_owned(),
        solar_longitude: f64_at(buf, 37),
        orbit_number: i32::from_be_bytes(buf[45..49].try_into().unwrap()),
        x_mars_sc_position_vector: f64_at(buf, 49),
        y_mars_sc_position_vector: f64_at(buf, 57),
        z_mars_sc_position_vector: f64_at(buf, 65),
        spacecraft_altitude: f64_at(buf, 73),
        sub_sc_east_longitude: f64_at(buf, 81),
        sub_sc_planetocentric_latitude: f64_at(buf, 89),
        sub_sc_planetographic_latitude: f64_at(buf, 97),
        x_mars_sc_velocity_vector: f64_at(buf, 105),
        y_mars_sc_velocity_vector: f64_at(buf, 113),
        z_mars_sc_velocity_vector: f64_at(buf, 121),
        mars_sc_radial_velocity: f64_at(buf, 129),
        mars_sc_tangential_velocity: f64_at(buf, 137),
        local_true_solar_time: f64_at(buf, 145),
        solar_zenith_angle: f64_at(buf, 153),
        sc_pitch_angle: f64_at(buf, 161),
        sc_yaw_angle: f64_at(buf, 169),
        sc_roll_angle: f64_at(buf, 177),
        mro_samx_inner_gimbal_angle: f64_at(buf, 185),
        mro_samx_outer_gimbal_angle: f64_at(buf, 193),
        mro_sapx_inner_gimbal_angle: f64_at(buf, 201),
        mro_sapx_outer_gimbal_angle: f64_at(buf, 209),
        mro_hga_inner_gimbal_angle: f64_at(buf, 217),
        mro_hga_outer_gimbal_angle: f64_at(buf, 225),
        des_temp: f32_at(buf, 233),
        des_5v: f32_at(buf, 237),
        des_12v: f32_at(buf, 241),
        des_2v5: f32_at(buf, 245),
        rx_temp: f32_at(buf, 249),
        tx_temp: f32_at(buf, 253),
        tx_lev: f32_at(buf, 257),
        tx_curr: f32_at(buf, 261),
        corrupted_data_flag: i16::from_be_bytes(buf[265..267].try_into().unwrap()),
    })
}

/// Reads the whole auxiliary table for an observation, in science-record order.
pub fn read_auxiliary_table<P: AsRef<Path>>(path: P) -> Result<Vec<AuxiliaryRecord>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    if data.len() % RECORD_LEN != 0 {
        return Err(Error::CorruptAuxiliary(format!(
            "file size {} is not a multiple of {RECORD_LEN}",
            data.len()
        )));
    }

    let nrec = data.len() / RECORD_LEN;
    let mut records = Vec::with_capacity(nrec);
    let first_ephemeris_time = if nrec > 0 { f64_at(&data[0..RECORD_LEN], 6) } else { 0.0 };

    for i in 0..nrec {
        let buf = &data[i * RECORD_LEN..(i + 1) * RECORD_LEN];
        records.push(decode_record(buf, first_ephemeris_time)?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn synthetic_record(ephemeris_time: f64, tx_temp: f32, rx_temp: f32) -> Vec<u8> {
        let mut buf = vec![0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&1u32.to_be_bytes());
        buf[4..6].copy_from_slice(&2u16.to_be_bytes());
        buf[6..14].copy_from_slice(&ephemeris_time.to_be_bytes());
        buf[14..37].copy_from_slice(b"2020-001T00:00:00.000Z");
        buf[253..257].copy_from_slice(&tx_temp.to_be_bytes());
        buf[249..253].copy_from_slice(&rx_temp.to_be_bytes());
        buf
    }

    #[test]
    fn elapsed_time_is_relative_to_first_record() {
        let mut tempfile = NamedTempFile::new().unwrap();
        tempfile.write_all(&synthetic_record(100.0, 3.0, 30.0)).unwrap();
        tempfile.write_all(&synthetic_record(105.5, 3.0, 30.0)).unwrap();

        let recs = read_auxiliary_table(tempfile.path()).unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].elapsed_time, 0.0);
        assert_eq!(recs[1].elapsed_time, 5.5);
        assert!(recs[1].elapsed_time >= recs[0].elapsed_time);
        assert_eq!(recs[0].tx_temp, 3.0);
        assert_eq!(recs[0].rx_temp, 30.0);
    }

    #[test]
    fn non_multiple_of_record_len_is_corrupt() {
        let mut tempfile = NamedTempFile::new().unwrap();
        tempfile.write_all(&[0u8; 10]).unwrap();

        let result = read_auxiliary_table(tempfile.path());
        assert!(matches!(result, Err(Error::CorruptAuxiliary(_))));
    }

    #[test]
    fn nan_ephemeris_time_is_rejected() {
        let mut tempfile = NamedTempFile::new().unwrap();
        tempfile.write_all(&synthetic_record(f64::NAN, 0.0, 0.0)).unwrap();

        let result = read_auxiliary_table(tempfile.path());
        assert!(matches!(result, Err(Error::CorruptAuxiliary(_))));
    }
}
