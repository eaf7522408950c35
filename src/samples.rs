// Sample array decoding and axis synthesis

use std::io::{Read, Seek};

use log::{debug, trace};

use crate::error::{Result, TrcError};
use crate::field_reader::{Endian, FieldReader, SampleFormat};
use crate::wavedesc::{BlockLengths, WAVE_ARRAY_1_LENGTH_OFFSET};

/// Read WAVE_ARRAY_1 as raw integer samples.
///
/// 16-bit samples of a big-endian file are byte-swapped after reading;
/// 8-bit samples are taken as stored.
pub fn read_wave_array<R: Read + Seek>(
    reader: &mut FieldReader<R>,
    lengths: &BlockLengths,
    format: SampleFormat,
) -> Result<Vec<i16>> {
    let width = format.bytes_per_sample();
    let byte_len = lengths.wave_array_1 as usize;
    if byte_len % width != 0 {
        return Err(TrcError::InvalidLength {
            field: "WAVE_ARRAY_1",
            offset: reader.block_offset() + WAVE_ARRAY_1_LENGTH_OFFSET,
            length: byte_len as i64,
        });
    }
    let count = byte_len / width;
    let offset = lengths.wave_array_1_offset();
    trace!("WAVE_ARRAY_1 at +{} ({} bytes)", offset, byte_len);

    let raw: Vec<i16> = match format {
        SampleFormat::Int8 => reader
            .read_i8_array("WAVE_ARRAY_1", offset, count)?
            .into_iter()
            .map(i16::from)
            .collect(),
        SampleFormat::Int16 => {
            let mut samples = reader.read_i16_array("WAVE_ARRAY_1", offset, count)?;
            if reader.endian() == Endian::Big {
                for sample in samples.iter_mut() {
                    *sample = sample.swap_bytes();
                }
            }
            samples
        }
    };

    debug!("Decoded {} {:?} samples", count, format);
    Ok(raw)
}

/// Convert raw samples to physical units: `gain * raw - offset`.
pub fn to_physical(raw: &[i16], gain: f32, offset: f32) -> Vec<f64> {
    let gain = gain as f64;
    let offset = offset as f64;
    raw.iter().map(|&value| gain * value as f64 - offset).collect()
}

/// Sample times; the first sample sits one interval after `offset`.
pub fn time_axis(count: usize, interval: f64, offset: f64) -> Vec<f64> {
    (0..count)
        .map(|k| (k + 1) as f64 * interval + offset)
        .collect()
}
