// WAVEDESC metadata extraction

use std::fmt;
use std::io::{Read, Seek};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use log::{debug, warn};

use crate::error::{Result, TrcError};
use crate::field_reader::{Endian, FieldReader, SampleFormat};
use crate::tables::{FIXED_VERT_GAINS, PROCESSINGS, RECORD_TYPES, TIMEBASES, VERT_COUPLINGS};

/// Template the fixed offsets below are taken from.
pub const SUPPORTED_TEMPLATE: &str = "LECROY_2_3";

/// Start of the trigger timestamp (seconds double, then five packed fields).
pub const TRIGGER_TIME_OFFSET: u64 = 296;

/// Where the WAVE_ARRAY_1 byte length is stored.
pub const WAVE_ARRAY_1_LENGTH_OFFSET: u64 = 60;

/// Byte lengths of the sections that follow the descriptor block.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLengths {
    pub wave_descriptor: u32,
    pub user_text: u32,
    pub trigtime_array: u32,
    pub ris_time_array: u32,
    pub wave_array_1: u32,
    pub wave_array_2: u32,
}

impl BlockLengths {
    pub fn read<R: Read + Seek>(reader: &mut FieldReader<R>) -> Result<Self> {
        let lengths = BlockLengths {
            wave_descriptor: read_length(reader, "WAVE_DESCRIPTOR", 36)?,
            user_text: read_length(reader, "USER_TEXT", 40)?,
            trigtime_array: read_length(reader, "TRIGTIME_ARRAY", 48)?,
            ris_time_array: read_length(reader, "RIS_TIME_ARRAY", 52)?,
            wave_array_1: read_length(reader, "WAVE_ARRAY_1", WAVE_ARRAY_1_LENGTH_OFFSET)?,
            wave_array_2: read_length(reader, "WAVE_ARRAY_2", 64)?,
        };
        debug!("Block lengths: {:?}", lengths);
        Ok(lengths)
    }

    /// Offset of WAVE_ARRAY_1 relative to the WAVEDESC marker.
    pub fn wave_array_1_offset(&self) -> u64 {
        self.wave_descriptor as u64
            + self.user_text as u64
            + self.trigtime_array as u64
            + self.ris_time_array as u64
    }
}

fn read_length<R: Read + Seek>(
    reader: &mut FieldReader<R>,
    field: &'static str,
    offset: u64,
) -> Result<u32> {
    let length = reader.read_i32(field, offset)?;
    u32::try_from(length).map_err(|_| TrcError::InvalidLength {
        field,
        offset: reader.block_offset() + offset,
        length: length as i64,
    })
}

/// Decoded WAVEDESC block.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveDesc {
    pub template_name: String,
    pub sample_format: SampleFormat,
    pub endian: Endian,
    pub lengths: BlockLengths,

    // Instrument
    pub instrument_name: String,
    pub instrument_number: i32,
    pub trace_label: String,

    // Waveform
    pub wave_array_count: i32,
    pub pnts_per_screen: i32,
    pub first_valid_pnt: i32,
    pub last_valid_pnt: i32,
    pub first_point: i32,
    pub sparsing_factor: i32,
    pub segment_index: i32,
    pub subarray_count: i32,
    pub sweeps_per_acq: i32,
    pub points_per_pair: i16,
    pub pair_offset: i16,
    /// Physical value = `vertical_gain * raw - vertical_offset`.
    pub vertical_gain: f32,
    pub vertical_offset: f32,
    pub max_value: f32,
    pub min_value: f32,
    pub nominal_bits: i16,
    pub nom_subarray_count: i16,
    /// Sampling interval for time domain waveforms.
    pub horiz_interval: f32,
    /// Seconds between the trigger and the first data point.
    pub horiz_offset: f64,
    pub pixel_offset: f64,
    pub vert_unit: String,
    pub hor_unit: String,
    pub horiz_uncertainty: f32,
    pub trigger_time: NaiveDateTime,
    pub acq_duration: f32,
    pub record_type: &'static str,
    pub processing_done: &'static str,
    pub ris_sweeps: i16,
    pub timebase: &'static str,
    pub vert_coupling: &'static str,
    pub probe_att: f32,
    pub fixed_vert_gain: &'static str,
    pub bandwidth_limit: bool,
    pub vertical_vernier: f32,
    pub acq_vert_offset: f32,
    pub wave_source: u16,
    pub user_text: String,
}

impl WaveDesc {
    /// Decode the whole descriptor from an already located block.
    ///
    /// A template other than LECROY_2_3 is only reported unless
    /// `strict_template` is set; the offsets are applied either way.
    pub fn read<R: Read + Seek>(reader: &mut FieldReader<R>, strict_template: bool) -> Result<Self> {
        let template_name = reader.read_string("TEMPLATE_NAME", 16, 16)?;
        if template_name != SUPPORTED_TEMPLATE {
            if strict_template {
                return Err(TrcError::UnsupportedTemplate(template_name));
            }
            warn!(
                "Unsupported file template '{}', decoding as {} anyway",
                template_name, SUPPORTED_TEMPLATE
            );
        }

        let sample_format = reader.sample_format()?;
        let endian = reader.endian();
        let lengths = BlockLengths::read(reader)?;

        Ok(WaveDesc {
            template_name,
            sample_format,
            endian,
            lengths,

            instrument_name: reader.read_string("INSTRUMENT_NAME", 76, 16)?,
            instrument_number: reader.read_i32("INSTRUMENT_NUMBER", 92)?,
            trace_label: reader.read_string("TRACE_LABEL", 96, 16)?,

            wave_array_count: reader.read_i32("WAVE_ARRAY_COUNT", 116)?,
            pnts_per_screen: reader.read_i32("PNTS_PER_SCREEN", 120)?,
            first_valid_pnt: reader.read_i32("FIRST_VALID_PNT", 124)?,
            last_valid_pnt: reader.read_i32("LAST_VALID_PNT", 128)?,
            first_point: reader.read_i32("FIRST_POINT", 132)?,
            sparsing_factor: reader.read_i32("SPARSING_FACTOR", 136)?,
            segment_index: reader.read_i32("SEGMENT_INDEX", 140)?,
            subarray_count: reader.read_i32("SUBARRAY_COUNT", 144)?,
            sweeps_per_acq: reader.read_i32("SWEEPS_PER_ACQ", 148)?,
            points_per_pair: reader.read_i16("POINTS_PER_PAIR", 152)?,
            pair_offset: reader.read_i16("PAIR_OFFSET", 154)?,
            vertical_gain: reader.read_f32("VERTICAL_GAIN", 156)?,
            vertical_offset: reader.read_f32("VERTICAL_OFFSET", 160)?,
            max_value: reader.read_f32("MAX_VALUE", 164)?,
            min_value: reader.read_f32("MIN_VALUE", 168)?,
            nominal_bits: reader.read_i16("NOMINAL_BITS", 172)?,
            nom_subarray_count: reader.read_i16("NOM_SUBARRAY_COUNT", 174)?,
            horiz_interval: reader.read_f32("HORIZ_INTERVAL", 176)?,
            horiz_offset: reader.read_f64("HORIZ_OFFSET", 180)?,
            pixel_offset: reader.read_f64("PIXEL_OFFSET", 188)?,
            vert_unit: reader.read_string("VERTUNIT", 196, 48)?,
            hor_unit: reader.read_string("HORUNIT", 244, 48)?,
            horiz_uncertainty: reader.read_f32("HORIZ_UNCERTAINTY", 292)?,
            trigger_time: read_trigger_time(reader, TRIGGER_TIME_OFFSET)?,
            acq_duration: reader.read_f32("ACQ_DURATION", 312)?,
            record_type: lookup(reader, "RECORD_TYPE", 316, &RECORD_TYPES)?,
            processing_done: lookup(reader, "PROCESSING_DONE", 318, &PROCESSINGS)?,
            ris_sweeps: reader.read_i16("RIS_SWEEPS", 322)?,
            timebase: lookup(reader, "TIMEBASE", 324, &TIMEBASES)?,
            vert_coupling: lookup(reader, "VERT_COUPLING", 326, &VERT_COUPLINGS)?,
            probe_att: reader.read_f32("PROBE_ATT", 328)?,
            fixed_vert_gain: lookup(reader, "FIXED_VERT_GAIN", 332, &FIXED_VERT_GAINS)?,
            bandwidth_limit: reader.read_u16("BANDWIDTH_LIMIT", 334)? != 0,
            vertical_vernier: reader.read_f32("VERTICAL_VERNIER", 336)?,
            acq_vert_offset: reader.read_f32("ACQ_VERT_OFFSET", 340)?,
            wave_source: reader.read_u16("WAVE_SOURCE", 344)?,
            // User text sits right after the descriptor, whatever its length.
            user_text: reader.read_string(
                "USER_TEXT",
                lengths.wave_descriptor as u64,
                lengths.user_text as usize,
            )?,
        })
    }

    /// Named view of the descriptor, in template order.
    pub fn fields(&self) -> Vec<(&'static str, MetaValue)> {
        use MetaValue::*;

        vec![
            ("TEMPLATE_NAME", Text(self.template_name.clone())),
            ("INSTRUMENT_NAME", Text(self.instrument_name.clone())),
            ("INSTRUMENT_NUMBER", Int(self.instrument_number as i64)),
            ("TRACE_LABEL", Text(self.trace_label.clone())),
            ("WAVE_ARRAY_COUNT", Int(self.wave_array_count as i64)),
            ("PNTS_PER_SCREEN", Int(self.pnts_per_screen as i64)),
            ("FIRST_VALID_PNT", Int(self.first_valid_pnt as i64)),
            ("LAST_VALID_PNT", Int(self.last_valid_pnt as i64)),
            ("FIRST_POINT", Int(self.first_point as i64)),
            ("SPARSING_FACTOR", Int(self.sparsing_factor as i64)),
            ("SEGMENT_INDEX", Int(self.segment_index as i64)),
            ("SUBARRAY_COUNT", Int(self.subarray_count as i64)),
            ("SWEEPS_PER_ACQ", Int(self.sweeps_per_acq as i64)),
            ("POINTS_PER_PAIR", Int(self.points_per_pair as i64)),
            ("PAIR_OFFSET", Int(self.pair_offset as i64)),
            ("VERTICAL_GAIN", Float(self.vertical_gain as f64)),
            ("VERTICAL_OFFSET", Float(self.vertical_offset as f64)),
            ("MAX_VALUE", Float(self.max_value as f64)),
            ("MIN_VALUE", Float(self.min_value as f64)),
            ("NOMINAL_BITS", Int(self.nominal_bits as i64)),
            ("NOM_SUBARRAY_COUNT", Int(self.nom_subarray_count as i64)),
            ("HORIZ_INTERVAL", Float(self.horiz_interval as f64)),
            ("HORIZ_OFFSET", Float(self.horiz_offset)),
            ("PIXEL_OFFSET", Float(self.pixel_offset)),
            ("VERTUNIT", Text(self.vert_unit.clone())),
            ("HORUNIT", Text(self.hor_unit.clone())),
            ("HORIZ_UNCERTAINTY", Float(self.horiz_uncertainty as f64)),
            ("TRIGGER_TIME", Timestamp(self.trigger_time)),
            ("ACQ_DURATION", Float(self.acq_duration as f64)),
            ("RECORD_TYPE", Enum(self.record_type)),
            ("PROCESSING_DONE", Enum(self.processing_done)),
            ("RIS_SWEEPS", Int(self.ris_sweeps as i64)),
            ("TIMEBASE", Enum(self.timebase)),
            ("VERT_COUPLING", Enum(self.vert_coupling)),
            ("PROBE_ATT", Float(self.probe_att as f64)),
            ("FIXED_VERT_GAIN", Enum(self.fixed_vert_gain)),
            ("BANDWIDTH_LIMIT", Bool(self.bandwidth_limit)),
            ("VERTICAL_VERNIER", Float(self.vertical_vernier as f64)),
            ("ACQ_VERT_OFFSET", Float(self.acq_vert_offset as f64)),
            ("WAVE_SOURCE", Int(self.wave_source as i64)),
            ("USER_TEXT", Text(self.user_text.clone())),
        ]
    }
}

/// Value of one entry in [`WaveDesc::fields`].
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Enum(&'static str),
    Timestamp(NaiveDateTime),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => write!(f, "{}", s),
            MetaValue::Int(v) => write!(f, "{}", v),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Bool(v) => write!(f, "{}", v),
            MetaValue::Enum(s) => write!(f, "{}", s),
            MetaValue::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%dT%H:%M:%S%.6f")),
        }
    }
}

fn lookup<R: Read + Seek>(
    reader: &mut FieldReader<R>,
    field: &'static str,
    offset: u64,
    table: &[&'static str],
) -> Result<&'static str> {
    let index = reader.read_u16(field, offset)?;
    table
        .get(index as usize)
        .copied()
        .ok_or(TrcError::InvalidEnum {
            field,
            index,
            offset: reader.block_offset() + offset,
            table_len: table.len(),
        })
}

/// Rebuild the trigger time from the seconds double at `offset` and the
/// minute, hour, day, month and year that follow it back to back.
pub fn read_trigger_time<R: Read + Seek>(
    reader: &mut FieldReader<R>,
    offset: u64,
) -> Result<NaiveDateTime> {
    let seconds = reader.read_f64("TRIGGER_TIME", offset)?;
    let minute = reader.next_i8("TRIGGER_TIME minute")?;
    let hour = reader.next_i8("TRIGGER_TIME hour")?;
    let day = reader.next_i8("TRIGGER_TIME day")?;
    let month = reader.next_i8("TRIGGER_TIME month")?;
    let year = reader.next_i16("TRIGGER_TIME year")?;

    build_timestamp(reader.block_offset() + offset, seconds, minute, hour, day, month, year)
}

fn build_timestamp(
    pos: u64,
    seconds: f64,
    minute: i8,
    hour: i8,
    day: i8,
    month: i8,
    year: i16,
) -> Result<NaiveDateTime> {
    let invalid = || {
        TrcError::InvalidTimestamp {
            field: "TRIGGER_TIME",
            offset: pos,
            reason: format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{}",
                year, month, day, hour, minute, seconds
            ),
        }
    };

    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }
    let whole = seconds.trunc();
    let micros = ((seconds - whole) * 1_000_000.0).round() as i64;

    let date = NaiveDate::from_ymd_opt(
        year as i32,
        u32::try_from(month).map_err(|_| invalid())?,
        u32::try_from(day).map_err(|_| invalid())?,
    )
    .ok_or_else(invalid)?;
    let datetime = date
        .and_hms_opt(
            u32::try_from(hour).map_err(|_| invalid())?,
            u32::try_from(minute).map_err(|_| invalid())?,
            whole as u32,
        )
        .ok_or_else(invalid)?;

    // A rounded 1_000_000 carries into the next second.
    datetime
        .checked_add_signed(TimeDelta::microseconds(micros))
        .ok_or_else(invalid)
}
