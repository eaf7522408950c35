// tests/integration.rs
// Integration tests for TRC Reader

use std::io::Write;

use tempfile::NamedTempFile;
use trc_reader::{
    Endian, ErrorKind, MetaValue, SampleFormat, TrcError, TrcFile, FIXED_VERT_GAINS, RECORD_TYPES,
    TIMEBASES, VERT_COUPLINGS,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Synthetic .trc image with the fields the tests care about.
struct TestTrc {
    preamble: usize,
    big_endian: bool,
    int16: bool,
    descriptor_len: usize,
    template: &'static [u8],
    user_text: &'static [u8],
    trigtime_len: usize,
    ris_time_len: usize,
    samples: Vec<i16>,
    record_type: u16,
    timebase: u16,
    vert_coupling: u16,
    fixed_vert_gain: u16,
}

impl Default for TestTrc {
    fn default() -> Self {
        TestTrc {
            preamble: 0,
            big_endian: false,
            int16: true,
            descriptor_len: 346,
            template: b"LECROY_2_3",
            user_text: b"",
            trigtime_len: 0,
            ris_time_len: 0,
            samples: vec![0, 10, 20, 30, 40],
            record_type: 0,
            timebase: 18,
            vert_coupling: 2,
            fixed_vert_gain: 18,
        }
    }
}

impl TestTrc {
    fn put(&self, buf: &mut [u8], offset: usize, le: &[u8], be: &[u8]) {
        let bytes = if self.big_endian { be } else { le };
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn put_i32(&self, buf: &mut [u8], offset: usize, v: i32) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_i16(&self, buf: &mut [u8], offset: usize, v: i16) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_u16(&self, buf: &mut [u8], offset: usize, v: u16) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_f32(&self, buf: &mut [u8], offset: usize, v: f32) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_f64(&self, buf: &mut [u8], offset: usize, v: f64) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn build(&self) -> Vec<u8> {
        let width = if self.int16 { 2 } else { 1 };
        let mut desc = vec![0u8; self.descriptor_len];

        desc[0..8].copy_from_slice(b"WAVEDESC");
        desc[16..16 + self.template.len()].copy_from_slice(self.template);

        // Flags are always stored little endian by the tests.
        if self.int16 {
            desc[32] = 1;
        }
        if !self.big_endian {
            desc[34] = 1;
        }

        self.put_i32(&mut desc, 36, self.descriptor_len as i32);
        self.put_i32(&mut desc, 40, self.user_text.len() as i32);
        self.put_i32(&mut desc, 48, self.trigtime_len as i32);
        self.put_i32(&mut desc, 52, self.ris_time_len as i32);
        self.put_i32(&mut desc, 60, (self.samples.len() * width) as i32);

        desc[76..84].copy_from_slice(b"LECROYWR");
        self.put_i32(&mut desc, 92, 4242);
        desc[96..103].copy_from_slice(b"C1 test");

        self.put_i32(&mut desc, 116, self.samples.len() as i32);
        self.put_i32(&mut desc, 136, 1);
        self.put_i16(&mut desc, 152, -3);
        self.put_f32(&mut desc, 156, 0.25);
        self.put_f32(&mut desc, 160, 1.0);
        self.put_i16(&mut desc, 172, 8);
        self.put_f32(&mut desc, 176, 0.5);
        self.put_f64(&mut desc, 180, -2.0);
        self.put_f64(&mut desc, 188, 0.125);
        desc[196..197].copy_from_slice(b"V");
        desc[244..245].copy_from_slice(b"S");
        self.put_f32(&mut desc, 292, 1e-12);

        // Trigger time: 2015-06-05 14:30:45.25
        self.put_f64(&mut desc, 296, 45.25);
        desc[304] = 30;
        desc[305] = 14;
        desc[306] = 5;
        desc[307] = 6;
        self.put_i16(&mut desc, 308, 2015);

        self.put_f32(&mut desc, 312, 0.75);
        self.put_u16(&mut desc, 316, self.record_type);
        self.put_u16(&mut desc, 318, 2);
        self.put_i16(&mut desc, 322, 1);
        self.put_u16(&mut desc, 324, self.timebase);
        self.put_u16(&mut desc, 326, self.vert_coupling);
        self.put_f32(&mut desc, 328, 10.0);
        self.put_u16(&mut desc, 332, self.fixed_vert_gain);
        self.put_u16(&mut desc, 334, 1);
        self.put_f32(&mut desc, 336, 1.0);
        self.put_f32(&mut desc, 340, -0.5);
        self.put_u16(&mut desc, 344, 2);

        let mut data = vec![0xAAu8; self.preamble];
        data.extend_from_slice(&desc);
        data.extend_from_slice(self.user_text);
        data.extend(std::iter::repeat(0x55u8).take(self.trigtime_len + self.ris_time_len));

        for &sample in &self.samples {
            if self.int16 {
                // Sample arrays end up little endian after the big-endian swap.
                data.extend_from_slice(&sample.to_le_bytes());
            } else {
                data.push(sample as i8 as u8);
            }
        }
        data
    }
}

#[test]
fn test_round_trip_metadata() {
    init_logger();
    let trc = TrcFile::from_bytes(&TestTrc::default().build()).expect("Failed to decode");
    let d = trc.metadata();

    assert_eq!(d.template_name, "LECROY_2_3");
    assert_eq!(d.endian, Endian::Little);
    assert_eq!(d.sample_format, SampleFormat::Int16);
    assert_eq!(d.instrument_name, "LECROYWR");
    assert_eq!(d.instrument_number, 4242);
    assert_eq!(d.trace_label, "C1 test");
    assert_eq!(d.wave_array_count, 5);
    assert_eq!(d.sparsing_factor, 1);
    assert_eq!(d.points_per_pair, -3);
    assert_eq!(d.vertical_gain, 0.25);
    assert_eq!(d.vertical_offset, 1.0);
    assert_eq!(d.nominal_bits, 8);
    assert_eq!(d.horiz_interval, 0.5);
    assert_eq!(d.horiz_offset, -2.0);
    assert_eq!(d.pixel_offset, 0.125);
    assert_eq!(d.vert_unit, "V");
    assert_eq!(d.hor_unit, "S");
    assert_eq!(
        d.trigger_time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        "2015-06-05T14:30:45.250000"
    );
    assert_eq!(d.acq_duration, 0.75);
    assert_eq!(d.record_type, "single_sweep");
    assert_eq!(d.processing_done, "interpolated");
    assert_eq!(d.ris_sweeps, 1);
    assert_eq!(d.timebase, "1_us/div");
    assert_eq!(d.vert_coupling, "DC_1MOhm");
    assert_eq!(d.probe_att, 10.0);
    assert_eq!(d.fixed_vert_gain, "1_V/div");
    assert!(d.bandwidth_limit);
    assert_eq!(d.acq_vert_offset, -0.5);
    assert_eq!(d.wave_source, 2);
    assert_eq!(d.user_text, "");
}

#[test]
fn test_samples_and_time_axis() {
    let trc = TrcFile::from_bytes(&TestTrc::default().build()).unwrap();

    assert_eq!(trc.raw_samples(), &[0, 10, 20, 30, 40]);
    // 0.25 * raw - 1.0
    assert_eq!(trc.voltages(), &[-1.0, 1.5, 4.0, 6.5, 9.0]);
    // (k + 1) * 0.5 - 2.0
    assert_eq!(trc.times(), &[-1.5, -1.0, -0.5, 0.0, 0.5]);

    for pair in trc.times().windows(2) {
        assert!((pair[1] - pair[0] - 0.5).abs() < 1e-12);
    }
}

#[test]
fn test_big_endian_file() {
    let trc = TrcFile::from_bytes(
        &TestTrc {
            big_endian: true,
            preamble: 11,
            ..Default::default()
        }
        .build(),
    )
    .unwrap();

    let d = trc.metadata();
    assert_eq!(d.endian, Endian::Big);
    assert_eq!(d.instrument_number, 4242);
    assert_eq!(d.horiz_offset, -2.0);
    assert_eq!(d.timebase, "1_us/div");
    assert_eq!(d.trigger_time.format("%Y").to_string(), "2015");
    assert_eq!(trc.raw_samples(), &[0, 10, 20, 30, 40]);
}

#[test]
fn test_int8_samples() {
    for big_endian in [false, true] {
        let trc = TrcFile::from_bytes(
            &TestTrc {
                big_endian,
                int16: false,
                samples: vec![-128, -1, 0, 1, 127],
                ..Default::default()
            }
            .build(),
        )
        .unwrap();

        assert_eq!(trc.metadata().sample_format, SampleFormat::Int8);
        assert_eq!(trc.raw_samples(), &[-128, -1, 0, 1, 127]);
    }
}

#[test]
fn test_user_text_follows_descriptor_length() {
    for descriptor_len in [346, 400] {
        let trc = TrcFile::from_bytes(
            &TestTrc {
                descriptor_len,
                user_text: b"bench 3, probe B\0\0\0\0",
                trigtime_len: 16,
                ris_time_len: 8,
                ..Default::default()
            }
            .build(),
        )
        .unwrap();

        assert_eq!(trc.metadata().lengths.wave_descriptor as usize, descriptor_len);
        assert_eq!(trc.metadata().user_text, "bench 3, probe B");
        assert_eq!(trc.raw_samples(), &[0, 10, 20, 30, 40]);
    }
}

#[test]
fn test_enum_one_past_end() {
    let cases = [
        TestTrc {
            record_type: RECORD_TYPES.len() as u16,
            ..Default::default()
        },
        TestTrc {
            timebase: TIMEBASES.len() as u16,
            ..Default::default()
        },
        TestTrc {
            fixed_vert_gain: FIXED_VERT_GAINS.len() as u16,
            ..Default::default()
        },
        TestTrc {
            vert_coupling: VERT_COUPLINGS.len() as u16,
            ..Default::default()
        },
    ];

    for case in cases {
        let err = TrcFile::from_bytes(&case.build()).unwrap_err();
        assert!(matches!(err, TrcError::InvalidEnum { .. }), "unexpected error: {}", err);
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    let trc = TrcFile::from_bytes(
        &TestTrc {
            timebase: TIMEBASES.len() as u16 - 1,
            ..Default::default()
        }
        .build(),
    )
    .unwrap();
    assert_eq!(trc.metadata().timebase, "EXTERNAL");
}

#[test]
fn test_foreign_template_still_decodes() {
    init_logger();
    let trc = TrcFile::from_bytes(
        &TestTrc {
            template: b"LECROY_9_9",
            ..Default::default()
        }
        .build(),
    )
    .unwrap();
    assert_eq!(trc.metadata().template_name, "LECROY_9_9");
    assert_eq!(trc.raw_samples().len(), 5);
}

#[test]
fn test_error_handling() {
    // Missing marker
    let mut data = TestTrc::default().build();
    data[0..8].copy_from_slice(b"NOTADESC");
    let err = TrcFile::from_bytes(&data).unwrap_err();
    assert!(matches!(err, TrcError::MissingMarker { .. }));
    assert_eq!(err.kind(), ErrorKind::Format);

    // Truncated sample array
    let mut data = TestTrc::default().build();
    data.truncate(data.len() - 3);
    let err = TrcFile::from_bytes(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncated);

    // Truncated descriptor
    let data = TestTrc::default().build();
    let err = TrcFile::from_bytes(&data[..200]).unwrap_err();
    assert!(matches!(err, TrcError::TruncatedInput { .. }));

    // Month 13, reported at the absolute trigger-time offset
    let mut data = TestTrc { preamble: 11, ..Default::default() }.build();
    data[11 + 307] = 13;
    let err = TrcFile::from_bytes(&data).unwrap_err();
    assert!(matches!(
        err,
        TrcError::InvalidTimestamp { field: "TRIGGER_TIME", offset: 307, .. }
    ));

    // Non-existent file
    let err = TrcFile::open("non_existent.trc").unwrap_err();
    assert!(matches!(err, TrcError::Io(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_load_from_disk() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(&TestTrc { preamble: 21, ..Default::default() }.build())
        .unwrap();
    temp_file.flush().unwrap();

    let trc = TrcFile::open(temp_file.path()).expect("Failed to load TRC file");
    assert_eq!(trc.voltages().len(), 5);
    assert_eq!(trc.metadata().trace_label, "C1 test");
}

#[test]
fn test_fields_in_template_order() {
    let trc = TrcFile::from_bytes(&TestTrc::default().build()).unwrap();
    let fields = trc.metadata().fields();

    assert_eq!(fields.first().map(|f| f.0), Some("TEMPLATE_NAME"));
    assert_eq!(fields.last().map(|f| f.0), Some("USER_TEXT"));

    let lookup = |name: &str| fields.iter().find(|f| f.0 == name).map(|f| f.1.clone());
    assert_eq!(lookup("TIMEBASE"), Some(MetaValue::Enum("1_us/div")));
    assert_eq!(lookup("BANDWIDTH_LIMIT"), Some(MetaValue::Bool(true)));
    assert_eq!(lookup("INSTRUMENT_NUMBER"), Some(MetaValue::Int(4242)));
    assert_eq!(
        lookup("TRIGGER_TIME").map(|v| v.to_string()),
        Some("2015-06-05T14:30:45.250000".to_string())
    );
}
