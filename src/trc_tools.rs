// TRCReader Module
// Decodes LeCroy .trc waveform files (LECROY_2_3 template)

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use crate::error::Result;
use crate::field_reader::{FieldReader, DEFAULT_MARKER_SEARCH_LEN};
use crate::samples::{read_wave_array, time_axis, to_physical};
use crate::wavedesc::WaveDesc;

/// Decode settings.
#[derive(Clone, Debug)]
pub struct TrcOptions {
    /// Leading bytes scanned for the WAVEDESC marker.
    pub marker_search_len: usize,
    /// Fail instead of warning when the template is not LECROY_2_3.
    pub strict_template: bool,
}

impl Default for TrcOptions {
    fn default() -> Self {
        TrcOptions {
            marker_search_len: DEFAULT_MARKER_SEARCH_LEN,
            strict_template: false,
        }
    }
}

impl TrcOptions {
    pub fn marker_search_len(mut self, len: usize) -> Self {
        self.marker_search_len = len;
        self
    }

    pub fn strict_template(mut self, strict: bool) -> Self {
        self.strict_template = strict;
        self
    }
}

/// A fully decoded .trc file.
#[derive(Clone, Debug)]
pub struct TrcFile {
    metadata: WaveDesc,
    raw_samples: Vec<i16>,
    voltages: Vec<f64>,
    times: Vec<f64>,
}

impl TrcFile {
    /// Load and decode a .trc file from disk.
    pub fn open<P: AsRef<Path>>(input_file: P) -> Result<Self> {
        Self::open_with_options(input_file, &TrcOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(input_file: P, options: &TrcOptions) -> Result<Self> {
        let file_handle = File::open(input_file)?;
        Self::from_reader_with_options(BufReader::new(file_handle), options)
    }

    /// Decode an in-memory copy of a .trc file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_bytes_with_options(bytes: &[u8], options: &TrcOptions) -> Result<Self> {
        Self::from_reader_with_options(Cursor::new(bytes), options)
    }

    pub fn from_reader<R: Read + Seek>(source: R) -> Result<Self> {
        Self::from_reader_with_options(source, &TrcOptions::default())
    }

    /// Decode from any seekable source. The source is consumed and dropped
    /// before returning, on success and on error alike.
    pub fn from_reader_with_options<R: Read + Seek>(source: R, options: &TrcOptions) -> Result<Self> {
        let mut reader = FieldReader::new(source, options.marker_search_len)?;

        let metadata = WaveDesc::read(&mut reader, options.strict_template)?;
        let raw_samples = read_wave_array(&mut reader, &metadata.lengths, metadata.sample_format)?;

        let voltages = to_physical(&raw_samples, metadata.vertical_gain, metadata.vertical_offset);
        let times = time_axis(
            voltages.len(),
            metadata.horiz_interval as f64,
            metadata.horiz_offset,
        );

        Ok(TrcFile {
            metadata,
            raw_samples,
            voltages,
            times,
        })
    }

    pub fn metadata(&self) -> &WaveDesc {
        &self.metadata
    }

    /// Stored integer samples, before gain and offset.
    pub fn raw_samples(&self) -> &[i16] {
        &self.raw_samples
    }

    /// Sample values in vertical units (usually volts).
    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    /// Sample times in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Split into `(times, voltages, metadata)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, WaveDesc) {
        (self.times, self.voltages, self.metadata)
    }

    /// Write `Time,Voltage` rows to a CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(output_file)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "Time,Voltage")?;
        for (time, voltage) in self.times.iter().zip(&self.voltages) {
            writeln!(writer, "{:.12e},{:.6e}", time, voltage)?;
        }

        writer.flush()?;
        Ok(())
    }
}
