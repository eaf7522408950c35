// Positioned field access for the WAVEDESC block
//
// Every offset handed to the reader is relative to the located WAVEDESC
// marker, never to the start of the file.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use log::debug;

use crate::error::{Result, TrcError};

/// Literal that opens the descriptor block.
pub const WAVEDESC_MARKER: &[u8; 8] = b"WAVEDESC";

/// Number of leading bytes scanned for [`WAVEDESC_MARKER`].
pub const DEFAULT_MARKER_SEARCH_LEN: usize = 64;

/// COMM_TYPE: non-zero means 16-bit samples.
pub const COMM_TYPE_OFFSET: u64 = 32;

/// COMM_ORDER: non-zero means little endian.
pub const COMM_ORDER_OFFSET: u64 = 34;

/// Byte order declared by the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Width of the stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Int8,
    Int16,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Int8 => 1,
            SampleFormat::Int16 => 2,
        }
    }
}

/// Scan the first `search_len` bytes of `source` for the WAVEDESC marker.
pub fn locate_wavedesc<R: Read + Seek>(source: &mut R, search_len: usize) -> Result<u64> {
    source.seek(SeekFrom::Start(0))?;

    let mut lead = Vec::new();
    source.by_ref().take(search_len as u64).read_to_end(&mut lead)?;

    lead.windows(WAVEDESC_MARKER.len())
        .position(|window| window == WAVEDESC_MARKER)
        .map(|pos| pos as u64)
        .ok_or(TrcError::MissingMarker { searched: lead.len() })
}

/// Endian-aware reader bound to one located WAVEDESC block.
///
/// Owns the source for the duration of a single decode; dropping the reader
/// releases it.
pub struct FieldReader<R> {
    source: R,
    block_offset: u64,
    endian: Endian,
}

impl<R: Read + Seek> FieldReader<R> {
    /// Locate the block and detect its byte order.
    pub fn new(mut source: R, search_len: usize) -> Result<Self> {
        let block_offset = locate_wavedesc(&mut source, search_len)?;

        let mut reader = FieldReader {
            source,
            block_offset,
            endian: Endian::Little,
        };

        reader.endian = if reader.read_flag("COMM_ORDER", COMM_ORDER_OFFSET)? != 0 {
            Endian::Little
        } else {
            Endian::Big
        };

        debug!(
            "WAVEDESC located at byte {}, {:?} endian",
            reader.block_offset, reader.endian
        );

        Ok(reader)
    }

    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Sample width from the COMM_TYPE flag.
    pub fn sample_format(&mut self) -> Result<SampleFormat> {
        if self.read_flag("COMM_TYPE", COMM_TYPE_OFFSET)? != 0 {
            Ok(SampleFormat::Int16)
        } else {
            Ok(SampleFormat::Int8)
        }
    }

    /// Flags are read before the byte order is known, so the order is fixed.
    fn read_flag(&mut self, field: &'static str, offset: u64) -> Result<u16> {
        let pos = self.seek(offset)?;
        self.source
            .read_u16::<LittleEndian>()
            .map_err(|e| TrcError::from_read(e, field, pos))
    }

    fn seek(&mut self, offset: u64) -> Result<u64> {
        let pos = self.block_offset + offset;
        self.source.seek(SeekFrom::Start(pos))?;
        Ok(pos)
    }

    fn read_at<T>(
        &mut self,
        field: &'static str,
        offset: u64,
        read: impl FnOnce(&mut R, Endian) -> io::Result<T>,
    ) -> Result<T> {
        let pos = self.seek(offset)?;
        read(&mut self.source, self.endian).map_err(|e| TrcError::from_read(e, field, pos))
    }

    fn read_next<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut R, Endian) -> io::Result<T>,
    ) -> Result<T> {
        let pos = self.source.stream_position()?;
        read(&mut self.source, self.endian).map_err(|e| TrcError::from_read(e, field, pos))
    }

    pub fn read_i16(&mut self, field: &'static str, offset: u64) -> Result<i16> {
        self.read_at(field, offset, read_i16)
    }

    pub fn read_u16(&mut self, field: &'static str, offset: u64) -> Result<u16> {
        self.read_at(field, offset, |src, endian| match endian {
            Endian::Little => src.read_u16::<LittleEndian>(),
            Endian::Big => src.read_u16::<BigEndian>(),
        })
    }

    pub fn read_i32(&mut self, field: &'static str, offset: u64) -> Result<i32> {
        self.read_at(field, offset, |src, endian| match endian {
            Endian::Little => src.read_i32::<LittleEndian>(),
            Endian::Big => src.read_i32::<BigEndian>(),
        })
    }

    pub fn read_f32(&mut self, field: &'static str, offset: u64) -> Result<f32> {
        self.read_at(field, offset, |src, endian| match endian {
            Endian::Little => src.read_f32::<LittleEndian>(),
            Endian::Big => src.read_f32::<BigEndian>(),
        })
    }

    pub fn read_f64(&mut self, field: &'static str, offset: u64) -> Result<f64> {
        self.read_at(field, offset, |src, endian| match endian {
            Endian::Little => src.read_f64::<LittleEndian>(),
            Endian::Big => src.read_f64::<BigEndian>(),
        })
    }

    /// Next byte after the previous read.
    pub fn next_i8(&mut self, field: &'static str) -> Result<i8> {
        self.read_next(field, |src, _| src.read_i8())
    }

    /// Next 16-bit word after the previous read.
    pub fn next_i16(&mut self, field: &'static str) -> Result<i16> {
        self.read_next(field, read_i16)
    }

    /// Fixed-width text, cut at the first NUL byte.
    pub fn read_string(&mut self, field: &'static str, offset: u64, len: usize) -> Result<String> {
        let pos = self.seek(offset)?;
        self.ensure_available(field, pos, len)?;

        let mut raw = vec![0u8; len];
        self.source
            .read_exact(&mut raw)
            .map_err(|e| TrcError::from_read(e, field, pos))?;

        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        raw.truncate(end);

        String::from_utf8(raw).map_err(|e| TrcError::InvalidText {
            field,
            offset: pos,
            reason: e.to_string(),
        })
    }

    pub fn read_i8_array(&mut self, field: &'static str, offset: u64, count: usize) -> Result<Vec<i8>> {
        let pos = self.seek(offset)?;
        self.ensure_available(field, pos, count)?;

        let mut samples = vec![0i8; count];
        self.source
            .read_i8_into(&mut samples)
            .map_err(|e| TrcError::from_read(e, field, pos))?;
        Ok(samples)
    }

    pub fn read_i16_array(&mut self, field: &'static str, offset: u64, count: usize) -> Result<Vec<i16>> {
        let pos = self.seek(offset)?;
        self.ensure_available(field, pos, count * 2)?;

        let mut samples = vec![0i16; count];
        let filled = match self.endian {
            Endian::Little => self.source.read_i16_into::<LittleEndian>(&mut samples),
            Endian::Big => self.source.read_i16_into::<BigEndian>(&mut samples),
        };
        filled.map_err(|e| TrcError::from_read(e, field, pos))?;
        Ok(samples)
    }

    /// Reject lengths the source cannot satisfy before allocating for them.
    fn ensure_available(&mut self, field: &'static str, pos: u64, len: usize) -> Result<()> {
        let end = self.source.seek(SeekFrom::End(0))?;
        self.source.seek(SeekFrom::Start(pos))?;
        if pos.saturating_add(len as u64) > end {
            return Err(TrcError::TruncatedInput { field, offset: pos });
        }
        Ok(())
    }
}

fn read_i16<R: Read>(src: &mut R, endian: Endian) -> io::Result<i16> {
    match endian {
        Endian::Little => src.read_i16::<LittleEndian>(),
        Endian::Big => src.read_i16::<BigEndian>(),
    }
}
