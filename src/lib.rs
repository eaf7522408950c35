// src/lib.rs
// TRC Reader Library - Public API

//! # TRC Reader
//!
//! A Rust library for reading LeCroy oscilloscope `.trc` files.
//!
//! ## Features
//!
//! - Locate the WAVEDESC block behind an arbitrary preamble
//! - Detect byte order and 8/16-bit sample width from the descriptor
//! - Decode the LECROY_2_3 metadata into a typed [`WaveDesc`]
//! - Scale samples to vertical units and synthesize the time axis
//! - Export data to CSV format
//!
//! ## Example
//!
//! ```no_run
//! use trc_reader::TrcFile;
//!
//! let trc = TrcFile::open("C1Trace00000.trc").expect("Failed to load file");
//!
//! println!("Timebase: {}", trc.metadata().timebase);
//! println!("Trigger time: {}", trc.metadata().trigger_time);
//! println!("Samples: {}", trc.voltages().len());
//!
//! // Export to CSV
//! trc.write_csv("output.csv").expect("Failed to write CSV");
//!
//! let (times, voltages, _metadata) = trc.into_parts();
//! println!("First sample: {} V at {} s", voltages[0], times[0]);
//! ```

mod error;
mod field_reader;
mod samples;
mod tables;
mod trc_tools;
mod wavedesc;

pub use error::{ErrorKind, Result, TrcError};
pub use field_reader::{locate_wavedesc, Endian, FieldReader, SampleFormat, WAVEDESC_MARKER};
pub use samples::{read_wave_array, time_axis, to_physical};
pub use tables::{FIXED_VERT_GAINS, PROCESSINGS, RECORD_TYPES, TIMEBASES, VERT_COUPLINGS};
pub use trc_tools::{TrcFile, TrcOptions};
pub use wavedesc::{read_trigger_time, BlockLengths, MetaValue, WaveDesc, SUPPORTED_TEMPLATE};
