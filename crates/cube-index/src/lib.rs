//! Data-cube probing.
//!
//! A cube is an index file describing many pre-extracted forecast grids
//! plus one or more companion data files of packed 32-bit floats. The index
//! groups records into super-PDS blocks that share an element identity and
//! reference time; each inner PDS record locates one grid in a data file.

pub mod data;
pub mod layout;
pub mod probe;

pub use data::DataFileSlot;
pub use layout::{CubeIndex, PdsRecord, SuperPds, GDSLEN, HEADLEN};
pub use probe::{probe_cube_file, CubeProbeConfig};

use thiserror::Error;

/// Missing-value sentinel of cube data files.
pub const CUBE_MISSING: f64 = 9999.0;

/// Result type for cube operations.
pub type CubeResult<T> = Result<T, CubeError>;

#[derive(Debug, Error)]
pub enum CubeError {
    #[error("Cube index truncated at byte {at}")]
    Truncated { at: usize },

    #[error("Invalid cube index: {0}")]
    Invalid(String),

    #[error("GDS index {index} out of range (1..={count})")]
    BadGdsIndex { index: u16, count: usize },

    #[error("Unsupported cube projection type {0}")]
    BadProjection(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
