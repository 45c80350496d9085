//! GRIB2 message probing.
//!
//! Walks a byte stream of concatenated GRIB messages, extracts the metadata
//! the matcher needs from the section structure, unpacks grid values through
//! the external `grib` crate, and samples matching grids at the probe
//! points.
//!
//! A message consists of 8 sections; sections 2 through 7 may repeat for
//! multiple sub-grids within one message:
//!
//! - Section 0: Indicator (16 bytes) - magic, edition, message length
//! - Section 1: Identification - center, reference time
//! - Section 2: Local Use (optional) - NDFD weather string table
//! - Section 3: Grid Definition - projection geometry
//! - Section 4: Product Definition - variable, level, valid time
//! - Section 5: Data Representation - packing, missing-value management
//! - Section 6: Bitmap (optional)
//! - Section 7: Data
//! - Section 8: End ("7777")

pub mod meta;
pub mod probe;
pub mod sections;

pub use meta::GridMeta;
pub use probe::{probe_grib_file, probe_grib_stream, GribProbeConfig};

use bytes::Bytes;
use thiserror::Error;

/// Result type for GRIB2 probing.
pub type Grib2Result<T> = Result<T, Grib2ProbeError>;

#[derive(Debug, Error)]
pub enum Grib2ProbeError {
    #[error("Invalid GRIB format: {0}")]
    InvalidFormat(String),

    #[error("Unexpected end of data")]
    UnexpectedEnd,

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Unsupported GRIB edition {0}")]
    UnsupportedEdition(u8),

    #[error("Data unpacking failed: {0}")]
    UnpackingError(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}

/// One GRIB message: the raw bytes plus per-sub-grid metadata.
#[derive(Debug, Clone)]
pub struct Grib2Message {
    /// Byte offset of the message in the stream.
    pub offset: usize,
    pub edition: u8,
    /// Metadata of each sub-grid, in sub-grid order.
    pub metas: Vec<GridMeta>,
    raw: Bytes,
}

impl Grib2Message {
    /// Unpack every sub-grid's values, in sub-grid order.
    ///
    /// Decoding goes through the external `grib` crate, which handles the
    /// simple, complex and PNG packing templates NDFD uses.
    pub fn unpack(&self) -> Grib2Result<Vec<Vec<f64>>> {
        use std::io::Cursor;

        let cursor = Cursor::new(self.raw.as_ref());
        let grib_file = grib::from_reader(cursor)
            .map_err(|e| Grib2ProbeError::UnpackingError(format!("parse failed: {}", e)))?;

        let mut grids = Vec::new();
        for (_index, submessage) in grib_file.iter() {
            let decoder = grib::Grib2SubmessageDecoder::from(submessage)
                .map_err(|e| Grib2ProbeError::UnpackingError(format!("decoder: {}", e)))?;
            let values: Vec<f64> = decoder
                .dispatch()
                .map_err(|e| Grib2ProbeError::UnpackingError(format!("decode: {}", e)))?
                .map(|v| v as f64)
                .collect();
            grids.push(values);
        }

        if grids.len() != self.metas.len() {
            return Err(Grib2ProbeError::UnpackingError(format!(
                "unpacker produced {} sub-grids, section walk found {}",
                grids.len(),
                self.metas.len()
            )));
        }
        Ok(grids)
    }
}

/// Streaming reader over concatenated GRIB messages.
pub struct Grib2Stream {
    data: Bytes,
    offset: usize,
}

impl Grib2Stream {
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.offset < self.data.len()
    }

    /// Read the next message.
    ///
    /// Edition-1 messages are recognised by their 3-byte length field and
    /// skipped, so the caller only ever sees edition-2 messages. Trailing
    /// bytes shorter than a section-0 header end the stream.
    pub fn next_message(&mut self) -> Grib2Result<Option<Grib2Message>> {
        loop {
            if self.offset + 16 > self.data.len() {
                if self.offset < self.data.len() {
                    tracing::debug!(
                        trailing = self.data.len() - self.offset,
                        "ignoring trailing bytes after last message"
                    );
                }
                return Ok(None);
            }

            let head = &self.data[self.offset..];
            if &head[0..4] != b"GRIB" {
                return Err(Grib2ProbeError::InvalidFormat(format!(
                    "bad magic at offset {}",
                    self.offset
                )));
            }

            let edition = head[7];
            match edition {
                2 => {
                    let len = u64::from_be_bytes([
                        head[8], head[9], head[10], head[11], head[12], head[13], head[14],
                        head[15],
                    ]) as usize;
                    if len < 16 {
                        return Err(Grib2ProbeError::InvalidFormat(
                            "message length too short".to_string(),
                        ));
                    }
                    if self.offset + len > self.data.len() {
                        return Err(Grib2ProbeError::UnexpectedEnd);
                    }
                    let raw = self.data.slice(self.offset..self.offset + len);
                    let message_offset = self.offset;
                    self.offset += len;

                    let metas = meta::metas_for_message(&raw)?;
                    return Ok(Some(Grib2Message {
                        offset: message_offset,
                        edition,
                        metas,
                        raw,
                    }));
                }
                1 => {
                    // Edition 1 carries its total length in octets 5-7; skip
                    // the message, the unpacker cannot decode it.
                    let len =
                        u32::from_be_bytes([0, head[4], head[5], head[6]]) as usize;
                    if len < 8 || self.offset + len > self.data.len() {
                        return Err(Grib2ProbeError::UnexpectedEnd);
                    }
                    tracing::warn!(offset = self.offset, "skipping GRIB edition 1 message");
                    self.offset += len;
                }
                other => return Err(Grib2ProbeError::UnsupportedEdition(other)),
            }
        }
    }
}
