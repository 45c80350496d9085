//! Cube index parsing.
//!
//! Index layout, all integers little-endian, offsets from the start of the
//! file:
//!
//! - `HEADLEN` bytes of header, opaque to this module.
//! - u16 GDS count, then that many fixed-size `GDSLEN`-byte GDS blocks.
//! - u16 super-PDS count.
//! - Per super-PDS: i32 total length, u16 super length (skipped), u8-length
//!   element name, f64 reference time (epoch seconds), u8-length unit,
//!   u8-length comment, u16 GDS index (1-based), u16 center, u16 subcenter,
//!   u16 record count, then the inner PDS records.
//! - Per inner PDS: u16 record length, f64 valid time, u8-length data-file
//!   name, i32 data offset, u8 endian flag (1 = big), u8 scan mode (0 or
//!   64), u16 table count, then per entry a u16 length and the ugly string.
//!
//! A GDS block holds: u8 projection type (0 lat/lon, 1 Mercator, 3 Lambert
//! conformal), u32 nx, u32 ny, then f64 lat1, lon1, orient lon, dx, dy,
//! mesh lat, latin2, u8 scan flag, f64 earth radius in meters; the rest of
//! the block is zero padding.

use crate::{CubeError, CubeResult};
use chrono::{DateTime, Utc};
use grid_sampler::ScanOrder;
use probe_common::time::from_epoch_seconds;
use projection::{EarthShape, GridDefinition, GridTemplate};
use std::fs;
use std::path::Path;

/// Opaque index header length.
pub const HEADLEN: usize = 128;
/// Fixed GDS block length.
pub const GDSLEN: usize = 96;

/// One inner PDS record: a single grid in a data file.
#[derive(Debug, Clone)]
pub struct PdsRecord {
    pub valid_time: DateTime<Utc>,
    pub data_file: String,
    pub data_offset: i32,
    pub big_endian: bool,
    pub scan: ScanOrder,
    /// Ugly-string table for weather-coded records; empty otherwise.
    pub wx_table: Vec<String>,
}

/// One super-PDS block: records sharing an element identity.
#[derive(Debug, Clone)]
pub struct SuperPds {
    pub element_name: String,
    pub reference_time: DateTime<Utc>,
    pub unit: String,
    pub comment: String,
    /// 1-based index into the GDS table.
    pub gds_index: u16,
    pub center: u16,
    pub subcenter: u16,
    pub records: Vec<PdsRecord>,
}

/// A parsed cube index.
#[derive(Debug, Clone)]
pub struct CubeIndex {
    pub gds: Vec<GridDefinition>,
    pub supers: Vec<SuperPds>,
}

impl CubeIndex {
    pub fn load(path: &Path) -> CubeResult<Self> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> CubeResult<Self> {
        let mut r = Reader::new(bytes);
        r.skip(HEADLEN)?;

        let num_gds = r.u16()? as usize;
        let mut gds = Vec::with_capacity(num_gds);
        for _ in 0..num_gds {
            let block = r.bytes(GDSLEN)?;
            gds.push(parse_gds_block(block)?);
        }

        let num_supers = r.u16()? as usize;
        let mut supers = Vec::with_capacity(num_supers);
        for _ in 0..num_supers {
            supers.push(parse_super_pds(&mut r)?);
        }

        Ok(Self { gds, supers })
    }

    /// Grid definition a super-PDS points at.
    pub fn gds_for(&self, sp: &SuperPds) -> CubeResult<&GridDefinition> {
        if sp.gds_index == 0 || sp.gds_index as usize > self.gds.len() {
            return Err(CubeError::BadGdsIndex {
                index: sp.gds_index,
                count: self.gds.len(),
            });
        }
        Ok(&self.gds[sp.gds_index as usize - 1])
    }
}

fn parse_super_pds(r: &mut Reader<'_>) -> CubeResult<SuperPds> {
    let len_total = r.i32()?;
    if len_total < 0 {
        return Err(CubeError::Invalid(format!(
            "negative super-PDS length {}",
            len_total
        )));
    }
    let _super_len = r.u16()?;

    let element_name = r.short_string()?;
    let reference_time = r.epoch_time()?;
    let unit = r.short_string()?;
    let comment = r.short_string()?;
    let gds_index = r.u16()?;
    let center = r.u16()?;
    let subcenter = r.u16()?;
    let num_pds = r.u16()? as usize;

    let mut records = Vec::with_capacity(num_pds);
    for _ in 0..num_pds {
        records.push(parse_pds_record(r)?);
    }

    Ok(SuperPds {
        element_name,
        reference_time,
        unit,
        comment,
        gds_index,
        center,
        subcenter,
        records,
    })
}

fn parse_pds_record(r: &mut Reader<'_>) -> CubeResult<PdsRecord> {
    let _len_pds = r.u16()?;
    let valid_time = r.epoch_time()?;
    let data_file = r.short_string()?;
    let data_offset = r.i32()?;
    let endian = r.u8()?;
    let scan = ScanOrder::from_flag(r.u8()?);
    let num_table = r.u16()? as usize;

    let mut wx_table = Vec::with_capacity(num_table);
    for _ in 0..num_table {
        let len = r.u16()? as usize;
        let raw = r.bytes(len)?;
        wx_table.push(String::from_utf8_lossy(raw).into_owned());
    }

    Ok(PdsRecord {
        valid_time,
        data_file,
        data_offset,
        big_endian: endian == 1,
        scan,
        wx_table,
    })
}

fn parse_gds_block(block: &[u8]) -> CubeResult<GridDefinition> {
    let mut r = Reader::new(block);
    let proj_type = r.u8()?;
    let nx = r.u32()? as usize;
    let ny = r.u32()? as usize;
    let lat1 = r.f64()?;
    let lon1 = r.f64()?;
    let orient_lon = r.f64()?;
    let dx = r.f64()?;
    let dy = r.f64()?;
    let mesh_lat = r.f64()?;
    let latin2 = r.f64()?;
    let scan = r.u8()?;
    let radius = r.f64()?;

    let template = match proj_type {
        0 => GridTemplate::LatLon,
        1 => GridTemplate::Mercator,
        3 => GridTemplate::LambertConformal,
        other => return Err(CubeError::BadProjection(other)),
    };

    Ok(GridDefinition {
        template,
        nx,
        ny,
        lat1,
        lon1,
        orient_lon,
        dx,
        dy,
        mesh_lat,
        latin2,
        scan,
        earth: EarthShape::spherical(radius),
    })
}

/// Little-endian byte reader with positional errors.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, n: usize) -> CubeResult<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(CubeError::Truncated { at: self.pos });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn skip(&mut self, n: usize) -> CubeResult<()> {
        self.bytes(n).map(|_| ())
    }

    fn u8(&mut self) -> CubeResult<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> CubeResult<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> CubeResult<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> CubeResult<i32> {
        let b = self.bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f64(&mut self) -> CubeResult<f64> {
        let b = self.bytes(8)?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// u8 length prefix + that many bytes of text.
    fn short_string(&mut self) -> CubeResult<String> {
        let len = self.u8()? as usize;
        let raw = self.bytes(len)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    fn epoch_time(&mut self) -> CubeResult<DateTime<Utc>> {
        let at = self.pos;
        let secs = self.f64()?;
        from_epoch_seconds(secs)
            .ok_or_else(|| CubeError::Invalid(format!("bad epoch time {} at byte {}", secs, at)))
    }
}
