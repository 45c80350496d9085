//! Cube fixture builder.
//!
//! Writes byte-exact index and data files into a temp directory so
//! end-to-end tests can probe a real cube from disk.

use cube_index::{GDSLEN, HEADLEN};
use projection::{EarthShape, GridDefinition, GridTemplate};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One record to place in a [`CubeFixture`].
pub struct FixtureRecord {
    pub valid_epoch: f64,
    pub data_file: String,
    pub offset: i32,
    pub big_endian: bool,
    pub scan: u8,
    pub wx_table: Vec<String>,
}

/// One super-PDS block to place in a [`CubeFixture`].
pub struct FixtureSuper {
    pub name: String,
    pub ref_epoch: f64,
    pub unit: String,
    pub comment: String,
    pub gds_index: u16,
    pub center: u16,
    pub subcenter: u16,
    pub records: Vec<FixtureRecord>,
}

/// A cube on disk, rooted in its own temp directory.
pub struct CubeFixture {
    dir: TempDir,
    index_path: PathBuf,
}

impl CubeFixture {
    /// Write an index named `conus.flx` describing `gds` and `supers`.
    pub fn build(gds: &[GridDefinition], supers: &[FixtureSuper]) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let index_path = dir.path().join("conus.flx");

        let mut bytes = vec![0u8; HEADLEN];
        bytes.extend_from_slice(&(gds.len() as u16).to_le_bytes());
        for def in gds {
            bytes.extend_from_slice(&gds_block(def));
        }
        bytes.extend_from_slice(&(supers.len() as u16).to_le_bytes());
        for sp in supers {
            bytes.extend_from_slice(&super_bytes(sp));
        }
        fs::write(&index_path, bytes).expect("write index");

        Self { dir, index_path }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write a companion data file of packed 32-bit floats.
    pub fn write_data(&self, name: &str, values: &[f32], big_endian: bool) {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            let raw = if big_endian {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            };
            bytes.extend_from_slice(&raw);
        }
        fs::write(self.dir.path().join(name), bytes).expect("write data file");
    }
}

/// Small lat/lon grid shared by most fixtures: 3x3, 1 degree spacing,
/// southwest corner at 20N 230E.
pub fn small_latlon_grid() -> GridDefinition {
    GridDefinition {
        template: GridTemplate::LatLon,
        nx: 3,
        ny: 3,
        lat1: 20.0,
        lon1: 230.0,
        orient_lon: 0.0,
        dx: 1.0,
        dy: 1.0,
        mesh_lat: 0.0,
        latin2: 0.0,
        scan: 64,
        earth: EarthShape::grib_default(),
    }
}

fn gds_block(def: &GridDefinition) -> Vec<u8> {
    let mut b = Vec::with_capacity(GDSLEN);
    b.push(match def.template {
        GridTemplate::LatLon => 0u8,
        GridTemplate::Mercator => 1,
        GridTemplate::LambertConformal => 3,
    });
    b.extend_from_slice(&(def.nx as u32).to_le_bytes());
    b.extend_from_slice(&(def.ny as u32).to_le_bytes());
    for v in [
        def.lat1,
        def.lon1,
        def.orient_lon,
        def.dx,
        def.dy,
        def.mesh_lat,
        def.latin2,
    ] {
        b.extend_from_slice(&v.to_le_bytes());
    }
    b.push(def.scan);
    b.extend_from_slice(&def.earth.mean_radius_m().to_le_bytes());
    b.resize(GDSLEN, 0);
    b
}

fn super_bytes(sp: &FixtureSuper) -> Vec<u8> {
    let mut body = Vec::new();
    body.push(sp.name.len() as u8);
    body.extend_from_slice(sp.name.as_bytes());
    body.extend_from_slice(&sp.ref_epoch.to_le_bytes());
    body.push(sp.unit.len() as u8);
    body.extend_from_slice(sp.unit.as_bytes());
    body.push(sp.comment.len() as u8);
    body.extend_from_slice(sp.comment.as_bytes());
    body.extend_from_slice(&sp.gds_index.to_le_bytes());
    body.extend_from_slice(&sp.center.to_le_bytes());
    body.extend_from_slice(&sp.subcenter.to_le_bytes());
    body.extend_from_slice(&(sp.records.len() as u16).to_le_bytes());

    let super_len = body.len() as u16;
    for rec in &sp.records {
        body.extend_from_slice(&record_bytes(rec));
    }

    let total = (body.len() + 6) as i32;
    let mut out = Vec::with_capacity(body.len() + 6);
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(&super_len.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn record_bytes(rec: &FixtureRecord) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&rec.valid_epoch.to_le_bytes());
    body.push(rec.data_file.len() as u8);
    body.extend_from_slice(rec.data_file.as_bytes());
    body.extend_from_slice(&rec.offset.to_le_bytes());
    body.push(if rec.big_endian { 1 } else { 0 });
    body.push(rec.scan);
    body.extend_from_slice(&(rec.wx_table.len() as u16).to_le_bytes());
    for s in &rec.wx_table {
        body.extend_from_slice(&(s.len() as u16).to_le_bytes());
        body.extend_from_slice(s.as_bytes());
    }

    let mut out = Vec::with_capacity(body.len() + 2);
    out.extend_from_slice(&((body.len() + 2) as u16).to_le_bytes());
    out.extend_from_slice(&body);
    out
}
