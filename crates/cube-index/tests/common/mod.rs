//! Fixture writer for cube probe tests: builds byte-exact index and data
//! files in a temp directory.

use cube_index::{GDSLEN, HEADLEN};
use projection::GridDefinition;
use std::fs;
use std::path::Path;

pub struct SuperSpec {
    pub name: &'static str,
    pub ref_epoch: f64,
    pub unit: &'static str,
    pub comment: &'static str,
    pub gds_index: u16,
    pub center: u16,
    pub subcenter: u16,
    pub records: Vec<RecSpec>,
}

pub struct RecSpec {
    pub valid_epoch: f64,
    pub file: &'static str,
    pub offset: i32,
    pub big_endian: bool,
    pub scan: u8,
    pub table: Vec<&'static str>,
}

pub fn write_index(path: &Path, gds: &[GridDefinition], supers: &[SuperSpec]) {
    let mut bytes = vec![0u8; HEADLEN];

    bytes.extend_from_slice(&(gds.len() as u16).to_le_bytes());
    for def in gds {
        bytes.extend_from_slice(&gds_block(def));
    }

    bytes.extend_from_slice(&(supers.len() as u16).to_le_bytes());
    for sp in supers {
        bytes.extend_from_slice(&super_pds_bytes(sp));
    }

    fs::write(path, bytes).unwrap();
}

pub fn write_data(path: &Path, values: &[f32], big_endian: bool) {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        let raw = if big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        bytes.extend_from_slice(&raw);
    }
    fs::write(path, bytes).unwrap();
}

fn gds_block(def: &GridDefinition) -> Vec<u8> {
    use projection::GridTemplate;

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

fn super_pds_bytes(sp: &SuperSpec) -> Vec<u8> {
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
        body.extend_from_slice(&pds_record_bytes(rec));
    }

    // i32 total length (the whole block incl. this field), u16 header len.
    let total = (body.len() + 6) as i32;
    let mut out = Vec::with_capacity(body.len() + 6);
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(&super_len.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn pds_record_bytes(rec: &RecSpec) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&rec.valid_epoch.to_le_bytes());
    body.push(rec.file.len() as u8);
    body.extend_from_slice(rec.file.as_bytes());
    body.extend_from_slice(&rec.offset.to_le_bytes());
    body.push(if rec.big_endian { 1 } else { 0 });
    body.push(rec.scan);
    body.extend_from_slice(&(rec.table.len() as u16).to_le_bytes());
    for s in &rec.table {
        body.extend_from_slice(&(s.len() as u16).to_le_bytes());
        body.extend_from_slice(s.as_bytes());
    }

    let mut out = Vec::with_capacity(body.len() + 2);
    out.extend_from_slice(&((body.len() + 2) as u16).to_le_bytes());
    out.extend_from_slice(&body);
    out
}
