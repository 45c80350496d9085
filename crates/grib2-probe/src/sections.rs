//! GRIB2 section parsing.
//!
//! The matcher compares on surfaces, intervals and missing-value
//! management, so the section parsers here pull those template fields out
//! alongside the usual identity octets. All multi-byte integers in a GRIB
//! message are big-endian.

use crate::{Grib2ProbeError, Grib2Result};
use chrono::{DateTime, NaiveDate, Utc};
use grid_sampler::MissingSpec;
use projection::{EarthShape, GridDefinition, GridTemplate};

/// Byte offsets of one sub-grid's sections within a message.
///
/// GRIB2 allows sections 2 through 7 to repeat; a sub-grid inherits any
/// section it does not restate.
#[derive(Debug, Clone, Copy)]
pub struct SectionSet {
    pub identification: usize,
    pub local_use: Option<usize>,
    pub grid_definition: usize,
    pub product_definition: usize,
    pub data_representation: usize,
}

/// Walk a message's sections and group them into sub-grids.
///
/// Each occurrence of section 7 closes one sub-grid. The walk stops at the
/// "7777" end section.
pub fn split_submessages(msg: &[u8]) -> Grib2Result<Vec<SectionSet>> {
    let mut offset = 16;
    let mut identification: Option<usize> = None;
    let mut local_use: Option<usize> = None;
    let mut grid_definition: Option<usize> = None;
    let mut product_definition: Option<usize> = None;
    let mut data_representation: Option<usize> = None;
    let mut subs = Vec::new();

    loop {
        if offset + 4 <= msg.len() && &msg[offset..offset + 4] == b"7777" {
            break;
        }
        if offset + 5 > msg.len() {
            return Err(Grib2ProbeError::UnexpectedEnd);
        }

        let len = u32::from_be_bytes([
            msg[offset],
            msg[offset + 1],
            msg[offset + 2],
            msg[offset + 3],
        ]) as usize;
        let number = msg[offset + 4];

        if len < 5 || offset + len > msg.len() {
            return Err(Grib2ProbeError::InvalidSection {
                section: number,
                reason: format!("bad length {} at offset {}", len, offset),
            });
        }

        match number {
            1 => identification = Some(offset),
            2 => local_use = Some(offset),
            3 => grid_definition = Some(offset),
            4 => product_definition = Some(offset),
            5 => data_representation = Some(offset),
            6 => {}
            7 => {
                subs.push(SectionSet {
                    identification: identification.ok_or(Grib2ProbeError::InvalidSection {
                        section: 1,
                        reason: "missing before data section".to_string(),
                    })?,
                    local_use,
                    grid_definition: grid_definition.ok_or(Grib2ProbeError::InvalidSection {
                        section: 3,
                        reason: "missing before data section".to_string(),
                    })?,
                    product_definition: product_definition.ok_or(
                        Grib2ProbeError::InvalidSection {
                            section: 4,
                            reason: "missing before data section".to_string(),
                        },
                    )?,
                    data_representation: data_representation.ok_or(
                        Grib2ProbeError::InvalidSection {
                            section: 5,
                            reason: "missing before data section".to_string(),
                        },
                    )?,
                });
            }
            other => {
                return Err(Grib2ProbeError::InvalidSection {
                    section: other,
                    reason: "unknown section number".to_string(),
                });
            }
        }

        offset += len;
    }

    if subs.is_empty() {
        return Err(Grib2ProbeError::InvalidFormat(
            "message holds no data section".to_string(),
        ));
    }
    Ok(subs)
}

fn section_slice(msg: &[u8], offset: usize, number: u8, min_len: usize) -> Grib2Result<&[u8]> {
    let len = u32::from_be_bytes([
        msg[offset],
        msg[offset + 1],
        msg[offset + 2],
        msg[offset + 3],
    ]) as usize;
    let sec = &msg[offset..offset + len];
    if sec.len() < min_len {
        return Err(Grib2ProbeError::InvalidSection {
            section: number,
            reason: format!("{} bytes, need {}", sec.len(), min_len),
        });
    }
    Ok(sec)
}

/// Section 1 fields the matcher uses.
#[derive(Debug, Clone)]
pub struct Identification {
    pub center: u16,
    pub subcenter: u16,
    pub reference_time: DateTime<Utc>,
}

/// Parse Section 1 (Identification).
///
/// Layout after the 5-byte section header: center (2), subcenter (2),
/// master table (1), local table (1), significance (1), year (2), month,
/// day, hour, minute, second.
pub fn parse_identification(msg: &[u8], offset: usize) -> Grib2Result<Identification> {
    let sec = section_slice(msg, offset, 1, 21)?;
    let b = &sec[5..];

    let center = u16::from_be_bytes([b[0], b[1]]);
    let subcenter = u16::from_be_bytes([b[2], b[3]]);

    let year = u16::from_be_bytes([b[7], b[8]]);
    let reference_time = make_time(year, b[9], b[10], b[11], b[12], b[13]).ok_or(
        Grib2ProbeError::InvalidSection {
            section: 1,
            reason: format!("invalid reference date {}-{}-{}", year, b[9], b[10]),
        },
    )?;

    Ok(Identification {
        center,
        subcenter,
        reference_time,
    })
}

fn make_time(year: u16, month: u8, day: u8, hour: u8, min: u8, sec: u8) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)?;
    let naive = date.and_hms_opt(hour as u32, min as u32, sec as u32)?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Parsed Section 3 plus the scan flag the sampler needs.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    pub definition: GridDefinition,
    pub scan_flag: u8,
}

/// Parse Section 3 (Grid Definition) for the supported templates (3.0
/// lat/lon, 3.10 Mercator, 3.30 Lambert conformal).
pub fn parse_grid_definition(msg: &[u8], offset: usize) -> Grib2Result<GridGeometry> {
    let sec = section_slice(msg, offset, 3, 15)?;
    let template_number = u16::from_be_bytes([sec[12], sec[13]]);
    // Template data starts at octet 15.
    let gd = &sec[14..];

    let invalid = |reason: String| Grib2ProbeError::InvalidSection {
        section: 3,
        reason,
    };

    match template_number {
        0 => {
            // Template 3.0: regular lat/lon.
            // gd[0..16]: earth shape; gd[16..20]: Ni; gd[20..24]: Nj;
            // gd[32..36]: La1; gd[36..40]: Lo1; gd[41..45]: La2;
            // gd[45..49]: Lo2; gd[49..53]: Di; gd[53..57]: Dj; gd[57]: scan.
            // Angles are microdegrees.
            if gd.len() < 58 {
                return Err(invalid(format!("template 0 needs 58 bytes, got {}", gd.len())));
            }
            let earth = earth_shape(gd);
            let nx = read_u32(gd, 16) as usize;
            let ny = read_u32(gd, 20) as usize;
            let la1 = read_i32(gd, 32) as f64 * 1e-6;
            let lo1 = read_i32(gd, 36) as f64 * 1e-6;
            let la2 = read_i32(gd, 41) as f64 * 1e-6;
            let di = read_u32(gd, 49) as f64 * 1e-6;
            let dj = read_u32(gd, 53) as f64 * 1e-6;
            let scan_flag = gd[57];

            // The logical (1, 1) cell is the southwest-most point whatever
            // the storage scan direction.
            let lat1 = la1.min(la2);

            Ok(GridGeometry {
                definition: GridDefinition {
                    template: GridTemplate::LatLon,
                    nx,
                    ny,
                    lat1,
                    lon1: lo1,
                    orient_lon: 0.0,
                    dx: di,
                    dy: dj,
                    mesh_lat: 0.0,
                    latin2: 0.0,
                    scan: scan_flag,
                    earth,
                },
                scan_flag,
            })
        }
        10 => {
            // Template 3.10: Mercator.
            // gd[16..20]: Ni; gd[20..24]: Nj; gd[24..28]: La1; gd[28..32]:
            // Lo1; gd[33..37]: LaD; gd[45]: scan; gd[50..54]: Di;
            // gd[54..58]: Dj (both millimetres).
            if gd.len() < 58 {
                return Err(invalid(format!("template 10 needs 58 bytes, got {}", gd.len())));
            }
            let earth = earth_shape(gd);
            let scan_flag = gd[45];
            if scan_flag & 0x40 == 0 {
                return Err(invalid("projected grid requires +y scan order".to_string()));
            }
            Ok(GridGeometry {
                definition: GridDefinition {
                    template: GridTemplate::Mercator,
                    nx: read_u32(gd, 16) as usize,
                    ny: read_u32(gd, 20) as usize,
                    lat1: read_i32(gd, 24) as f64 * 1e-6,
                    lon1: read_i32(gd, 28) as f64 * 1e-6,
                    orient_lon: 0.0,
                    dx: read_u32(gd, 50) as f64 * 1e-3,
                    dy: read_u32(gd, 54) as f64 * 1e-3,
                    mesh_lat: read_i32(gd, 33) as f64 * 1e-6,
                    latin2: 0.0,
                    scan: scan_flag,
                    earth,
                },
                scan_flag,
            })
        }
        30 => {
            // Template 3.30: Lambert conformal.
            // gd[16..20]: Nx; gd[20..24]: Ny; gd[24..28]: La1; gd[28..32]:
            // Lo1; gd[33..37]: LaD; gd[37..41]: LoV; gd[41..45]: Dx;
            // gd[45..49]: Dy (millimetres); gd[50]: scan; gd[51..55]:
            // Latin1; gd[55..59]: Latin2.
            if gd.len() < 59 {
                return Err(invalid(format!("template 30 needs 59 bytes, got {}", gd.len())));
            }
            let earth = earth_shape(gd);
            let scan_flag = gd[50];
            if scan_flag & 0x40 == 0 {
                return Err(invalid("projected grid requires +y scan order".to_string()));
            }
            Ok(GridGeometry {
                definition: GridDefinition {
                    template: GridTemplate::LambertConformal,
                    nx: read_u32(gd, 16) as usize,
                    ny: read_u32(gd, 20) as usize,
                    lat1: read_i32(gd, 24) as f64 * 1e-6,
                    lon1: read_i32(gd, 28) as f64 * 1e-6,
                    orient_lon: read_i32(gd, 37) as f64 * 1e-6,
                    dx: read_u32(gd, 41) as f64 * 1e-3,
                    dy: read_u32(gd, 45) as f64 * 1e-3,
                    mesh_lat: read_i32(gd, 51) as f64 * 1e-6,
                    latin2: read_i32(gd, 55) as f64 * 1e-6,
                    scan: scan_flag,
                    earth,
                },
                scan_flag,
            })
        }
        other => Err(Grib2ProbeError::InvalidGrid(format!(
            "unsupported grid template {}",
            other
        ))),
    }
}

/// Decode the earth shape bytes common to the grid templates
/// (shape code, then scaled radius / major / minor).
fn earth_shape(gd: &[u8]) -> EarthShape {
    match gd[0] {
        0 => EarthShape::spherical(6_367_470.0),
        1 => {
            let scale = gd[1] as i32;
            let value = read_u32(gd, 2) as f64;
            if value > 0.0 {
                EarthShape::spherical(value / 10f64.powi(scale))
            } else {
                EarthShape::grib_default()
            }
        }
        3 | 7 => {
            let major_scale = gd[6] as i32;
            let major = read_u32(gd, 7) as f64;
            let minor_scale = gd[11] as i32;
            let minor = read_u32(gd, 12) as f64;
            if major > 0.0 && minor > 0.0 {
                // Shape 3 is kilometres, shape 7 metres.
                let unit = if gd[0] == 3 { 1000.0 } else { 1.0 };
                EarthShape {
                    major_m: major / 10f64.powi(major_scale) * unit,
                    minor_m: minor / 10f64.powi(minor_scale) * unit,
                }
            } else {
                EarthShape::grib_default()
            }
        }
        6 => EarthShape::spherical(6_371_229.0),
        _ => EarthShape::grib_default(),
    }
}

/// Section 4 fields the matcher uses.
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub template: u16,
    pub category: u8,
    pub subcategory: u8,
    pub gen_process: u8,
    pub first_surface_type: u8,
    pub first_surface_value: f64,
    pub second_surface_type: u8,
    pub second_surface_value: f64,
    /// Offset from the reference time for instantaneous templates.
    pub forecast_secs: i64,
    /// End of the overall interval for the statistical templates.
    pub interval_end: Option<DateTime<Utc>>,
    pub num_intervals: u8,
    pub interval_hours: u32,
}

/// Parse Section 4 (Product Definition) for templates 4.0 (instantaneous),
/// 4.8 (statistical interval) and 4.9 (probability interval).
pub fn parse_product_definition(msg: &[u8], offset: usize) -> Grib2Result<ProductDefinition> {
    let sec = section_slice(msg, offset, 4, 34)?;
    let template = u16::from_be_bytes([sec[7], sec[8]]);

    // Template 4.0 layout, shared by 4.8 / 4.9 up to the second surface:
    // sec[9]: category; sec[10]: number; sec[13]: generating process;
    // sec[17]: time unit; sec[18..22]: forecast time; sec[22]: surface 1
    // type; sec[23]: scale; sec[24..28]: scaled value; sec[28..34]: ditto
    // for surface 2.
    let category = sec[9];
    let subcategory = sec[10];
    let gen_process = sec[13];
    let time_unit = sec[17];
    let forecast_raw = read_u32(sec, 18);
    let forecast_secs = forecast_raw as i64 * time_unit_secs(time_unit)?;

    let first_surface_type = sec[22];
    let first_surface_value = scaled_value(sec[23], read_u32(sec, 24));
    let second_surface_type = sec[28];
    let second_surface_value = if second_surface_type == 255 {
        0.0
    } else {
        scaled_value(sec[29], read_u32(sec, 30))
    };

    // The statistical templates append the end of the overall interval and
    // the time-range specs. Template 4.9 inserts 13 bytes of probability
    // parameters first.
    let interval_offset = match template {
        8 => Some(34),
        9 => Some(47),
        _ => None,
    };

    let (interval_end, num_intervals, interval_hours) = match interval_offset {
        None => (None, 0, 0),
        Some(base) => {
            if sec.len() < base + 24 {
                return Err(Grib2ProbeError::InvalidSection {
                    section: 4,
                    reason: format!("template {} truncated at {} bytes", template, sec.len()),
                });
            }
            let year = u16::from_be_bytes([sec[base], sec[base + 1]]);
            let end = make_time(
                year,
                sec[base + 2],
                sec[base + 3],
                sec[base + 4],
                sec[base + 5],
                sec[base + 6],
            )
            .ok_or(Grib2ProbeError::InvalidSection {
                section: 4,
                reason: "invalid interval end time".to_string(),
            })?;
            let num_intervals = sec[base + 7];
            // First time-range spec: unit at base+14, length at base+15..19.
            let range_unit = sec[base + 14];
            let range_len = read_u32(sec, base + 15);
            let interval_hours = (range_len as i64 * time_unit_secs(range_unit)? / 3600) as u32;
            (Some(end), num_intervals, interval_hours)
        }
    };

    Ok(ProductDefinition {
        template,
        category,
        subcategory,
        gen_process,
        first_surface_type,
        first_surface_value,
        second_surface_type,
        second_surface_value,
        forecast_secs,
        interval_end,
        num_intervals,
        interval_hours,
    })
}

fn time_unit_secs(unit: u8) -> Grib2Result<i64> {
    match unit {
        0 => Ok(60),
        1 => Ok(3600),
        2 => Ok(86400),
        10 => Ok(3 * 3600),
        11 => Ok(6 * 3600),
        12 => Ok(12 * 3600),
        13 => Ok(1),
        other => Err(Grib2ProbeError::InvalidSection {
            section: 4,
            reason: format!("unsupported time unit {}", other),
        }),
    }
}

fn scaled_value(scale: u8, value: u32) -> f64 {
    if value == u32::MAX {
        return 0.0;
    }
    value as f64 / 10f64.powi(scale as i8 as i32)
}

/// Parse Section 5 (Data Representation) for the missing-value management
/// the complex-packing templates (5.2 / 5.3) declare.
pub fn parse_missing_spec(msg: &[u8], offset: usize) -> Grib2Result<MissingSpec> {
    let sec = section_slice(msg, offset, 5, 11)?;
    let template = u16::from_be_bytes([sec[9], sec[10]]);

    if template != 2 && template != 3 {
        return Ok(MissingSpec::none());
    }
    if sec.len() < 31 {
        return Ok(MissingSpec::none());
    }

    // Template 5.2: sec[20]: original field type; sec[22]: missing value
    // management; sec[23..27]: primary; sec[27..31]: secondary. Substitute
    // values are IEEE floats when the field type is 0, integers otherwise.
    let float_field = sec[20] == 0;
    let decode = |at: usize| -> f64 {
        let raw = [sec[at], sec[at + 1], sec[at + 2], sec[at + 3]];
        if float_field {
            f32::from_be_bytes(raw) as f64
        } else {
            u32::from_be_bytes(raw) as f64
        }
    };

    match sec[22] {
        1 => Ok(MissingSpec::primary(decode(23))),
        2 => Ok(MissingSpec::primary_and_secondary(decode(23), decode(27))),
        _ => Ok(MissingSpec::none()),
    }
}

/// Decode the NDFD weather-string table from the Local Use section.
///
/// Payload after the 5-byte section header: u16 entry count, then per entry
/// a u16 length and that many bytes of ugly string.
pub fn parse_wx_table(msg: &[u8], offset: usize) -> Grib2Result<Vec<String>> {
    let sec = section_slice(msg, offset, 2, 7)?;
    let b = &sec[5..];

    let count = u16::from_be_bytes([b[0], b[1]]) as usize;
    let mut entries = Vec::with_capacity(count);
    let mut at = 2;
    for _ in 0..count {
        if at + 2 > b.len() {
            return Err(Grib2ProbeError::InvalidSection {
                section: 2,
                reason: "weather table truncated".to_string(),
            });
        }
        let len = u16::from_be_bytes([b[at], b[at + 1]]) as usize;
        at += 2;
        if at + len > b.len() {
            return Err(Grib2ProbeError::InvalidSection {
                section: 2,
                reason: "weather entry truncated".to_string(),
            });
        }
        entries.push(String::from_utf8_lossy(&b[at..at + len]).into_owned());
        at += len;
    }
    Ok(entries)
}

#[inline]
fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// GRIB encodes negative angles sign-magnitude: the top bit flags the sign.
#[inline]
fn read_i32(b: &[u8], at: usize) -> i32 {
    let raw = read_u32(b, at);
    if raw & 0x8000_0000 != 0 {
        -((raw & 0x7FFF_FFFF) as i32)
    } else {
        raw as i32
    }
}
