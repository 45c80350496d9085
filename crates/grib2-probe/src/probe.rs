//! The GRIB2 probe loop.
//!
//! Streams messages from a file, filters each sub-grid by valid time and
//! descriptor, projects the probe points into grid space, samples, and
//! appends one match per passing grid.

use crate::meta::{value_range, GridMeta};
use crate::Grib2Stream;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use grid_sampler::{sample, GridData, InterpMethod, ScanOrder};
use probe_common::{
    catalog, decode_weather, Element, ElementDescriptor, Match, MatchSet, Point, PointKind,
    ProbeError, ProbeResult, TimeWindow, Value, WeatherMode,
};
use projection::{EarthShape, GridProjection};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Per-call configuration of the GRIB2 probe loop.
#[derive(Debug, Clone)]
pub struct GribProbeConfig<'a> {
    /// Resolved descriptor filter; first match wins.
    pub filters: &'a [ElementDescriptor],
    pub window: TimeWindow,
    pub method: InterpMethod,
    pub weather_mode: WeatherMode,
    pub wx_table_version: u8,
    pub earth_override: Option<EarthShape>,
}

/// Probe one GRIB file, appending matches in message then sub-grid order.
///
/// Per-message unpack failures and invalid grid definitions abort this file
/// but leave the matches accumulated so far in `out`; the multi-file driver
/// reports and continues.
pub fn probe_grib_file(
    path: &Path,
    points: &[Point],
    kind: PointKind,
    cfg: &GribProbeConfig,
    out: &mut MatchSet,
) -> ProbeResult<()> {
    let data =
        fs::read(path).map_err(|_| ProbeError::CannotOpen(path.display().to_string()))?;
    probe_grib_stream(Bytes::from(data), points, kind, cfg, out)
}

/// Probe an in-memory GRIB byte stream.
pub fn probe_grib_stream(
    data: Bytes,
    points: &[Point],
    kind: PointKind,
    cfg: &GribProbeConfig,
    out: &mut MatchSet,
) -> ProbeResult<()> {
    let mut stream = Grib2Stream::new(data);

    while let Some(message) = stream
        .next_message()
        .map_err(|e| ProbeError::UnpackFailed(e.to_string()))?
    {
        let grids = message
            .unpack()
            .map_err(|e| ProbeError::UnpackFailed(e.to_string()))?;

        for (sub_index, (meta, values)) in
            message.metas.iter().zip(grids.into_iter()).enumerate()
        {
            let mut meta = meta.clone();

            let valid = match compute_valid_time(&meta) {
                Some(t) => t,
                None => {
                    debug!(version = meta.version, "skipping message of unknown edition");
                    continue;
                }
            };
            if !cfg.window.contains(valid) {
                continue;
            }

            if !cfg.filters.iter().any(|d| descriptor_matches(d, &meta)) {
                continue;
            }

            meta.grid_def
                .validate()
                .map_err(|e| ProbeError::InvalidGrid(e.to_string()))?;
            if meta.nx * meta.ny < values.len() {
                return Err(ProbeError::InvalidGrid(format!(
                    "{}x{} grid cannot hold {} values",
                    meta.nx,
                    meta.ny,
                    values.len()
                )));
            }
            let mut values = values;
            values.resize(meta.nx * meta.ny, meta.missing.primary);

            let proj = GridProjection::from_definition(&meta.grid_def, cfg.earth_override)
                .map_err(|e| ProbeError::InvalidGrid(e.to_string()))?;
            meta.valid_time = valid;
            meta.range = value_range(&values, &meta.missing);

            let element = element_for_meta(&meta);
            let sampled = sample_points(&values, &meta, &proj, points, kind, cfg)?;

            debug!(
                element = %meta.element_name,
                sub_grid = sub_index,
                valid = %valid,
                "appending match"
            );
            out.push(Match {
                descriptor: descriptor_from_meta(&meta, element),
                reference_time: meta.reference_time,
                valid_time: valid,
                unit: meta.unit.clone(),
                values: sampled,
            });
        }
    }
    Ok(())
}

/// Compute the valid time per edition: 2 and 1 carry it in their product
/// sections, the legacy local edition derives it from the reference time
/// plus the projection; anything else is skipped.
pub fn compute_valid_time(meta: &GridMeta) -> Option<DateTime<Utc>> {
    match meta.version {
        1 | 2 => Some(meta.valid_time),
        0 => Some(meta.reference_time + Duration::seconds(meta.legacy_projection_secs)),
        _ => None,
    }
}

#[inline]
fn opt_eq<T: PartialEq + Copy>(spec: Option<T>, got: T) -> bool {
    spec.map_or(true, |s| s == got)
}

#[inline]
fn opt_close(spec: Option<f64>, got: f64) -> bool {
    spec.map_or(true, |s| (s - got).abs() < 1e-6)
}

/// Test a filter descriptor against grid metadata. `None` fields are
/// wildcards; editions other than 2 only compare the originating identity.
pub fn descriptor_matches(d: &ElementDescriptor, meta: &GridMeta) -> bool {
    let identity = opt_eq(d.version, meta.version)
        && opt_eq(d.center, meta.center)
        && opt_eq(d.subcenter, meta.subcenter);
    if meta.version != 2 {
        return identity;
    }

    identity
        && opt_eq(d.gen_process, meta.gen_process)
        && opt_eq(d.prod_type, meta.prod_type)
        && opt_eq(d.template, meta.template)
        && opt_eq(d.category, meta.category)
        && opt_eq(d.subcategory, meta.subcategory)
        && interval_matches(d, meta)
        && surface_matches(d, meta)
}

fn interval_matches(d: &ElementDescriptor, meta: &GridMeta) -> bool {
    // Only the interval templates with exactly one interval pin the length.
    if (meta.template == 8 || meta.template == 9) && meta.num_intervals == 1 {
        if let Some(hours) = d.interval_hours {
            return hours == meta.interval_hours;
        }
    }
    true
}

fn surface_matches(d: &ElementDescriptor, meta: &GridMeta) -> bool {
    match d.surface_type {
        None => true,
        Some(t) => {
            t == meta.first_surface_type
                && opt_close(d.surface_value, meta.first_surface_value)
                && opt_close(d.second_surface_value, meta.second_surface_value)
        }
    }
}

/// Reverse-look the grid up in the catalog. Every catalog field including
/// the interval length and surfaces must agree; grids with no catalog
/// counterpart resolve to `Undef`.
pub fn element_for_meta(meta: &GridMeta) -> Element {
    for d in catalog().well_known() {
        let full = opt_eq(d.version, meta.version)
            && opt_eq(d.center, meta.center)
            && opt_eq(d.subcenter, meta.subcenter)
            && opt_eq(d.gen_process, meta.gen_process)
            && opt_eq(d.prod_type, meta.prod_type)
            && opt_eq(d.template, meta.template)
            && opt_eq(d.category, meta.category)
            && opt_eq(d.subcategory, meta.subcategory)
            && d.interval_hours.map_or(true, |h| h == meta.interval_hours)
            && surface_matches(d, meta);
        if full {
            return d.ndfd;
        }
    }
    Element::Undef
}

/// Concrete descriptor of a probed grid, tagged with its catalog identity.
fn descriptor_from_meta(meta: &GridMeta, element: Element) -> ElementDescriptor {
    ElementDescriptor {
        ndfd: element,
        version: Some(meta.version),
        center: Some(meta.center),
        subcenter: Some(meta.subcenter),
        gen_process: Some(meta.gen_process),
        prod_type: Some(meta.prod_type),
        template: Some(meta.template),
        category: Some(meta.category),
        subcategory: Some(meta.subcategory),
        interval_hours: Some(meta.interval_hours),
        surface_type: Some(meta.first_surface_type),
        surface_value: Some(meta.first_surface_value),
        second_surface_value: Some(meta.second_surface_value),
    }
}

/// Sample every point through the kernel, in point order.
pub(crate) fn sample_points(
    values: &[f64],
    meta: &GridMeta,
    proj: &GridProjection,
    points: &[Point],
    kind: PointKind,
    cfg: &GribProbeConfig,
) -> ProbeResult<Vec<Value>> {
    let grid = GridData::new(values, meta.nx, meta.ny, ScanOrder::from_flag(meta.grid_def.scan))
        .map_err(|e| ProbeError::InvalidGrid(e.to_string()))?;
    let wrap = proj.wraps_east();

    // Encoded weather is categorical; bilinear blending is meaningless for
    // it, so weather grids always sample nearest-neighbor.
    let weather = meta.is_weather() && meta.wx_table.is_some();
    let method = if weather {
        InterpMethod::Nearest
    } else {
        cfg.method
    };

    let mut out = Vec::with_capacity(points.len());
    for point in points {
        // Each point projects with its own coordinates.
        let (x, y) = match kind {
            PointKind::GridCell => (point.x, point.y),
            PointKind::GeoDegrees => proj.latlon_to_grid(point.lat(), point.lon()),
        };

        let v = sample(&grid, &meta.missing, x, y, method, wrap);
        if weather {
            if v == meta.missing.primary || meta.missing.is_missing(v) {
                out.push(Value::missing(meta.missing.primary));
            } else {
                let table = meta.wx_table.as_deref().unwrap_or(&[]);
                out.push(decode_weather(v, table, cfg.weather_mode, cfg.wx_table_version));
            }
        } else if v == meta.missing.primary || meta.missing.is_missing(v) {
            out.push(Value::missing(meta.missing.primary));
        } else {
            out.push(Value::Numeric(v));
        }
    }
    Ok(out)
}
