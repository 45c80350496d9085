//! The cube probe loop.
//!
//! Walks super-PDS blocks, drops those from foreign centers or with unknown
//! element names, filters inner records by valid time, and samples each
//! surviving grid at the probe points.

use crate::data::DataFileSlot;
use crate::layout::CubeIndex;
use crate::{CubeError, CUBE_MISSING};
use grid_sampler::{sample, GridData, InterpMethod, MissingSpec};
use probe_common::{
    catalog, decode_weather, Element, ElementDescriptor, Match, MatchSet, NamingConvention,
    Point, PointKind, ProbeError, ProbeResult, TimeWindow, Value, WeatherMode,
};
use projection::{EarthShape, GridProjection};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-call configuration of the cube probe loop.
#[derive(Debug, Clone)]
pub struct CubeProbeConfig<'a> {
    pub filters: &'a [ElementDescriptor],
    pub window: TimeWindow,
    pub method: InterpMethod,
    pub weather_mode: WeatherMode,
    pub wx_table_version: u8,
    pub earth_override: Option<EarthShape>,
    /// Originating center accepted from the index (NDFD is 8).
    pub accepted_center: u16,
    /// Convention element names in the index resolve under.
    pub naming: NamingConvention,
}

impl<'a> CubeProbeConfig<'a> {
    pub fn new(filters: &'a [ElementDescriptor], window: TimeWindow) -> Self {
        Self {
            filters,
            window,
            method: InterpMethod::Nearest,
            weather_mode: WeatherMode::English,
            wx_table_version: 1,
            earth_override: None,
            accepted_center: 8,
            naming: NamingConvention::File,
        }
    }
}

/// Probe one cube, appending matches in super-PDS then record order.
///
/// The data file slot closes on every exit path, including errors.
pub fn probe_cube_file(
    index_path: &Path,
    points: &[Point],
    kind: PointKind,
    cfg: &CubeProbeConfig,
    out: &mut MatchSet,
) -> ProbeResult<()> {
    let index = CubeIndex::load(index_path).map_err(|e| match e {
        CubeError::Io(_) => ProbeError::CannotOpen(index_path.display().to_string()),
        other => ProbeError::CubeFormat(other.to_string()),
    })?;

    let base_dir = index_path.parent().unwrap_or_else(|| Path::new("."));
    let mut slot = DataFileSlot::new();
    let mut cached_gds: Option<u16> = None;
    let mut proj: Option<GridProjection> = None;
    let mut grid_points: Vec<(f64, f64)> = Vec::new();

    for sp in &index.supers {
        if sp.center != cfg.accepted_center {
            debug!(center = sp.center, element = %sp.element_name, "skipping foreign center");
            continue;
        }
        let element = Element::from_name(&sp.element_name, cfg.naming);
        if element == Element::Undef {
            debug!(element = %sp.element_name, "skipping unknown element");
            continue;
        }
        if !cfg.filters.iter().any(|d| d.ndfd == element || d.ndfd == Element::MatchAll) {
            continue;
        }

        for rec in &sp.records {
            if !cfg.window.contains(rec.valid_time) {
                continue;
            }

            // A GDS change re-validates, reconfigures the projection and
            // re-projects every point into the new grid frame once.
            if cached_gds != Some(sp.gds_index) || proj.is_none() {
                let def = index
                    .gds_for(sp)
                    .map_err(|e| ProbeError::CubeFormat(e.to_string()))?;
                let p = GridProjection::from_definition(def, cfg.earth_override)
                    .map_err(|e| ProbeError::InvalidGrid(e.to_string()))?;
                grid_points = points
                    .iter()
                    .map(|pt| match kind {
                        PointKind::GridCell => (pt.x, pt.y),
                        PointKind::GeoDegrees => p.latlon_to_grid(pt.lat(), pt.lon()),
                    })
                    .collect();
                proj = Some(p);
                cached_gds = Some(sp.gds_index);
            }
            let p = proj.as_ref().expect("projection configured above");
            let (nx, ny) = p.dims();

            let data_path = resolve_data_path(base_dir, &rec.data_file);
            let values = slot
                .read_floats(&data_path, rec.data_offset as u64, nx * ny, rec.big_endian)
                .map_err(|e| match e {
                    CubeError::Io(_) => ProbeError::CannotOpen(data_path.display().to_string()),
                    other => ProbeError::CubeFormat(other.to_string()),
                })?;

            let miss = MissingSpec::primary(CUBE_MISSING);
            let grid = GridData::new(&values, nx, ny, rec.scan)
                .map_err(|e| ProbeError::InvalidGrid(e.to_string()))?;
            let wrap = p.wraps_east();

            let weather = element == Element::Wx && !rec.wx_table.is_empty();
            let method = if weather {
                InterpMethod::Nearest
            } else {
                cfg.method
            };

            let mut sampled = Vec::with_capacity(grid_points.len());
            for &(x, y) in &grid_points {
                let v = sample(&grid, &miss, x, y, method, wrap);
                if miss.is_missing(v) {
                    sampled.push(Value::missing(miss.primary));
                } else if weather {
                    sampled.push(decode_weather(
                        v,
                        &rec.wx_table,
                        cfg.weather_mode,
                        cfg.wx_table_version,
                    ));
                } else {
                    sampled.push(Value::Numeric(v));
                }
            }

            debug!(
                element = %sp.element_name,
                valid = %rec.valid_time,
                file = %rec.data_file,
                "appending cube match"
            );
            out.push(Match {
                descriptor: catalog().descriptor(element).clone(),
                reference_time: sp.reference_time,
                valid_time: rec.valid_time,
                unit: sp.unit.clone(),
                values: sampled,
            });
        }
    }

    slot.close();
    Ok(())
}

fn resolve_data_path(base_dir: &Path, name: &str) -> PathBuf {
    let p = Path::new(name);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
