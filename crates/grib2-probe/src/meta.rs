//! Grid metadata assembly.
//!
//! Collects the section fields into the [`GridMeta`] record the matcher and
//! the match assembler consume.

use crate::sections::{self, SectionSet};
use crate::{Grib2ProbeError, Grib2Result};
use chrono::{DateTime, Duration, Utc};
use grid_sampler::MissingSpec;
use projection::GridDefinition;

/// Everything the probe needs to know about one decoded grid.
#[derive(Debug, Clone)]
pub struct GridMeta {
    /// GRIB edition; 0 marks the legacy local edition.
    pub version: u8,
    pub center: u16,
    pub subcenter: u16,
    pub gen_process: u8,
    /// GRIB2 discipline.
    pub prod_type: u8,
    pub template: u16,
    pub category: u8,
    pub subcategory: u8,
    pub num_intervals: u8,
    pub interval_hours: u32,
    pub first_surface_type: u8,
    pub first_surface_value: f64,
    pub second_surface_value: f64,
    pub reference_time: DateTime<Utc>,
    pub valid_time: DateTime<Utc>,
    /// Projection seconds of the legacy local edition; unused for 1 and 2.
    pub legacy_projection_secs: i64,
    pub unit: String,
    pub element_name: String,
    /// Per-message ugly-string table for weather-coded grids.
    pub wx_table: Option<Vec<String>>,
    pub nx: usize,
    pub ny: usize,
    pub grid_def: GridDefinition,
    pub missing: MissingSpec,
    /// Value range of the decoded grid, filled after unpacking.
    pub range: Option<(f64, f64)>,
}

impl GridMeta {
    /// Whether this grid carries encoded weather.
    pub fn is_weather(&self) -> bool {
        self.version == 2 && self.element_name == "Wx"
    }
}

/// Build the per-sub-grid metadata for one edition-2 message.
pub fn metas_for_message(msg: &[u8]) -> Grib2Result<Vec<GridMeta>> {
    if msg.len() < 16 {
        return Err(Grib2ProbeError::UnexpectedEnd);
    }
    let discipline = msg[6];
    let subs = sections::split_submessages(msg)?;

    let mut metas = Vec::with_capacity(subs.len());
    for sub in &subs {
        metas.push(meta_for_subgrid(msg, discipline, sub)?);
    }
    Ok(metas)
}

fn meta_for_subgrid(msg: &[u8], discipline: u8, sub: &SectionSet) -> Grib2Result<GridMeta> {
    let ident = sections::parse_identification(msg, sub.identification)?;
    let geom = sections::parse_grid_definition(msg, sub.grid_definition)?;
    let pds = sections::parse_product_definition(msg, sub.product_definition)?;
    let missing = sections::parse_missing_spec(msg, sub.data_representation)?;

    let valid_time = match pds.interval_end {
        Some(end) => end,
        None => ident.reference_time + Duration::seconds(pds.forecast_secs),
    };

    let (element_name, unit) = parameter_name(discipline, pds.category, pds.subcategory, &pds);

    let wx_table = match sub.local_use {
        Some(offset) if element_name == "Wx" => match sections::parse_wx_table(msg, offset) {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::debug!(error = %e, "weather table unreadable, leaving empty");
                None
            }
        },
        _ => None,
    };

    Ok(GridMeta {
        version: 2,
        center: ident.center,
        subcenter: ident.subcenter,
        gen_process: pds.gen_process,
        prod_type: discipline,
        template: pds.template,
        category: pds.category,
        subcategory: pds.subcategory,
        num_intervals: pds.num_intervals,
        interval_hours: pds.interval_hours,
        first_surface_type: pds.first_surface_type,
        first_surface_value: pds.first_surface_value,
        second_surface_value: pds.second_surface_value,
        reference_time: ident.reference_time,
        valid_time,
        legacy_projection_secs: 0,
        unit,
        element_name,
        wx_table,
        nx: geom.definition.nx,
        ny: geom.definition.ny,
        grid_def: geom.definition,
        missing,
        range: None,
    })
}

/// Short name and unit for a parameter triple, NDFD spellings.
fn parameter_name(
    discipline: u8,
    category: u8,
    number: u8,
    pds: &sections::ProductDefinition,
) -> (String, String) {
    let (name, unit): (&str, &str) = match (discipline, category, number) {
        // Temperature
        (0, 0, 0) => ("T", "[K]"),
        (0, 0, 4) => ("MaxT", "[K]"),
        (0, 0, 5) => ("MinT", "[K]"),
        (0, 0, 6) => ("Td", "[K]"),
        (0, 0, 193) => ("ApparentT", "[K]"),

        // Moisture
        (0, 1, 1) => ("RH", "[%]"),
        (0, 1, 8) => {
            // The same parameter triple carries PoP when delivered through
            // the probability template.
            if pds.template == 9 {
                ("PoP12", "[%]")
            } else {
                ("QPF", "[kg/m^2]")
            }
        }
        (0, 1, 29) => ("SnowAmt", "[m]"),
        (0, 1, 192) => ("Wx", ""),

        // Momentum
        (0, 2, 0) => ("WindDir", "[deg true]"),
        (0, 2, 1) => ("WindSpd", "[m/s]"),
        (0, 2, 22) => ("WindGust", "[m/s]"),

        // Cloud
        (0, 6, 1) => ("Sky", "[%]"),

        // Oceanographic
        (10, 0, 5) => ("WaveHeight", "[m]"),

        _ => return (format!("P{}-{}-{}", discipline, category, number), String::new()),
    };
    (name.to_string(), unit.to_string())
}

/// Min/max of a decoded grid, skipping missing cells. `None` when every
/// cell is missing.
pub fn value_range(values: &[f64], missing: &MissingSpec) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for &v in values {
        if missing.is_missing(v) {
            continue;
        }
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    range
}
