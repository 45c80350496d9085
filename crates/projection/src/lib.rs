//! Map projections for forecast grids.
//!
//! Converts between geographic coordinates and fractional 1-based grid
//! coordinates. A [`GridDefinition`] describes the geometry a grid was
//! produced on; [`GridProjection`] is the configured transform.

pub mod lambert;
pub mod latlon;
pub mod mercator;

pub use lambert::LambertGrid;
pub use latlon::LatLonGrid;
pub use mercator::MercatorGrid;

use thiserror::Error;

/// Result type for projection configuration.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid grid definition: {0}")]
    InvalidDefinition(String),

    #[error("Unsupported grid template {0}")]
    UnsupportedTemplate(u16),
}

/// Grid geometry templates understood by the probe, numbered as GRIB2
/// grid-definition templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridTemplate {
    LatLon = 0,
    Mercator = 10,
    LambertConformal = 30,
}

impl GridTemplate {
    pub fn from_number(n: u16) -> Option<Self> {
        match n {
            0 => Some(GridTemplate::LatLon),
            10 => Some(GridTemplate::Mercator),
            30 => Some(GridTemplate::LambertConformal),
            _ => None,
        }
    }
}

/// Earth shape used when configuring a projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthShape {
    pub major_m: f64,
    pub minor_m: f64,
}

impl EarthShape {
    pub fn spherical(radius_m: f64) -> Self {
        Self {
            major_m: radius_m,
            minor_m: radius_m,
        }
    }

    /// WMO standard spherical earth.
    pub fn grib_default() -> Self {
        Self::spherical(6_371_229.0)
    }

    /// The radius the spherical projections use.
    pub fn mean_radius_m(&self) -> f64 {
        (self.major_m + self.minor_m) / 2.0
    }
}

/// Geometry of a forecast grid.
///
/// `lat1` / `lon1` locate the logical (1, 1) cell — the southwest-most grid
/// point — regardless of the storage scan order; the parsers normalise scan
/// direction before building one of these. Spacing is degrees for lat/lon
/// grids and meters otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    pub template: GridTemplate,
    pub nx: usize,
    pub ny: usize,
    pub lat1: f64,
    pub lon1: f64,
    /// Central meridian (LoV) for the conic and cylindrical projections.
    pub orient_lon: f64,
    pub dx: f64,
    pub dy: f64,
    /// True-scale latitude (Mercator) or first standard parallel (Lambert).
    pub mesh_lat: f64,
    /// Second standard parallel (Lambert).
    pub latin2: f64,
    pub scan: u8,
    pub earth: EarthShape,
}

impl GridDefinition {
    pub fn validate(&self) -> ProjectionResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(ProjectionError::InvalidDefinition(format!(
                "grid dimensions {}x{} are empty",
                self.nx, self.ny
            )));
        }
        if !(self.dx.is_finite() && self.dy.is_finite()) || self.dx == 0.0 || self.dy == 0.0 {
            return Err(ProjectionError::InvalidDefinition(format!(
                "grid spacing {}x{} is degenerate",
                self.dx, self.dy
            )));
        }
        if self.lat1 < -90.0 || self.lat1 > 90.0 {
            return Err(ProjectionError::InvalidDefinition(format!(
                "first latitude {} out of range",
                self.lat1
            )));
        }
        if self.earth.mean_radius_m() <= 0.0 {
            return Err(ProjectionError::InvalidDefinition(
                "earth radius must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A configured grid transform.
#[derive(Debug, Clone)]
pub enum GridProjection {
    LatLon(LatLonGrid),
    Mercator(MercatorGrid),
    Lambert(LambertGrid),
}

impl GridProjection {
    /// Configure the projection for a grid, optionally overriding the earth
    /// shape recorded in the definition.
    pub fn from_definition(
        def: &GridDefinition,
        earth_override: Option<EarthShape>,
    ) -> ProjectionResult<Self> {
        def.validate()?;
        let earth = earth_override.unwrap_or(def.earth);
        match def.template {
            GridTemplate::LatLon => Ok(GridProjection::LatLon(LatLonGrid::new(def)?)),
            GridTemplate::Mercator => Ok(GridProjection::Mercator(MercatorGrid::new(def, earth)?)),
            GridTemplate::LambertConformal => {
                Ok(GridProjection::Lambert(LambertGrid::new(def, earth)?))
            }
        }
    }

    /// Project a geographic point to fractional 1-based grid coordinates.
    pub fn latlon_to_grid(&self, lat: f64, lon: f64) -> (f64, f64) {
        match self {
            GridProjection::LatLon(p) => p.latlon_to_grid(lat, lon),
            GridProjection::Mercator(p) => p.latlon_to_grid(lat, lon),
            GridProjection::Lambert(p) => p.latlon_to_grid(lat, lon),
        }
    }

    /// Inverse transform of [`latlon_to_grid`](Self::latlon_to_grid).
    pub fn grid_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            GridProjection::LatLon(p) => p.grid_to_latlon(x, y),
            GridProjection::Mercator(p) => p.grid_to_latlon(x, y),
            GridProjection::Lambert(p) => p.grid_to_latlon(x, y),
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        match self {
            GridProjection::LatLon(p) => (p.nx, p.ny),
            GridProjection::Mercator(p) => (p.nx, p.ny),
            GridProjection::Lambert(p) => (p.nx, p.ny),
        }
    }

    /// True when the east edge wraps around to the west edge, which only a
    /// full-circle lat/lon grid can do.
    pub fn wraps_east(&self) -> bool {
        match self {
            GridProjection::LatLon(p) => p.wraps_east(),
            _ => false,
        }
    }
}
