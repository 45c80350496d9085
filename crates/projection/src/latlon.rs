//! Regular latitude/longitude grids.

use crate::{GridDefinition, ProjectionError, ProjectionResult};

/// A regular lat/lon grid; the transform is pure index arithmetic.
#[derive(Debug, Clone)]
pub struct LatLonGrid {
    pub nx: usize,
    pub ny: usize,
    lat1: f64,
    lon1: f64,
    dlat: f64,
    dlon: f64,
}

impl LatLonGrid {
    pub fn new(def: &GridDefinition) -> ProjectionResult<Self> {
        if def.dx < 0.0 || def.dy < 0.0 {
            return Err(ProjectionError::InvalidDefinition(
                "lat/lon spacing must be normalised to positive".to_string(),
            ));
        }
        Ok(Self {
            nx: def.nx,
            ny: def.ny,
            lat1: def.lat1,
            lon1: normalize_lon(def.lon1),
            dlat: def.dy,
            dlon: def.dx,
        })
    }

    pub fn latlon_to_grid(&self, lat: f64, lon: f64) -> (f64, f64) {
        // Longitude distance measured eastward from the first column, so a
        // point just west of a wrapping grid's seam lands near column nx+1
        // rather than at a large negative x.
        let mut dl = normalize_lon(lon) - self.lon1;
        if dl < 0.0 {
            dl += 360.0;
        }
        let x = 1.0 + dl / self.dlon;
        let y = 1.0 + (lat - self.lat1) / self.dlat;
        (x, y)
    }

    pub fn grid_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let lat = self.lat1 + (y - 1.0) * self.dlat;
        let lon = normalize_lon(self.lon1 + (x - 1.0) * self.dlon);
        (lat, lon)
    }

    /// True when the grid covers a full circle of longitude, so that column
    /// nx+1 is column 1 again.
    pub fn wraps_east(&self) -> bool {
        (self.nx as f64 * self.dlon - 360.0).abs() <= self.dlon / 2.0
    }
}

/// Normalise a longitude into [0, 360).
fn normalize_lon(lon: f64) -> f64 {
    let mut l = lon % 360.0;
    if l < 0.0 {
        l += 360.0;
    }
    l
}
