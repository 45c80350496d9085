//! Spherical Mercator projection.
//!
//! Used by the tropical and Pacific forecast sectors. True scale is at the
//! `mesh_lat` parallel.

use crate::{EarthShape, GridDefinition, ProjectionError, ProjectionResult};
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct MercatorGrid {
    pub nx: usize,
    pub ny: usize,
    dx: f64,
    dy: f64,
    /// Earth radius scaled to the true-scale parallel.
    scaled_radius: f64,
    /// Longitude of the first column, degrees east.
    lon1: f64,
    /// Projected y of the first row.
    y1: f64,
}

impl MercatorGrid {
    pub fn new(def: &GridDefinition, earth: EarthShape) -> ProjectionResult<Self> {
        if def.mesh_lat.abs() >= 90.0 {
            return Err(ProjectionError::InvalidDefinition(format!(
                "true-scale latitude {} out of range",
                def.mesh_lat
            )));
        }
        if def.lat1.abs() >= 90.0 {
            return Err(ProjectionError::InvalidDefinition(format!(
                "first latitude {} unprojectable",
                def.lat1
            )));
        }
        let to_rad = PI / 180.0;
        let scaled_radius = earth.mean_radius_m() * (def.mesh_lat * to_rad).cos();
        let y1 = scaled_radius * (PI / 4.0 + def.lat1 * to_rad / 2.0).tan().ln();
        Ok(Self {
            nx: def.nx,
            ny: def.ny,
            dx: def.dx,
            dy: def.dy,
            scaled_radius,
            lon1: normalize_lon(def.lon1),
            y1,
        })
    }

    pub fn latlon_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let mut dlon = normalize_lon(lon_deg) - self.lon1;
        if dlon < -180.0 {
            dlon += 360.0;
        } else if dlon > 180.0 {
            dlon -= 360.0;
        }
        let x = self.scaled_radius * dlon * to_rad;
        let y = self.scaled_radius * (PI / 4.0 + lat_deg * to_rad / 2.0).tan().ln();
        (1.0 + x / self.dx, 1.0 + (y - self.y1) / self.dy)
    }

    pub fn grid_to_latlon(&self, gx: f64, gy: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;
        let x = (gx - 1.0) * self.dx;
        let y = self.y1 + (gy - 1.0) * self.dy;
        let lon = normalize_lon(self.lon1 + x / self.scaled_radius * to_deg);
        let lat = (2.0 * (y / self.scaled_radius).exp().atan() - PI / 2.0) * to_deg;
        (lat, lon)
    }
}

fn normalize_lon(lon: f64) -> f64 {
    let mut l = lon % 360.0;
    if l < 0.0 {
        l += 360.0;
    }
    l
}
