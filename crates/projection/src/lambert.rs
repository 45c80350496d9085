//! Lambert conformal conic projection.
//!
//! The conic projection NDFD and the CONUS mesoscale models deliver their
//! grids on. A cone tangent or secant to the sphere is unrolled onto a
//! plane; grid coordinates are offsets from the first grid point.

use crate::{EarthShape, GridDefinition, ProjectionError, ProjectionResult};
use std::f64::consts::PI;

/// Configured Lambert conformal transform.
#[derive(Debug, Clone)]
pub struct LambertGrid {
    pub nx: usize,
    pub ny: usize,
    /// Central meridian (LoV), radians.
    lon0: f64,
    dx: f64,
    dy: f64,
    radius: f64,
    /// Cone constant.
    n: f64,
    f: f64,
    rho0: f64,
    /// Projection-plane coordinates of the (1, 1) grid point.
    x0: f64,
    y0: f64,
}

impl LambertGrid {
    pub fn new(def: &GridDefinition, earth: EarthShape) -> ProjectionResult<Self> {
        let to_rad = PI / 180.0;
        let lat1 = def.lat1 * to_rad;
        let lon1 = def.lon1 * to_rad;
        let lon0 = def.orient_lon * to_rad;
        let latin1 = def.mesh_lat * to_rad;
        let latin2 = def.latin2 * to_rad;

        if def.mesh_lat.abs() >= 90.0 || def.latin2.abs() >= 90.0 {
            return Err(ProjectionError::InvalidDefinition(format!(
                "standard parallels {} / {} out of range",
                def.mesh_lat, def.latin2
            )));
        }
        if (def.mesh_lat + def.latin2).abs() < 1e-10 {
            return Err(ProjectionError::InvalidDefinition(
                "standard parallels may not straddle the equator symmetrically".to_string(),
            ));
        }

        let radius = earth.mean_radius_m();

        // Cone constant: tangent cone for a single standard parallel,
        // secant otherwise.
        let n = if (latin1 - latin2).abs() < 1e-10 {
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = radius * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        // Plane coordinates of the first grid point, fixed once here; every
        // forward projection is an offset against these.
        let theta0 = n * wrap_pi(lon1 - lon0);
        let x0 = rho0 * theta0.sin();
        let y0 = rho0 - rho0 * theta0.cos();

        Ok(Self {
            nx: def.nx,
            ny: def.ny,
            lon0,
            dx: def.dx,
            dy: def.dy,
            radius,
            n,
            f,
            rho0,
            x0,
            y0,
        })
    }

    /// Geographic degrees to fractional 1-based grid coordinates.
    pub fn latlon_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let rho = self.radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * wrap_pi(lon - self.lon0);

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        (1.0 + (x - self.x0) / self.dx, 1.0 + (y - self.y0) / self.dy)
    }

    /// Fractional 1-based grid coordinates to geographic degrees.
    pub fn grid_to_latlon(&self, gx: f64, gy: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let x = self.x0 + (gx - 1.0) * self.dx;
        let y = self.y0 + (gy - 1.0) * self.dy;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };
        let theta = (x / (self.rho0 - y)).atan();

        let lat = 2.0 * ((self.radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat * to_deg, wrap_pi(lon) * to_deg)
    }
}

/// Wrap an angle into (-pi, pi].
fn wrap_pi(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}
