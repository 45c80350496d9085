//! Interpolation kernel.
//!
//! Samples a grid at a fractional 1-based point. Out-of-domain samples and
//! missing corners come back as the grid's primary missing value; bilinear
//! interpolation never blends across a hole.

use crate::grid::{GridData, MissingSpec};

/// Sampling method. Weather-coded grids are categorical and must use
/// nearest-neighbor; the probe loops enforce that before calling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpMethod {
    Nearest,
    Bilinear,
}

/// Sample `grid` at the 1-based point (x, y).
///
/// `wrap_east` enables the seam cell between the last and first columns of
/// full-circle lat/lon grids.
pub fn sample(
    grid: &GridData,
    miss: &MissingSpec,
    x: f64,
    y: f64,
    method: InterpMethod,
    wrap_east: bool,
) -> f64 {
    match method {
        InterpMethod::Nearest => nearest(grid, miss, x, y),
        InterpMethod::Bilinear => bilinear(grid, miss, x, y, wrap_east),
    }
}

fn nearest(grid: &GridData, miss: &MissingSpec, x: f64, y: f64) -> f64 {
    let xi = x.round();
    let yi = y.round();
    if xi < 1.0 || xi > grid.nx as f64 || yi < 1.0 || yi > grid.ny as f64 {
        return miss.primary;
    }
    grid.get(xi as usize, yi as usize)
}

fn bilinear(grid: &GridData, miss: &MissingSpec, x: f64, y: f64, wrap_east: bool) -> f64 {
    let nx = grid.nx as f64;
    let ny = grid.ny as f64;

    let x1 = x.floor();
    let x2 = x1 + 1.0;
    let y1 = y.floor();
    let y2 = y1 + 1.0;

    if x1 < 1.0 || x2 > nx || y1 < 1.0 || y2 > ny {
        if wrap_east {
            return bilinear_border(grid, miss, x, y);
        }
        return miss.primary;
    }

    let d11 = grid.get(x1 as usize, y1 as usize);
    let d12 = grid.get(x2 as usize, y1 as usize);
    let d21 = grid.get(x1 as usize, y2 as usize);
    let d22 = grid.get(x2 as usize, y2 as usize);

    blend(miss, x, y, x1, x2, y1, y2, d11, d12, d21, d22)
}

/// Seam-cell interpolation for wrapping lat/lon grids: column nx+1 reads
/// from column 1.
fn bilinear_border(grid: &GridData, miss: &MissingSpec, x: f64, y: f64) -> f64 {
    let nx = grid.nx as f64;
    let ny = grid.ny as f64;

    let y1 = y.floor();
    let y2 = y1 + 1.0;
    let x1 = x.floor();

    // Only the cell between the last and the wrapped first column is
    // recoverable here.
    if x1 != nx || x > nx + 1.0 || y1 < 1.0 || y2 > ny {
        return miss.primary;
    }

    let d11 = grid.get(x1 as usize, y1 as usize);
    let d12 = grid.get(1, y1 as usize);
    let d21 = grid.get(x1 as usize, y2 as usize);
    let d22 = grid.get(1, y2 as usize);

    blend(miss, x, y, x1, x1 + 1.0, y1, y2, d11, d12, d21, d22)
}

#[allow(clippy::too_many_arguments)]
fn blend(
    miss: &MissingSpec,
    x: f64,
    y: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    d11: f64,
    d12: f64,
    d21: f64,
    d22: f64,
) -> f64 {
    if miss.is_missing(d11) || miss.is_missing(d12) || miss.is_missing(d21) || miss.is_missing(d22)
    {
        return miss.primary;
    }

    let t1 = d11 + (x - x1) * (d11 - d12) / (x1 - x2);
    let t2 = d21 + (x - x1) * (d21 - d22) / (x1 - x2);
    t1 + (y - y1) * (t1 - t2) / (y1 - y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{MissingPolicy, ScanOrder};

    fn seq_grid() -> Vec<f64> {
        (1..=9).map(f64::from).collect()
    }

    fn grid(data: &[f64]) -> GridData<'_> {
        GridData::new(data, 3, 3, ScanOrder::YAscending).unwrap()
    }

    #[test]
    fn nearest_at_cell_center() {
        let data = seq_grid();
        let g = grid(&data);
        let v = sample(&g, &MissingSpec::primary(9999.0), 2.0, 2.0, InterpMethod::Nearest, false);
        assert_eq!(v, 5.0);
    }

    #[test]
    fn nearest_out_of_range_is_missing() {
        let data = seq_grid();
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        assert_eq!(sample(&g, &miss, 0.4, 1.0, InterpMethod::Nearest, false), 9999.0);
        assert_eq!(sample(&g, &miss, 1.0, 3.6, InterpMethod::Nearest, false), 9999.0);
    }

    #[test]
    fn nearest_rounds_to_the_closest_cell() {
        let data = seq_grid();
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        assert_eq!(sample(&g, &miss, 2.4, 1.4, InterpMethod::Nearest, false), 2.0);
        assert_eq!(sample(&g, &miss, 2.6, 1.6, InterpMethod::Nearest, false), 6.0);
    }

    #[test]
    fn bilinear_cell_center_is_corner_mean() {
        let data = seq_grid();
        let g = grid(&data);
        let v = sample(&g, &MissingSpec::primary(9999.0), 1.5, 1.5, InterpMethod::Bilinear, false);
        assert_eq!(v, 3.0);
    }

    #[test]
    fn bilinear_at_integer_point_matches_nearest() {
        let data = seq_grid();
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        for (x, y) in [(1.0, 1.0), (2.0, 2.0), (1.0, 2.0), (2.0, 1.0)] {
            assert_eq!(
                sample(&g, &miss, x, y, InterpMethod::Bilinear, false),
                sample(&g, &miss, x, y, InterpMethod::Nearest, false),
                "point ({}, {})",
                x,
                y
            );
        }
    }

    #[test]
    fn bilinear_interior_is_bounded_by_corners() {
        let data = vec![2.0, 7.0, 1.0, 8.0, 3.0, 9.0, 5.0, 4.0, 6.0];
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        for &(x, y) in &[(1.25_f64, 1.75_f64), (1.5, 1.5), (2.9, 2.1), (1.1, 2.9)] {
            let x1 = x.floor() as usize;
            let y1 = y.floor() as usize;
            let corners = [
                g.get(x1, y1),
                g.get(x1 + 1, y1),
                g.get(x1, y1 + 1),
                g.get(x1 + 1, y1 + 1),
            ];
            let lo = corners.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let v = sample(&g, &miss, x, y, InterpMethod::Bilinear, false);
            assert!(v >= lo && v <= hi, "({}, {}) -> {} not in [{}, {}]", x, y, v, lo, hi);
        }
    }

    #[test]
    fn bilinear_missing_near_corner_propagates() {
        // d12 (east corner of the south row) missing.
        let mut data = seq_grid();
        data[1] = 9999.0;
        let g = grid(&data);
        let v = sample(&g, &MissingSpec::primary(9999.0), 1.5, 1.5, InterpMethod::Bilinear, false);
        assert_eq!(v, 9999.0);
    }

    #[test]
    fn bilinear_missing_far_corner_propagates() {
        // d22 at (x2, y2); the far corner's sentinel must be checked too.
        let mut data = seq_grid();
        data[4] = 9999.0;
        let g = grid(&data);
        let v = sample(&g, &MissingSpec::primary(9999.0), 1.5, 1.5, InterpMethod::Bilinear, false);
        assert_eq!(v, 9999.0);
    }

    #[test]
    fn bilinear_secondary_sentinel_respected_under_two_sentinel_policy() {
        let mut data = seq_grid();
        data[0] = -9999.0;
        let g = grid(&data);
        let two = MissingSpec::primary_and_secondary(9999.0, -9999.0);
        assert_eq!(sample(&g, &two, 1.5, 1.5, InterpMethod::Bilinear, false), 9999.0);

        // Under a primary-only policy the same value is ordinary data.
        let one = MissingSpec::primary(9999.0);
        let v = sample(&g, &one, 1.5, 1.5, InterpMethod::Bilinear, false);
        assert!(v != 9999.0);
    }

    #[test]
    fn bilinear_outside_without_wrap_is_missing() {
        let data = seq_grid();
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        assert_eq!(sample(&g, &miss, 3.5, 2.0, InterpMethod::Bilinear, false), 9999.0);
        assert_eq!(sample(&g, &miss, 0.5, 2.0, InterpMethod::Bilinear, false), 9999.0);
    }

    #[test]
    fn bilinear_seam_cell_wraps_to_first_column() {
        // Row y=2 holds [4, 5, 6]; halfway between the last column (6) and
        // the wrapped first column (4) is 5.
        let data = seq_grid();
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        let v = sample(&g, &miss, 3.5, 2.0, InterpMethod::Bilinear, true);
        assert_eq!(v, 5.0);
    }

    #[test]
    fn seam_cell_missing_corner_still_propagates() {
        let mut data = seq_grid();
        data[3] = 9999.0; // logical (1, 2), the wrapped column
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        assert_eq!(sample(&g, &miss, 3.5, 2.0, InterpMethod::Bilinear, true), 9999.0);
    }

    #[test]
    fn wrap_does_not_rescue_north_overflow() {
        let data = seq_grid();
        let g = grid(&data);
        let miss = MissingSpec::primary(9999.0);
        assert_eq!(sample(&g, &miss, 3.5, 3.0, InterpMethod::Bilinear, true), 9999.0);
    }

    #[test]
    fn scan_mode_zero_samples_the_same_logical_field() {
        let stored_0 = vec![7.0, 8.0, 9.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0];
        let g = GridData::new(&stored_0, 3, 3, ScanOrder::YDescending).unwrap();
        let miss = MissingSpec::primary(9999.0);
        assert_eq!(sample(&g, &miss, 2.0, 2.0, InterpMethod::Nearest, false), 5.0);
        assert_eq!(sample(&g, &miss, 1.5, 1.5, InterpMethod::Bilinear, false), 3.0);
    }

    #[test]
    fn no_missing_policy_interpolates_sentinel_as_data() {
        let mut data = seq_grid();
        data[0] = 9999.0;
        let g = grid(&data);
        let none = MissingSpec {
            policy: MissingPolicy::None,
            primary: 9999.0,
            secondary: 9999.0,
        };
        let v = sample(&g, &none, 1.5, 1.5, InterpMethod::Bilinear, false);
        assert!((v - (9999.0 + 2.0 + 4.0 + 5.0) / 4.0).abs() < 1e-9);
    }
}
