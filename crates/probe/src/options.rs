//! Probe call configuration.

use probe_common::{
    Element, ElementInterest, NamingConvention, Point, PointKind, TimeWindow, WeatherMode,
};
use projection::EarthShape;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input file format. `Auto` sniffs by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Auto,
    Grib,
    Cube,
}

impl FileKind {
    /// Resolve `Auto` against a file name; cube indexes conventionally end
    /// in `.flx` or `.ind`.
    pub fn resolve(self, path: &Path) -> FileKind {
        match self {
            FileKind::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some("flx") | Some("ind") => FileKind::Cube,
                _ => FileKind::Grib,
            },
            other => other,
        }
    }
}

/// Output unit system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Whatever the grids carry.
    Native,
    /// Fahrenheit, knots, inches, feet.
    English,
    /// Celsius, SI lengths.
    Metric,
}

/// Everything one probe call needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOptions {
    pub points: Vec<Point>,
    pub point_kind: PointKind,
    pub files: Vec<PathBuf>,
    pub file_kind: FileKind,
    /// Bilinear sampling when set; nearest-neighbor otherwise.
    pub interpolate: bool,
    pub unit: UnitSystem,
    pub earth_major_m: Option<f64>,
    pub earth_minor_m: Option<f64>,
    pub weather_mode: WeatherMode,
    pub simple_wx_version: u8,
    /// Caller interest seed for filter resolution.
    pub interest: ElementInterest,
    /// User-selected elements.
    pub elements: Vec<Element>,
    pub window: TimeWindow,
    /// Center accepted from cube indexes (NDFD is 8).
    pub accepted_center: u16,
    /// Opaque sector labels carried for the emitters; the core never
    /// interprets them.
    pub sectors: Vec<String>,
    pub naming: NamingConvention,
}

impl ProbeOptions {
    pub fn new(points: Vec<Point>, files: Vec<PathBuf>) -> Self {
        Self {
            points,
            point_kind: PointKind::GeoDegrees,
            files,
            file_kind: FileKind::Auto,
            interpolate: false,
            unit: UnitSystem::Native,
            earth_major_m: None,
            earth_minor_m: None,
            weather_mode: WeatherMode::English,
            simple_wx_version: 1,
            interest: ElementInterest::droppable(),
            elements: Vec::new(),
            window: TimeWindow::unbounded(),
            accepted_center: 8,
            sectors: Vec::new(),
            naming: NamingConvention::File,
        }
    }

    /// Restrict the probe to a time window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Earth-shape override assembled from the major/minor axis options; a
    /// single given axis is used spherically.
    pub fn earth_override(&self) -> Option<EarthShape> {
        match (self.earth_major_m, self.earth_minor_m) {
            (None, None) => None,
            (Some(major), None) => Some(EarthShape::spherical(major)),
            (None, Some(minor)) => Some(EarthShape::spherical(minor)),
            (Some(major), Some(minor)) => Some(EarthShape {
                major_m: major,
                minor_m: minor,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_kind_sniffs_cube_extensions() {
        assert_eq!(
            FileKind::Auto.resolve(Path::new("conus.flx")),
            FileKind::Cube
        );
        assert_eq!(
            FileKind::Auto.resolve(Path::new("conus.ind")),
            FileKind::Cube
        );
        assert_eq!(
            FileKind::Auto.resolve(Path::new("gfs.grib2")),
            FileKind::Grib
        );
        assert_eq!(FileKind::Auto.resolve(Path::new("noext")), FileKind::Grib);
    }

    #[test]
    fn explicit_kind_wins_over_extension() {
        assert_eq!(
            FileKind::Cube.resolve(Path::new("weird.grib2")),
            FileKind::Cube
        );
    }

    #[test]
    fn earth_override_combinations() {
        let mut opts = ProbeOptions::new(vec![], vec![]);
        assert!(opts.earth_override().is_none());

        opts.earth_major_m = Some(6_400_000.0);
        let e = opts.earth_override().unwrap();
        assert_eq!(e.major_m, e.minor_m);

        opts.earth_minor_m = Some(6_350_000.0);
        let e = opts.earth_override().unwrap();
        assert!(e.major_m > e.minor_m);
    }
}
