//! Probe point input.
//!
//! Points arrive either as geographic coordinates or as 1-based grid cells;
//! the interpretation is carried alongside the point list rather than per
//! point. Point files are comma-delimited text, one point per line.

use crate::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the `(x, y)` pair of a [`Point`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// `x` is longitude, `y` is latitude, in degrees.
    GeoDegrees,
    /// `x`, `y` are 1-based grid-cell coordinates.
    GridCell,
}

/// A single probe point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub label: String,
    pub x: f64,
    pub y: f64,
    /// Optional per-point output file from the fourth point-file field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_file: Option<PathBuf>,
}

impl Point {
    pub fn geographic(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            label: label.into(),
            x: lon,
            y: lat,
            out_file: None,
        }
    }

    /// Latitude under the geographic interpretation.
    pub fn lat(&self) -> f64 {
        self.y
    }

    /// Longitude under the geographic interpretation.
    pub fn lon(&self) -> f64 {
        self.x
    }
}

/// Read a point file from disk.
pub fn parse_point_file(path: &Path) -> ProbeResult<Vec<Point>> {
    let text = fs::read_to_string(path)
        .map_err(|_| ProbeError::CannotOpen(path.display().to_string()))?;
    parse_point_lines(&text)
}

/// Parse point-file text.
///
/// Accepted line shapes, detected by field count:
///
/// ```text
/// label, lat, lon [, outFile]
/// lat, lon
/// ```
///
/// `#` in column one marks a comment; blank lines are skipped. A line with
/// exactly one field fails the whole call.
pub fn parse_point_lines(text: &str) -> ProbeResult<Vec<Point>> {
    let mut points = Vec::new();

    for (lineno, raw) in text.lines().enumerate() {
        let line = lineno + 1;
        if raw.starts_with('#') || raw.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        let point = match fields.len() {
            2 => {
                let lat = parse_coord(fields[0], line, "latitude")?;
                let lon = parse_coord(fields[1], line, "longitude")?;
                Point {
                    label: format!("({:.6},{:.6})", lat, lon),
                    x: lon,
                    y: lat,
                    out_file: None,
                }
            }
            3 | 4 => {
                let lat = parse_coord(fields[1], line, "latitude")?;
                let lon = parse_coord(fields[2], line, "longitude")?;
                Point {
                    label: fields[0].to_string(),
                    x: lon,
                    y: lat,
                    out_file: fields
                        .get(3)
                        .filter(|f| !f.is_empty())
                        .map(PathBuf::from),
                }
            }
            n => {
                return Err(ProbeError::BadPointLine {
                    line,
                    reason: format!("expected 2 to 4 comma-separated fields, found {}", n),
                });
            }
        };
        points.push(point);
    }

    Ok(points)
}

fn parse_coord(field: &str, line: usize, what: &str) -> ProbeResult<f64> {
    field.parse::<f64>().map_err(|_| ProbeError::BadPointLine {
        line,
        reason: format!("invalid {} {:?}", what, field),
    })
}
