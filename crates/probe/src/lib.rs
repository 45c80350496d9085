//! The gridprobe driver.
//!
//! Ties the element filter, the GRIB2 and cube probe loops, and unit
//! conversion together behind one synchronous [`probe`] call. Per-file
//! failures are logged and skipped; only configuration errors abort the
//! whole call.

pub mod driver;
pub mod options;
pub mod units;

pub use driver::{probe, probe_into};
pub use options::{FileKind, ProbeOptions, UnitSystem};

pub use probe_common::{
    catalog, Element, ElementDescriptor, ElementInterest, Match, MatchSet, NamingConvention,
    Point, PointKind, ProbeError, ProbeResult, TimeWindow, Value, WeatherMode,
};
