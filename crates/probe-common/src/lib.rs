//! Common types shared across the gridprobe crates.

pub mod element;
pub mod error;
pub mod filter;
pub mod matches;
pub mod point;
pub mod time;
pub mod value;
pub mod wx;

pub use element::{catalog, Element, ElementCatalog, ElementDescriptor, NamingConvention};
pub use error::{ProbeError, ProbeResult};
pub use filter::{resolve_elements, ElementInterest};
pub use matches::{Match, MatchSet};
pub use point::{parse_point_file, parse_point_lines, Point, PointKind};
pub use time::TimeWindow;
pub use value::Value;
pub use wx::{decode_weather, WeatherMode};
