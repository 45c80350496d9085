//! Output unit conversion.
//!
//! Grids arrive in their native units (kelvin, m/s, SI lengths); the
//! English and Metric systems convert numeric values in place after the
//! probe loops run. A value only converts when the match still carries the
//! expected native unit label, so cubes pre-converted by their producer
//! pass through untouched. Missing values keep their sentinel.

use crate::options::UnitSystem;
use probe_common::{Element, Match, MatchSet, Value};

/// Convert every match in place to the requested unit system.
pub fn convert_matches(matches: &mut MatchSet, system: UnitSystem) {
    if system == UnitSystem::Native {
        return;
    }
    for m in matches.iter_mut() {
        convert_match(m, system);
    }
}

fn convert_match(m: &mut Match, system: UnitSystem) {
    let Some(conv) = conversion_for(m.descriptor.ndfd, &m.unit, system) else {
        return;
    };
    for v in &mut m.values {
        if let Value::Numeric(x) = v {
            *x = (conv.apply)(*x);
        }
    }
    m.unit = conv.label.to_string();
}

struct Conversion {
    apply: fn(f64) -> f64,
    label: &'static str,
}

fn conversion_for(element: Element, unit: &str, system: UnitSystem) -> Option<Conversion> {
    use Element::*;

    match element {
        MaxT | MinT | Temp | Td | ApparentT if unit == "[K]" => Some(match system {
            UnitSystem::English => Conversion {
                apply: kelvin_to_fahrenheit,
                label: "[F]",
            },
            UnitSystem::Metric => Conversion {
                apply: kelvin_to_celsius,
                label: "[C]",
            },
            UnitSystem::Native => return None,
        }),
        WindSpd if unit == "[m/s]" => match system {
            UnitSystem::English => Some(Conversion {
                apply: mps_to_knots,
                label: "[knots]",
            }),
            _ => None,
        },
        Qpf if unit == "[kg/m^2]" => match system {
            UnitSystem::English => Some(Conversion {
                apply: mm_to_inches,
                label: "[inch]",
            }),
            _ => None,
        },
        SnowAmt if unit == "[m]" => match system {
            UnitSystem::English => Some(Conversion {
                apply: meters_to_inches,
                label: "[inch]",
            }),
            _ => None,
        },
        WaveHeight if unit == "[m]" => match system {
            UnitSystem::English => Some(Conversion {
                apply: meters_to_feet,
                label: "[feet]",
            }),
            _ => None,
        },
        _ => None,
    }
}

fn kelvin_to_fahrenheit(k: f64) -> f64 {
    (k - 273.15) * 9.0 / 5.0 + 32.0
}

fn kelvin_to_celsius(k: f64) -> f64 {
    k - 273.15
}

fn mps_to_knots(mps: f64) -> f64 {
    mps * 1.943_844
}

/// QPF is kg/m^2, numerically millimetres of water.
fn mm_to_inches(mm: f64) -> f64 {
    mm / 25.4
}

fn meters_to_inches(m: f64) -> f64 {
    m * 39.370_079
}

fn meters_to_feet(m: f64) -> f64 {
    m * 3.280_84
}
