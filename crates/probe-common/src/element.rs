//! Forecast-element catalog.
//!
//! Each NDFD forecast variable is identified by a composite key of GRIB2
//! metadata fields. The catalog holds one descriptor per well-known element;
//! a `None` field is a wildcard that matches any grid value for that field.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Symbolic ids of the well-known forecast elements, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    MaxT = 0,
    MinT,
    Pop12,
    Temp,
    WindDir,
    WindSpd,
    Td,
    Sky,
    Qpf,
    SnowAmt,
    Wx,
    WaveHeight,
    ApparentT,
    Rh,
    Undef,
    MatchAll,
}

/// Number of catalog slots, including `Undef` and `MatchAll`.
pub const ELEMENT_COUNT: usize = 16;

/// Naming conventions under which elements are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// Command-line short names ("maxt", "t", ...).
    Short,
    /// Standard file-name components ("maxt", "temp", ...).
    File,
    /// Verification suite names ("mx", "tt", ...).
    Verification,
}

impl Element {
    /// All catalog slots in order, `Undef` and `MatchAll` last.
    pub const ALL: [Element; ELEMENT_COUNT] = [
        Element::MaxT,
        Element::MinT,
        Element::Pop12,
        Element::Temp,
        Element::WindDir,
        Element::WindSpd,
        Element::Td,
        Element::Sky,
        Element::Qpf,
        Element::SnowAmt,
        Element::Wx,
        Element::WaveHeight,
        Element::ApparentT,
        Element::Rh,
        Element::Undef,
        Element::MatchAll,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Element> {
        Element::ALL.get(i).copied()
    }

    /// Name of this element under a convention; `None` for `Undef`,
    /// `MatchAll`.
    pub fn name(self, convention: NamingConvention) -> Option<&'static str> {
        let names = match convention {
            NamingConvention::Short => &SHORT_NAMES,
            NamingConvention::File => &FILE_NAMES,
            NamingConvention::Verification => &VERIF_NAMES,
        };
        names.get(self.index()).copied().flatten()
    }

    /// Resolve a name under a convention, normalising case first.
    /// Unknown names resolve to `Undef`.
    pub fn from_name(name: &str, convention: NamingConvention) -> Element {
        let lowered = name.to_ascii_lowercase();
        for e in Element::ALL {
            if e.name(convention) == Some(lowered.as_str()) {
                return e;
            }
        }
        Element::Undef
    }

    pub fn is_wildcard_slot(self) -> bool {
        matches!(self, Element::Undef | Element::MatchAll)
    }
}

const SHORT_NAMES: [Option<&str>; ELEMENT_COUNT] = [
    Some("maxt"),
    Some("mint"),
    Some("pop12"),
    Some("t"),
    Some("winddir"),
    Some("windspd"),
    Some("td"),
    Some("sky"),
    Some("qpf"),
    Some("snow"),
    Some("wx"),
    Some("waveh"),
    Some("apt"),
    Some("rh"),
    None,
    None,
];

const FILE_NAMES: [Option<&str>; ELEMENT_COUNT] = [
    Some("maxt"),
    Some("mint"),
    Some("pop12"),
    Some("temp"),
    Some("wdir"),
    Some("wspd"),
    Some("td"),
    Some("sky"),
    Some("qpf"),
    Some("snow"),
    Some("wx"),
    Some("waveh"),
    Some("apparentt"),
    Some("rhm"),
    None,
    None,
];

const VERIF_NAMES: [Option<&str>; ELEMENT_COUNT] = [
    Some("mx"),
    Some("mn"),
    Some("pp"),
    Some("tt"),
    Some("wd"),
    Some("ws"),
    Some("dp"),
    Some("cl"),
    Some("qp"),
    Some("sn"),
    Some("wx"),
    Some("wh"),
    Some("at"),
    Some("rh"),
    None,
    None,
];

/// Composite identity of a forecast variable.
///
/// `None` means match-any. Descriptors are immutable after construction;
/// the catalog hands out references and callers clone what they keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub ndfd: Element,
    pub version: Option<u8>,
    pub center: Option<u16>,
    pub subcenter: Option<u16>,
    pub gen_process: Option<u8>,
    pub prod_type: Option<u8>,
    pub template: Option<u16>,
    pub category: Option<u8>,
    pub subcategory: Option<u8>,
    pub interval_hours: Option<u32>,
    pub surface_type: Option<u8>,
    pub surface_value: Option<f64>,
    pub second_surface_value: Option<f64>,
}

impl ElementDescriptor {
    /// A descriptor with every field wildcarded.
    pub fn any(ndfd: Element) -> Self {
        Self {
            ndfd,
            version: None,
            center: None,
            subcenter: None,
            gen_process: None,
            prod_type: None,
            template: None,
            category: None,
            subcategory: None,
            interval_hours: None,
            surface_type: None,
            surface_value: None,
            second_surface_value: None,
        }
    }
}

/// The ordered descriptor catalog.
#[derive(Debug)]
pub struct ElementCatalog {
    entries: Vec<ElementDescriptor>,
}

impl ElementCatalog {
    /// Build the standard NDFD catalog.
    pub fn standard() -> Self {
        // NDFD grids: GRIB edition 2, originating center 8. Surface type 103
        // is height above ground, 1 is the ground surface. Templates 8 and 9
        // carry an accumulation / probability interval.
        let ndfd = |e, prod_type, template, cat, sub, interval, surf: u8, sval: f64| {
            ElementDescriptor {
                ndfd: e,
                version: Some(2),
                center: Some(8),
                subcenter: None,
                gen_process: None,
                prod_type: Some(prod_type),
                template: Some(template),
                category: Some(cat),
                subcategory: Some(sub),
                interval_hours: interval,
                surface_type: Some(surf),
                surface_value: Some(sval),
                second_surface_value: Some(0.0),
            }
        };

        let entries = vec![
            ndfd(Element::MaxT, 0, 8, 0, 4, Some(12), 103, 2.0),
            ndfd(Element::MinT, 0, 8, 0, 5, Some(12), 103, 2.0),
            ndfd(Element::Pop12, 0, 9, 1, 8, Some(12), 1, 0.0),
            ndfd(Element::Temp, 0, 0, 0, 0, None, 103, 2.0),
            ndfd(Element::WindDir, 0, 0, 2, 0, None, 103, 10.0),
            ndfd(Element::WindSpd, 0, 0, 2, 1, None, 103, 10.0),
            ndfd(Element::Td, 0, 0, 0, 6, None, 103, 2.0),
            ndfd(Element::Sky, 0, 0, 6, 1, None, 1, 0.0),
            ndfd(Element::Qpf, 0, 8, 1, 8, Some(6), 1, 0.0),
            ndfd(Element::SnowAmt, 0, 8, 1, 29, Some(6), 1, 0.0),
            ndfd(Element::Wx, 0, 0, 1, 192, None, 1, 0.0),
            ndfd(Element::WaveHeight, 10, 0, 0, 5, None, 1, 0.0),
            ndfd(Element::ApparentT, 0, 0, 0, 193, None, 103, 2.0),
            ndfd(Element::Rh, 0, 0, 1, 1, None, 103, 2.0),
            ElementDescriptor::any(Element::Undef),
            ElementDescriptor::any(Element::MatchAll),
        ];

        Self { entries }
    }

    pub fn descriptor(&self, e: Element) -> &ElementDescriptor {
        &self.entries[e.index()]
    }

    pub fn entries(&self) -> &[ElementDescriptor] {
        &self.entries
    }

    /// Well-known entries only, in catalog order.
    pub fn well_known(&self) -> impl Iterator<Item = &ElementDescriptor> {
        self.entries.iter().filter(|d| !d.ndfd.is_wildcard_slot())
    }
}

/// Process-wide catalog instance.
pub fn catalog() -> &'static ElementCatalog {
    static CATALOG: OnceLock<ElementCatalog> = OnceLock::new();
    CATALOG.get_or_init(ElementCatalog::standard)
}
