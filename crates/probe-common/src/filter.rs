//! Element-filter resolution.
//!
//! The caller seeds an interest array (0 = don't care, 1 = interested but
//! droppable, 2 = vital) and the user supplies an explicit element list.
//! Resolution produces the descriptor set the probe will match against.

use crate::element::{catalog, Element, ElementDescriptor, ELEMENT_COUNT};
use serde::{Deserialize, Serialize};

/// Per-element interest levels, indexed by [`Element`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInterest {
    cells: [u8; ELEMENT_COUNT],
}

impl ElementInterest {
    /// No interest anywhere.
    pub fn none() -> Self {
        Self {
            cells: [0; ELEMENT_COUNT],
        }
    }

    /// Droppable interest in every well-known element; the usual seed for a
    /// general-purpose driver.
    pub fn droppable() -> Self {
        let mut cells = [0; ELEMENT_COUNT];
        for e in Element::ALL {
            if !e.is_wildcard_slot() {
                cells[e.index()] = 1;
            }
        }
        Self { cells }
    }

    pub fn set(&mut self, e: Element, level: u8) -> &mut Self {
        self.cells[e.index()] = level;
        self
    }

    pub fn vital(mut self, e: Element) -> Self {
        self.cells[e.index()] = 2;
        self
    }

    pub fn get(&self, e: Element) -> u8 {
        self.cells[e.index()]
    }
}

impl Default for ElementInterest {
    fn default() -> Self {
        Self::droppable()
    }
}

impl From<[u8; ELEMENT_COUNT]> for ElementInterest {
    fn from(cells: [u8; ELEMENT_COUNT]) -> Self {
        Self { cells }
    }
}

/// Resolve caller interest plus the user's element list into the descriptor
/// set to match.
///
/// Every user selection raises the corresponding cell. With no user
/// selections, a vital cell keeps the caller's whole interest set alive;
/// with neither user selections nor vital cells, everything is selected.
/// The output holds catalog entries whose cell reached the vital level, in
/// catalog order, never including the `Undef` / `MatchAll` slots.
pub fn resolve_elements(
    interest: &ElementInterest,
    user: &[Element],
) -> Vec<ElementDescriptor> {
    let mut cells = interest.cells;

    for &e in user {
        cells[e.index()] = cells[e.index()].saturating_add(1);
    }

    if user.is_empty() {
        if cells.iter().any(|&c| c >= 2) {
            for c in cells.iter_mut() {
                if *c > 0 {
                    *c += 1;
                }
            }
        } else {
            for c in cells.iter_mut() {
                *c += 2;
            }
        }
    }

    catalog()
        .well_known()
        .filter(|d| cells[d.ndfd.index()] >= 2)
        .cloned()
        .collect()
}
