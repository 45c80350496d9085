//! Probe results.

use crate::element::ElementDescriptor;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One grid that passed the meta and time filters, sampled at every probe
/// point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Resolved identity of the grid. `descriptor.ndfd` is `Undef` when the
    /// grid matched a wildcard filter but no catalog entry.
    pub descriptor: ElementDescriptor,
    pub reference_time: DateTime<Utc>,
    pub valid_time: DateTime<Utc>,
    pub unit: String,
    /// One value per probe point, in point order.
    pub values: Vec<Value>,
}

/// Append-only accumulator of matches.
///
/// Matches keep the order grids were discovered in: file order, then
/// message / super-PDS order, then sub-grid / inner-PDS order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MatchSet {
    matches: Vec<Match>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, m: Match) {
        self.matches.push(m);
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Match> {
        self.matches.iter_mut()
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.matches
    }

    pub fn into_vec(self) -> Vec<Match> {
        self.matches
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
