//! Point sampling of decoded forecast grids.
//!
//! [`GridData`] wraps a decoded grid with its dimensions and storage scan
//! order; [`interp`] samples it at fractional 1-based grid coordinates with
//! missing-value propagation.

pub mod grid;
pub mod interp;

pub use grid::{GridData, GridError, MissingPolicy, MissingSpec, ScanOrder};
pub use interp::{sample, InterpMethod};
