//! Heuristics module.
//!
//! This module exports the nearest-neighbor baselines and the ant colony.

pub mod construction;
pub mod aco;

pub use construction::*;
pub use aco::*;
