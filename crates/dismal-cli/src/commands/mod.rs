//! CLI command implementations.

pub mod chords;
pub mod common;
pub mod distributions;
pub mod eval;
pub mod extrema;
pub mod info;
pub mod map;
pub mod models;
pub mod tuning;
