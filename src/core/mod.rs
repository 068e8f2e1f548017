//! Core facade
//!
//! Ties the loaded settings, role assumption and storage client together
//! behind the operations the CLI exposes.

mod facade;

pub use facade::*;
