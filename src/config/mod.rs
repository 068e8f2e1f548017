//! Configuration module for Taxi
//!
//! Provides CLI arguments, environment-derived settings and the
//! shared SDK configuration built from them.

mod sdk;
mod settings;

pub use sdk::*;
pub use settings::*;
