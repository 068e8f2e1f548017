//! Console output
//!
//! Labelled sections and listings for the diagnostic commands. Colors are
//! cosmetic and can be turned off.

mod printer;

pub use printer::*;
