//! Object storage module
//!
//! Provides the storage client seam and its S3 implementation, built from
//! assumed-role credentials with path-style addressing.

mod proxy;
mod s3;

pub use proxy::*;
pub use s3::*;
