//! Role assumption
//!
//! Exchanges the long-lived identity for short-lived credentials through
//! the security token service.

mod sts;

pub use sts::*;
