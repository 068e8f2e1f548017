//! # Taxi - S3 and SFTP configuration facade
//!
//! Taxi loads its connection settings from the environment once, assumes
//! a delegated AWS role for every storage call and offers a few
//! diagnostics on top of the AWS SDK.
//!
//! ## Features
//!
//! - **Environment settings**: object storage and SFTP parameters, absent
//!   values kept as `None`
//! - **Role assumption**: fixed session tags, 1200 second credentials
//! - **Fresh clients**: every operation re-assumes the role and builds a new
//!   path-style S3 client, optionally through an HTTP proxy
//! - **Diagnostics**: list buckets, list objects, print effective settings
//!
//! ## Quick Start
//!
//! ```no_run
//! use taxi::config::Settings;
//! use taxi::core::Taxi;
//! use taxi::output::Printer;
//! use std::sync::Arc;
//!
//! # async fn demo() -> taxi::Result<()> {
//! let settings = Arc::new(Settings::from_env());
//! let taxi = Taxi::load(settings).await;
//!
//! let mut printer = Printer::stdout(true);
//! taxi.print(&mut printer)?;
//! taxi.list_objects("my-bucket", &mut printer).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod storage;

// Re-export commonly used types
pub use config::{Settings, StorageSettings, TransferSettings};
pub use core::Taxi;
pub use error::{Result, TaxiError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use taxi::prelude::*;
    //! ```

    pub use crate::auth::{AssumeRoleRequest, StsTokenService, TemporaryCredentials, TokenService};
    pub use crate::config::{EffectiveSettings, Settings, SignatureVersion, StorageSettings, TransferSettings};
    pub use crate::core::Taxi;
    pub use crate::error::{Result, TaxiError};
    pub use crate::output::{Accent, Printer};
    pub use crate::storage::{BucketSummary, ObjectStore, ObjectSummary, S3Connector, S3Store, StoreConnector};
}
