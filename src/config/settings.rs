//! Configuration settings for Taxi
//!
//! Defines the CLI arguments and the environment-derived settings used
//! by the storage facade.

use clap::{Parser, Subcommand};
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Access key id for the long-lived identity
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// Secret access key for the long-lived identity
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Region of the storage and token services
pub const ENV_REGION: &str = "AWS_REGION";
/// ARN of the role assumed before every storage call
pub const ENV_ROLE_TO_ASSUME: &str = "AWS_ROLE_TO_ASSUME";
/// Custom endpoint for S3-compatible services
pub const ENV_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
/// Request signing scheme token
pub const ENV_SIGNATURE_VERSION: &str = "AWS_SIGNATURE_VERSION";
/// HTTP proxy for storage requests
pub const ENV_HTTP_PROXY: &str = "AWS_HTTP_PROXY";
/// SFTP user
pub const ENV_SFTP_USER: &str = "SFTP_USER";
/// SFTP host
pub const ENV_SFTP_HOST: &str = "SFTP_HOST";
/// SFTP port
pub const ENV_SFTP_PORT: &str = "SFTP_PORT";
/// SFTP key reference
pub const ENV_SFTP_KEY: &str = "SFTP_KEY";

/// Every environment variable read by [`Settings::from_env`]
pub const ENV_VARS: [&str; 11] = [
    ENV_ACCESS_KEY_ID,
    ENV_SECRET_ACCESS_KEY,
    ENV_REGION,
    ENV_ROLE_TO_ASSUME,
    ENV_ENDPOINT_URL,
    ENV_SIGNATURE_VERSION,
    ENV_HTTP_PROXY,
    ENV_SFTP_USER,
    ENV_SFTP_HOST,
    ENV_SFTP_PORT,
    ENV_SFTP_KEY,
];

const REDACTED: &str = "********";

/// Taxi - S3 and SFTP configuration diagnostics
#[derive(Parser, Debug, Clone)]
#[command(name = "taxi")]
#[command(author = "Taxi Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect S3 and SFTP configuration through an assumed role")]
#[command(long_about = r#"
Taxi reads its connection settings from the environment, assumes the
configured AWS role for every storage call and offers diagnostics.

Environment:
  AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION, AWS_ROLE_TO_ASSUME,
  AWS_ENDPOINT_URL, AWS_SIGNATURE_VERSION, AWS_HTTP_PROXY,
  SFTP_USER, SFTP_HOST, SFTP_PORT, SFTP_KEY

Examples:
  taxi config             # Print loaded and effective settings
  taxi buckets            # List buckets visible to the assumed role
  taxi ls my-bucket       # List objects in a bucket
"#)]
pub struct CliArgs {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print SFTP, AWS and effective SDK settings
    #[command(name = "config")]
    Config,

    /// List buckets visible to the assumed role
    #[command(name = "buckets")]
    Buckets,

    /// List objects in a bucket
    #[command(name = "ls")]
    Ls {
        /// Bucket name
        bucket: String,
    },
}

/// Request signing scheme requested through `AWS_SIGNATURE_VERSION`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignatureVersion {
    /// Legacy v2 signing
    #[default]
    V2,
    /// Signature version 4
    V4,
    /// S3-specific legacy signing
    S3,
    /// Any other token, kept verbatim
    Other(String),
}

impl SignatureVersion {
    /// Token as written in the environment
    pub fn as_str(&self) -> &str {
        match self {
            Self::V2 => "v2",
            Self::V4 => "v4",
            Self::S3 => "s3",
            Self::Other(raw) => raw,
        }
    }
}

impl FromStr for SignatureVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "v2" => Self::V2,
            "v4" => Self::V4,
            "s3" => Self::S3,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SignatureVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Object storage connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageSettings {
    /// Access key ID of the long-lived identity
    pub access_key_id: Option<String>,
    /// Secret access key of the long-lived identity
    #[serde(serialize_with = "serialize_redacted")]
    pub secret_access_key: Option<String>,
    /// AWS region
    pub region: Option<String>,
    /// ARN of the role to assume
    pub role_arn: Option<String>,
    /// Custom endpoint URL for S3-compatible services
    pub endpoint_url: Option<String>,
    /// Request signing scheme
    pub signature_version: SignatureVersion,
    /// HTTP proxy for storage requests
    pub http_proxy: Option<String>,
}

impl StorageSettings {
    /// Both parts of the static key pair are present
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

/// SFTP endpoint settings, held for transfer commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferSettings {
    /// Remote user
    pub user: Option<String>,
    /// Remote hostname or IP
    pub host: Option<String>,
    /// Port as written in the environment
    pub port: Option<String>,
    /// Private key reference
    pub key: Option<String>,
}

impl TransferSettings {
    /// Port as a number, if it parses
    pub fn port(&self) -> Option<u16> {
        let raw = self.port.as_deref()?;
        match raw.trim().parse() {
            Ok(port) => Some(port),
            Err(_) => {
                tracing::warn!("Ignoring non-numeric {}: {:?}", ENV_SFTP_PORT, raw);
                None
            }
        }
    }

    /// `user@host:port` with whatever parts are known
    pub fn address(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let mut address = match self.user.as_deref() {
            Some(user) => format!("{}@{}", user, host),
            None => host.to_string(),
        };
        if let Some(port) = self.port() {
            address.push_str(&format!(":{}", port));
        }
        Some(address)
    }
}

/// Process-wide settings, loaded once and shared read-only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Object storage settings
    pub storage: StorageSettings,
    /// SFTP settings
    pub transfer: TransferSettings,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Absent variables stay `None`; nothing is validated.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let signature_version = lookup(ENV_SIGNATURE_VERSION)
            .map(|raw| match raw.parse() {
                Ok(version) => version,
                Err(never) => match never {},
            })
            .unwrap_or_default();

        let settings = Self {
            storage: StorageSettings {
                access_key_id: lookup(ENV_ACCESS_KEY_ID),
                secret_access_key: lookup(ENV_SECRET_ACCESS_KEY),
                region: lookup(ENV_REGION),
                role_arn: lookup(ENV_ROLE_TO_ASSUME),
                endpoint_url: lookup(ENV_ENDPOINT_URL),
                signature_version,
                http_proxy: lookup(ENV_HTTP_PROXY),
            },
            transfer: TransferSettings {
                user: lookup(ENV_SFTP_USER),
                host: lookup(ENV_SFTP_HOST),
                port: lookup(ENV_SFTP_PORT),
                key: lookup(ENV_SFTP_KEY),
            },
        };

        let missing: Vec<&str> = ENV_VARS
            .iter()
            .copied()
            .filter(|name| *name != ENV_SIGNATURE_VERSION && lookup(name).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::debug!("Unset environment variables: {}", missing.join(", "));
        }

        settings
    }
}

/// SDK-level settings actually applied to the shared client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveSettings {
    /// Endpoint override
    pub endpoint: Option<String>,
    /// Resolved region
    pub region: Option<String>,
    /// Where credentials come from
    pub credentials: String,
}

impl EffectiveSettings {
    /// Describe what the SDK will use for the given storage settings
    pub fn from_storage(storage: &StorageSettings) -> Self {
        Self {
            endpoint: storage.endpoint_url.clone(),
            region: storage.region.clone(),
            credentials: describe_credentials(storage),
        }
    }

    /// Read back what the loaded SDK configuration resolved to
    pub fn from_sdk_config(config: &aws_config::SdkConfig, storage: &StorageSettings) -> Self {
        Self {
            endpoint: config.endpoint_url().map(str::to_string),
            region: config.region().map(|r| r.to_string()),
            credentials: if config.credentials_provider().is_some() {
                describe_credentials(storage)
            } else {
                "none".to_string()
            },
        }
    }
}

/// Non-UTF-8 values are kept with invalid bytes replaced
fn env_var(name: &str) -> Option<String> {
    let raw = std::env::var_os(name)?;
    match raw.into_string() {
        Ok(value) => Some(value),
        Err(raw) => {
            tracing::warn!("{} is not valid UTF-8, replacing invalid bytes", name);
            Some(raw.to_string_lossy().into_owned())
        }
    }
}

fn describe_credentials(storage: &StorageSettings) -> String {
    match storage.access_key_id.as_deref() {
        Some(key_id) if storage.has_static_credentials() => {
            format!("static ({}, secret {})", key_id, REDACTED)
        }
        _ => "default provider chain".to_string(),
    }
}

fn serialize_redacted<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_some(REDACTED),
        None => serializer.serialize_none(),
    }
}
