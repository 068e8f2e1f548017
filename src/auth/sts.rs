//! STS role assumption with fixed session tags

use crate::error::{Result, TaxiError};
use async_trait::async_trait;
use std::fmt;
use std::time::SystemTime;

/// Session name reported to the token service
pub const SESSION_NAME: &str = "github.com-wirecard-taxi";

/// Lifetime of the temporary credentials, in seconds
pub const SESSION_DURATION_SECS: i32 = 1200;

/// Tags attached to every assumed session: calling client, source
/// repository and owning team.
pub const SESSION_TAGS: [(&str, &str); 3] = [
    ("client", "TAXI"),
    ("repository", "wirecard/taxi"),
    ("team", "tecodc"),
];

/// Provider name attached to assumed-role credentials
const ASSUMED_PROVIDER_NAME: &str = "taxi-assume-role";

/// Key/value tag passed along with the role assumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTag {
    /// Tag key
    pub key: String,
    /// Tag value
    pub value: String,
}

/// Parameters of a single role assumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    /// Role to assume, verbatim from settings
    pub role_arn: Option<String>,
    /// Session name
    pub session_name: String,
    /// Requested credential lifetime in seconds
    pub duration_seconds: i32,
    /// Session tags
    pub tags: Vec<SessionTag>,
}

impl AssumeRoleRequest {
    /// Request for the given role with the fixed session name, duration and tags
    pub fn for_role(role_arn: Option<&str>) -> Self {
        Self {
            role_arn: role_arn.map(str::to_string),
            session_name: SESSION_NAME.to_string(),
            duration_seconds: SESSION_DURATION_SECS,
            tags: SESSION_TAGS
                .iter()
                .map(|(key, value)| SessionTag {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }
}

/// Short-lived credentials returned by the token service
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Session token
    pub session_token: String,
    /// Expiration time, if reported
    pub expiration: Option<SystemTime>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl From<TemporaryCredentials> for aws_credential_types::Credentials {
    fn from(creds: TemporaryCredentials) -> Self {
        aws_credential_types::Credentials::new(
            creds.access_key_id,
            creds.secret_access_key,
            Some(creds.session_token),
            creds.expiration,
            ASSUMED_PROVIDER_NAME,
        )
    }
}

/// Security token service seam
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Assume a role. Rejections are returned as [`TaxiError::AssumeRole`]
    /// carrying the service error untouched.
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials>;
}

/// Token service backed by the AWS STS client
#[derive(Debug, Clone)]
pub struct StsTokenService {
    client: aws_sdk_sts::Client,
}

impl StsTokenService {
    /// Create a token service from the shared SDK configuration
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self::from_client(aws_sdk_sts::Client::new(config))
    }

    /// Wrap an existing STS client
    pub fn from_client(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenService for StsTokenService {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials> {
        let tags = request
            .tags
            .iter()
            .map(|tag| {
                aws_sdk_sts::types::Tag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build()
                    .map_err(|e| TaxiError::InvalidRequest(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Assuming role {:?} as '{}' for {}s",
            request.role_arn,
            request.session_name,
            request.duration_seconds
        );

        let output = self
            .client
            .assume_role()
            .set_role_arn(request.role_arn.clone())
            .role_session_name(&request.session_name)
            .duration_seconds(request.duration_seconds)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| TaxiError::assume_role(aws_sdk_sts::Error::from(e)))?;

        let creds = output.credentials().ok_or(TaxiError::MissingCredentials)?;

        Ok(TemporaryCredentials {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
            expiration: SystemTime::try_from(*creds.expiration()).ok(),
        })
    }
}
