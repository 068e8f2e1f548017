//! S3 object storage client
//!
//! Every client is bound to one set of assumed-role credentials and always
//! uses path-style addressing, which S3-compatible services (MinIO, Ceph)
//! expect. Clients are built fresh per operation and never cached.

use super::proxied_http_client;
use crate::auth::TemporaryCredentials;
use crate::error::{Result, TaxiError};
use async_trait::async_trait;
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Path-style addressing is always on
pub const FORCE_PATH_STYLE: bool = true;

/// Bucket as reported by ListBuckets, projected to name and creation date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSummary {
    /// Bucket name
    pub name: String,
    /// Creation timestamp
    pub creation_date: Option<DateTime<Utc>>,
}

impl From<&aws_sdk_s3::types::Bucket> for BucketSummary {
    fn from(bucket: &aws_sdk_s3::types::Bucket) -> Self {
        Self {
            name: bucket.name().unwrap_or_default().to_string(),
            creation_date: bucket.creation_date().and_then(to_utc),
        }
    }
}

/// Object as reported by ListObjectsV2
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: i64,
    /// Last modified timestamp
    pub last_modified: Option<DateTime<Utc>>,
}

impl From<&aws_sdk_s3::types::Object> for ObjectSummary {
    fn from(object: &aws_sdk_s3::types::Object) -> Self {
        Self {
            key: object.key().unwrap_or_default().to_string(),
            size: object.size().unwrap_or_default(),
            last_modified: object.last_modified().and_then(to_utc),
        }
    }
}

/// `<last-modified>\t<size>\t<key>`
impl fmt::Display for ObjectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_modified {
            Some(ts) => write!(f, "{}\t{}\t{}", ts, self.size, self.key),
            None => write!(f, "\t{}\t{}", self.size, self.key),
        }
    }
}

fn to_utc(ts: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())
}

/// Storage client seam
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all buckets visible to the credentials
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>>;

    /// List all objects in a bucket
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>>;
}

/// Builds a storage client bound to a set of temporary credentials
pub trait StoreConnector: Send + Sync {
    /// Client type produced
    type Store: ObjectStore;

    /// Build a new client; nothing is reused between calls
    fn connect(&self, credentials: TemporaryCredentials) -> Result<Self::Store>;
}

/// S3 client wrapper
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Wrap an SDK client
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| TaxiError::storage("ListBuckets", aws_sdk_s3::Error::from(e)))?;

        Ok(resp.buckets().iter().map(BucketSummary::from).collect())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| TaxiError::storage("ListObjectsV2", aws_sdk_s3::Error::from(e)))?;

            pages += 1;
            objects.extend(resp.contents().iter().map(ObjectSummary::from));

            match resp.next_continuation_token() {
                Some(token) if !token.is_empty() => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!("Listed {} objects in {} page(s) of {}", objects.len(), pages, bucket);
        Ok(objects)
    }
}

/// Builds [`S3Store`]s from the shared SDK configuration
#[derive(Debug, Clone)]
pub struct S3Connector {
    sdk_config: aws_config::SdkConfig,
    http_proxy: Option<String>,
}

impl S3Connector {
    /// Create a connector; an empty proxy string counts as no proxy
    pub fn new(sdk_config: &aws_config::SdkConfig, http_proxy: Option<&str>) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
            http_proxy: http_proxy
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        }
    }

    /// Proxy every client is routed through, if any
    pub fn http_proxy(&self) -> Option<&str> {
        self.http_proxy.as_deref()
    }
}

impl StoreConnector for S3Connector {
    type Store = S3Store;

    fn connect(&self, credentials: TemporaryCredentials) -> Result<S3Store> {
        let mut s3_config = aws_sdk_s3::config::Builder::from(&self.sdk_config)
            .credentials_provider(aws_credential_types::Credentials::from(credentials))
            .force_path_style(FORCE_PATH_STYLE);

        if let Some(ref proxy) = self.http_proxy {
            s3_config = s3_config.http_client(proxied_http_client(proxy)?);
        }

        tracing::debug!("Built S3 client (path style, proxy: {:?})", self.http_proxy);
        Ok(S3Store::new(aws_sdk_s3::Client::from_conf(s3_config.build())))
    }
}
