//! Shared AWS SDK configuration
//!
//! Applies the loaded storage settings (endpoint, region, static key pair)
//! to the SDK configuration every client is built from.

use super::StorageSettings;
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Provider name attached to the static key pair
const STATIC_PROVIDER_NAME: &str = "taxi-static";

/// Build the shared SDK configuration for the given storage settings.
///
/// Unset settings fall back to the SDK's own resolution chain.
pub async fn load_sdk_config(storage: &StorageSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(ref region) = storage.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(ref endpoint) = storage.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    if let (Some(ref key_id), Some(ref secret)) =
        (&storage.access_key_id, &storage.secret_access_key)
    {
        let creds = aws_credential_types::Credentials::new(
            key_id,
            secret,
            None, // session token
            None, // expiry
            STATIC_PROVIDER_NAME,
        );
        loader = loader.credentials_provider(creds);
    }

    let config = loader.load().await;
    tracing::debug!(
        "Loaded SDK config (region: {:?}, endpoint: {:?})",
        config.region(),
        config.endpoint_url()
    );
    config
}
