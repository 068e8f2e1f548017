//! Configuration facade
//!
//! Holds the settings loaded at startup and answers stateless queries.
//! Every storage operation assumes the role again and builds a fresh
//! client; nothing derived from credentials is cached.

use crate::auth::{AssumeRoleRequest, StsTokenService, TemporaryCredentials, TokenService};
use crate::config::{load_sdk_config, EffectiveSettings, Settings};
use crate::error::Result;
use crate::output::{Accent, Printer};
use crate::storage::{BucketSummary, ObjectStore, ObjectSummary, S3Connector, StoreConnector};
use std::io::Write;
use std::sync::Arc;

/// Facade over the token service and the storage client
pub struct Taxi<T = StsTokenService, C = S3Connector> {
    settings: Arc<Settings>,
    effective: EffectiveSettings,
    token_service: T,
    connector: C,
}

impl Taxi {
    /// Build the production facade: shared SDK config, STS token service
    /// and S3 connector, all derived from `settings`.
    pub async fn load(settings: Arc<Settings>) -> Self {
        let sdk_config = load_sdk_config(&settings.storage).await;
        let effective = EffectiveSettings::from_sdk_config(&sdk_config, &settings.storage);
        let token_service = StsTokenService::new(&sdk_config);
        let connector = S3Connector::new(&sdk_config, settings.storage.http_proxy.as_deref());

        Self {
            settings,
            effective,
            token_service,
            connector,
        }
    }
}

impl<T: TokenService, C: StoreConnector> Taxi<T, C> {
    /// Build a facade over arbitrary collaborators
    pub fn with_services(settings: Arc<Settings>, token_service: T, connector: C) -> Self {
        let effective = EffectiveSettings::from_storage(&settings.storage);
        Self {
            settings,
            effective,
            token_service,
            connector,
        }
    }

    /// Loaded settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings as applied to the SDK
    pub fn effective_settings(&self) -> &EffectiveSettings {
        &self.effective
    }

    /// Print the SFTP settings, the AWS settings and the effective SDK settings
    pub fn print<W: Write>(&self, printer: &mut Printer<W>) -> Result<()> {
        printer.header("+ SFTP Config", Accent::Blue)?;
        printer.value(&self.settings.transfer)?;
        if let Some(address) = self.settings.transfer.address() {
            printer.field("address", &address)?;
        }
        printer.header("+ AWS Config", Accent::Yellow)?;
        printer.value(&self.settings.storage)?;
        printer.header("= AWS Settings (effective)", Accent::Yellow)?;
        printer.value(&self.effective)?;
        printer.flush()
    }

    /// Assume the configured role with the fixed session name, duration and tags
    pub async fn assume_role(&self) -> Result<TemporaryCredentials> {
        let request = AssumeRoleRequest::for_role(self.settings.storage.role_arn.as_deref());
        self.token_service.assume_role(&request).await
    }

    /// Assume the role and build a storage client bound to the new credentials
    pub async fn storage_client(&self) -> Result<C::Store> {
        let credentials = self.assume_role().await?;
        self.connector.connect(credentials)
    }

    /// List a bucket and print one line per object
    pub async fn list_objects<W: Write>(
        &self,
        bucket: &str,
        printer: &mut Printer<W>,
    ) -> Result<Vec<ObjectSummary>> {
        printer.header(&format!("> AWS Bucket: ls {}", bucket), Accent::Yellow)?;
        let store = self.storage_client().await?;
        let objects = store.list_objects(bucket).await?;
        tracing::info!("Found {} objects in {}", objects.len(), bucket);

        printer.objects(&objects)?;
        printer.flush()?;
        Ok(objects)
    }

    /// List buckets and print them as name/creation date pairs
    pub async fn list_buckets<W: Write>(
        &self,
        printer: &mut Printer<W>,
    ) -> Result<Vec<BucketSummary>> {
        printer.header("> AWS Buckets", Accent::Yellow)?;
        let store = self.storage_client().await?;
        let buckets = store.list_buckets().await?;
        tracing::info!("Found {} buckets", buckets.len());

        printer.buckets(&buckets)?;
        printer.flush()?;
        Ok(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StorageSettings, TransferSettings};
    use crate::error::TaxiError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/taxi-reader";

    #[derive(Debug, PartialEq)]
    struct AccessDenied;

    impl fmt::Display for AccessDenied {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("AccessDenied: not authorized to perform sts:AssumeRole")
        }
    }

    impl std::error::Error for AccessDenied {}

    /// Token service double recording every request
    #[derive(Default)]
    struct RecordingTokenService {
        calls: AtomicUsize,
        requests: Mutex<Vec<AssumeRoleRequest>>,
        deny: bool,
    }

    impl RecordingTokenService {
        fn denying() -> Self {
            Self {
                deny: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenService for RecordingTokenService {
        async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.requests.lock().unwrap().push(request.clone());
            if self.deny {
                return Err(TaxiError::assume_role(AccessDenied));
            }
            Ok(TemporaryCredentials {
                access_key_id: format!("ASIA{}", n),
                secret_access_key: "secret".to_string(),
                session_token: format!("token-{}", n),
                expiration: None,
            })
        }
    }

    /// Store double returning canned listings
    #[derive(Clone, Default)]
    struct CannedStore {
        credentials: Option<String>,
        buckets: Vec<BucketSummary>,
        objects: Vec<ObjectSummary>,
    }

    #[async_trait]
    impl ObjectStore for CannedStore {
        async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
            Ok(self.buckets.clone())
        }

        async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>> {
            if bucket != "mybucket" {
                return Err(TaxiError::storage("ListObjectsV2", "NoSuchBucket"));
            }
            Ok(self.objects.clone())
        }
    }

    #[derive(Default)]
    struct CannedConnector {
        template: CannedStore,
    }

    impl StoreConnector for CannedConnector {
        type Store = CannedStore;

        fn connect(&self, credentials: TemporaryCredentials) -> Result<CannedStore> {
            Ok(CannedStore {
                credentials: Some(credentials.access_key_id),
                ..self.template.clone()
            })
        }
    }

    fn settings() -> Arc<Settings> {
        Arc::new(Settings {
            storage: StorageSettings {
                role_arn: Some(ROLE_ARN.to_string()),
                region: Some("eu-central-1".to_string()),
                ..Default::default()
            },
            transfer: TransferSettings {
                user: Some("deploy".to_string()),
                host: Some("sftp.example.com".to_string()),
                port: Some("22".to_string()),
                key: None,
            },
        })
    }

    fn taxi(
        token_service: RecordingTokenService,
        template: CannedStore,
    ) -> Taxi<RecordingTokenService, CannedConnector> {
        Taxi::with_services(settings(), token_service, CannedConnector { template })
    }

    #[test]
    fn test_assume_role_request() {
        let taxi = taxi(RecordingTokenService::default(), CannedStore::default());
        let creds = tokio_test::block_on(taxi.assume_role()).unwrap();
        assert_eq!(creds.access_key_id, "ASIA1");

        let requests = taxi.token_service.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.role_arn.as_deref(), Some(ROLE_ARN));
        assert_eq!(request.duration_seconds, 1200);
        let keys: Vec<&str> = request.tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["client", "repository", "team"]);
        let values: Vec<&str> = request.tags.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["TAXI", "wirecard/taxi", "tecodc"]);
    }

    #[test]
    fn test_storage_client_is_never_cached() {
        let taxi = taxi(RecordingTokenService::default(), CannedStore::default());

        let first = tokio_test::block_on(taxi.storage_client()).unwrap();
        assert_eq!(taxi.token_service.calls(), 1);
        let second = tokio_test::block_on(taxi.storage_client()).unwrap();
        assert_eq!(taxi.token_service.calls(), 2);

        assert_eq!(first.credentials.as_deref(), Some("ASIA1"));
        assert_eq!(second.credentials.as_deref(), Some("ASIA2"));
    }

    #[test]
    fn test_access_denied_propagates_unchanged() {
        let taxi = taxi(RecordingTokenService::denying(), CannedStore::default());

        let err = match tokio_test::block_on(taxi.storage_client()) {
            Ok(_) => panic!("expected role assumption to fail"),
            Err(e) => e,
        };
        assert!(matches!(err, TaxiError::AssumeRole(_)));
        assert_eq!(err.downcast_service_error::<AccessDenied>(), Some(&AccessDenied));
        assert_eq!(taxi.token_service.calls(), 1);
    }

    #[test]
    fn test_listing_fails_when_role_is_denied() {
        let taxi = taxi(RecordingTokenService::denying(), CannedStore::default());
        let mut printer = Printer::plain(Vec::new());

        let err = tokio_test::block_on(taxi.list_buckets(&mut printer)).unwrap_err();
        assert!(err.downcast_service_error::<AccessDenied>().is_some());
    }

    #[test]
    fn test_list_buckets_projects_name_and_creation_date() {
        let t1 = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let t2 = Utc.with_ymd_and_hms(2022, 8, 9, 10, 11, 12).unwrap();
        let template = CannedStore {
            buckets: vec![
                BucketSummary {
                    name: "a".to_string(),
                    creation_date: Some(t1),
                },
                BucketSummary {
                    name: "b".to_string(),
                    creation_date: Some(t2),
                },
            ],
            ..Default::default()
        };
        let taxi = taxi(RecordingTokenService::default(), template);
        let mut printer = Printer::plain(Vec::new());

        let buckets = tokio_test::block_on(taxi.list_buckets(&mut printer)).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].name, "a");
        assert_eq!(buckets[1].creation_date, Some(t2));

        let out = String::from_utf8(printer.into_inner()).unwrap();
        let (header, body) = out.split_once('\n').unwrap();
        assert_eq!(header, "> AWS Buckets");

        let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            let mut keys: Vec<&String> = entry.as_object().unwrap().keys().collect();
            keys.sort();
            assert_eq!(keys, vec!["creation_date", "name"]);
        }
        assert_eq!(entries[1]["name"], "b");
        assert_eq!(entries[0]["creation_date"], "2021-03-04T05:06:07Z");
    }

    #[test]
    fn test_list_objects_prints_tab_separated_lines() {
        let t = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let template = CannedStore {
            objects: vec![ObjectSummary {
                key: "foo.txt".to_string(),
                size: 42,
                last_modified: Some(t),
            }],
            ..Default::default()
        };
        let taxi = taxi(RecordingTokenService::default(), template);
        let mut printer = Printer::plain(Vec::new());

        let objects = tokio_test::block_on(taxi.list_objects("mybucket", &mut printer)).unwrap();
        assert_eq!(objects.len(), 1);

        let out = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "> AWS Bucket: ls mybucket");
        assert_eq!(lines[1], format!("{}\t42\tfoo.txt", t));
        assert_eq!(lines[1], "2024-02-29 12:00:00 UTC\t42\tfoo.txt");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_list_objects_error_is_not_translated() {
        let taxi = taxi(RecordingTokenService::default(), CannedStore::default());
        let mut printer = Printer::plain(Vec::new());

        let err = tokio_test::block_on(taxi.list_objects("missing", &mut printer)).unwrap_err();
        assert!(matches!(err, TaxiError::Storage { operation: "ListObjectsV2", .. }));
        assert_eq!(err.to_string(), "S3 ListObjectsV2 failed: NoSuchBucket");
    }

    #[test]
    fn test_print_has_three_sections() {
        let taxi = taxi(RecordingTokenService::default(), CannedStore::default());
        let mut printer = Printer::plain(Vec::new());
        taxi.print(&mut printer).unwrap();

        let out = String::from_utf8(printer.into_inner()).unwrap();
        let sftp = out.find("+ SFTP Config").unwrap();
        let aws = out.find("+ AWS Config").unwrap();
        let effective = out.find("= AWS Settings (effective)").unwrap();
        assert!(sftp < aws && aws < effective);
        assert!(out.contains("sftp.example.com"));
        assert!(out.contains("address: deploy@sftp.example.com:22\n"));
        assert!(out[sftp..aws].contains("address:"));
        assert!(out.contains(ROLE_ARN));
        assert!(out.contains("\"signature_version\": \"v2\""));
        assert_eq!(taxi.token_service.calls(), 0);
    }

    #[test]
    fn test_print_skips_address_without_host() {
        let taxi = Taxi::with_services(
            Arc::new(Settings::default()),
            RecordingTokenService::default(),
            CannedConnector::default(),
        );
        let mut printer = Printer::plain(Vec::new());
        taxi.print(&mut printer).unwrap();

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert!(!out.contains("address:"));
    }

    #[test]
    fn test_settings_are_shared_not_copied() {
        let shared = settings();
        let taxi = Taxi::with_services(
            Arc::clone(&shared),
            RecordingTokenService::default(),
            CannedConnector::default(),
        );
        assert!(std::ptr::eq(taxi.settings(), shared.as_ref()));
        assert_eq!(
            taxi.effective_settings().region.as_deref(),
            Some("eu-central-1")
        );
    }
}
