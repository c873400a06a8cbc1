//! Tencent Cloud PrivateDNS backend.

pub mod client;
pub mod error;
pub mod types;

pub use client::{TencentCloudClient, TencentCloudConfig, DEFAULT_ENDPOINT};
pub use error::TencentCloudError;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::backend::DnsBackend;
use crate::config::BackendConfig;
use crate::error::{BackendError, Error};
use crate::reconcile::{RecordApi, Reconciler};
use crate::record::{RecordName, RecordSet};

pub const TYPE_ID: &str = "tencentcloud-private";

pub fn build(cfg: &BackendConfig) -> Result<Arc<dyn DnsBackend>, Error> {
    let creds = cfg.tencentcloud.as_ref().ok_or_else(|| {
        Error::InvalidCredentials(format!("backend {}: tencentcloud block missing", cfg.name))
    })?;
    if creds.secret_id.is_empty() || creds.secret_key.is_empty() {
        return Err(Error::InvalidCredentials(format!(
            "backend {}: secretId/secretKey must be set",
            cfg.name
        )));
    }
    if cfg.zone_id.is_empty() {
        return Err(Error::ZoneNotFound(format!(
            "backend {}: zone_id must be set",
            cfg.name
        )));
    }

    info!(
        "Creating tencentcloud private DNS backend: name={}, domain={}",
        cfg.name, cfg.domain
    );
    let client = TencentCloudClient::new(TencentCloudConfig {
        secret_id: creds.secret_id.clone(),
        secret_key: creds.secret_key.clone(),
        zone_id: cfg.zone_id.clone(),
        endpoint: DEFAULT_ENDPOINT.to_string(),
    })
    .map_err(|e| Error::Config(format!("backend {}: {e}", cfg.name)))?;
    Ok(Arc::new(Reconciler::new(cfg, client)))
}

/// PrivateDNS addresses records by the zone-relative subdomain, so the
/// engine's relative host is what goes over the wire.
#[async_trait]
impl RecordApi for TencentCloudClient {
    async fn list_records(&self, name: &RecordName) -> Result<Vec<RecordSet>, BackendError> {
        let records = self.describe(&name.host).await?;
        Ok(records.into_iter().map(RecordSet::from).collect())
    }

    async fn create_record(
        &self,
        name: &RecordName,
        rtype: &str,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<String, BackendError> {
        let value = values.first().map(String::as_str).unwrap_or_default();
        Ok(self.create(&name.host, rtype, ttl, value).await?)
    }

    async fn update_record(
        &self,
        id: &str,
        name: &RecordName,
        rtype: &str,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<(), BackendError> {
        let value = values.first().map(String::as_str).unwrap_or_default();
        Ok(self.modify(id, &name.host, rtype, ttl, value).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Converge;
    use crate::config::TencentCloudCredentials;
    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config() -> BackendConfig {
        BackendConfig {
            tencentcloud: Some(TencentCloudCredentials {
                secret_id: "AKIDXXXX".to_string(),
                secret_key: "KEYXXXX".to_string(),
            }),
            ..BackendConfig::default()
        }
    }

    fn reconciler(endpoint: String) -> Reconciler<TencentCloudClient> {
        let cfg = config();
        let client = TencentCloudClient::new(TencentCloudConfig {
            secret_id: "AKIDXXXX".to_string(),
            secret_key: "KEYXXXX".to_string(),
            zone_id: cfg.zone_id.clone(),
            endpoint,
        })
        .unwrap();
        Reconciler::new(&cfg, client)
    }

    #[test]
    fn test_build_requires_credentials() {
        let cfg = BackendConfig {
            tencentcloud: None,
            ..BackendConfig::default()
        };
        assert_matches!(build(&cfg), Err(Error::InvalidCredentials(_)));
    }

    #[test]
    fn test_build_rejects_empty_secret() {
        let cfg = BackendConfig {
            tencentcloud: Some(TencentCloudCredentials {
                secret_id: String::new(),
                secret_key: "KEYXXXX".to_string(),
            }),
            ..BackendConfig::default()
        };
        assert_matches!(build(&cfg), Err(Error::InvalidCredentials(_)));
    }

    #[test]
    fn test_build_succeeds() {
        let backend = build(&config()).unwrap();
        assert_eq!(backend.name(), "test-backend");
    }

    #[tokio::test]
    async fn test_converge_updates_by_record_id() {
        let server = MockServer::start_async().await;
        let describe_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("X-TC-Action", "DescribePrivateZoneRecordList");
                then.status(200).json_body(json!({
                    "Response": {
                        "RecordSet": [{
                            "RecordId": "123",
                            "SubDomain": "mymaster",
                            "RecordType": "A",
                            "RecordValue": "10.0.0.1",
                            "TTL": 60
                        }],
                        "RequestId": "req-1"
                    }
                }));
            })
            .await;
        let modify_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("X-TC-Action", "ModifyPrivateZoneRecord")
                    .json_body_partial(
                        r#"{ "RecordId": "123", "SubDomain": "mymaster", "RecordValue": "10.0.0.2" }"#,
                    );
                then.status(200)
                    .json_body(json!({ "Response": { "RequestId": "req-2" } }));
            })
            .await;

        let outcome = reconciler(server.url(""))
            .converge("mymaster", "10.0.0.2")
            .await
            .unwrap();
        describe_mock.assert_async().await;
        modify_mock.assert_async().await;
        assert_eq!(outcome, Converge::Updated);
    }

    #[tokio::test]
    async fn test_converge_creates_when_absent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("X-TC-Action", "DescribePrivateZoneRecordList");
                then.status(200).json_body(json!({
                    "Response": { "RecordSet": [], "RequestId": "req-1" }
                }));
            })
            .await;
        let create_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("X-TC-Action", "CreatePrivateZoneRecord");
                then.status(200).json_body(json!({
                    "Response": { "RecordId": "789", "RequestId": "req-2" }
                }));
            })
            .await;

        let outcome = reconciler(server.url(""))
            .converge("mymaster", "10.0.0.2")
            .await
            .unwrap();
        create_mock.assert_async().await;
        assert_eq!(outcome, Converge::Created);
    }
}
