//! Huawei Cloud private zone backend.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HuaweiCloudClient, HuaweiCloudConfig};
pub use error::HuaweiCloudError;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::backend::DnsBackend;
use crate::config::BackendConfig;
use crate::error::{BackendError, Error};
use crate::reconcile::{RecordApi, Reconciler};
use crate::record::{RecordName, RecordSet};

pub const TYPE_ID: &str = "huaweicloud-private";

/// Registered constructor: validate the entry, build the authenticated
/// client, wrap it in the shared reconciler.
pub fn build(cfg: &BackendConfig) -> Result<Arc<dyn DnsBackend>, Error> {
    let creds = cfg.huaweicloud.as_ref().ok_or_else(|| {
        Error::InvalidCredentials(format!("backend {}: huaweicloud block missing", cfg.name))
    })?;
    if creds.access_key.is_empty() || creds.secret_key.is_empty() {
        return Err(Error::InvalidCredentials(format!(
            "backend {}: access/secret key must be set",
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
        "Creating huaweicloud private DNS backend: name={}, domain={}",
        cfg.name, cfg.domain
    );
    let client = HuaweiCloudClient::new(HuaweiCloudConfig {
        access_key: creds.access_key.clone(),
        secret_key: creds.secret_key.clone(),
        zone_id: cfg.zone_id.clone(),
        endpoint: format!("https://dns.{}.myhuaweicloud.com", creds.region),
    })
    .map_err(|e| Error::Config(format!("backend {}: {e}", cfg.name)))?;
    Ok(Arc::new(Reconciler::new(cfg, client)))
}

#[async_trait]
impl RecordApi for HuaweiCloudClient {
    async fn list_records(&self, name: &RecordName) -> Result<Vec<RecordSet>, BackendError> {
        let records = self.list(&name.fqdn()).await?;
        Ok(records.into_iter().map(RecordSet::from).collect())
    }

    async fn create_record(
        &self,
        name: &RecordName,
        rtype: &str,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<String, BackendError> {
        Ok(self.create(&name.fqdn(), rtype, ttl, &values).await?)
    }

    async fn update_record(
        &self,
        id: &str,
        _name: &RecordName,
        rtype: &str,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<(), BackendError> {
        Ok(self.update(id, rtype, ttl, &values).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Converge;
    use crate::config::HuaweiCloudCredentials;
    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config() -> BackendConfig {
        BackendConfig {
            huaweicloud: Some(HuaweiCloudCredentials {
                access_key: "AKXXXX".to_string(),
                secret_key: "SKXXXX".to_string(),
                region: "cn-north-4".to_string(),
            }),
            ..BackendConfig::default()
        }
    }

    fn reconciler(endpoint: String) -> Reconciler<HuaweiCloudClient> {
        let cfg = config();
        let client = HuaweiCloudClient::new(HuaweiCloudConfig {
            access_key: "AKXXXX".to_string(),
            secret_key: "SKXXXX".to_string(),
            zone_id: cfg.zone_id.clone(),
            endpoint,
        })
        .unwrap();
        Reconciler::new(&cfg, client)
    }

    #[test]
    fn test_build_requires_credentials() {
        let cfg = BackendConfig {
            huaweicloud: None,
            ..BackendConfig::default()
        };
        assert_matches!(build(&cfg), Err(Error::InvalidCredentials(_)));
    }

    #[test]
    fn test_build_requires_zone() {
        let cfg = BackendConfig {
            zone_id: String::new(),
            ..config()
        };
        assert_matches!(build(&cfg), Err(Error::ZoneNotFound(_)));
    }

    #[test]
    fn test_build_succeeds() {
        let backend = build(&config()).unwrap();
        assert_eq!(backend.name(), "test-backend");
    }

    #[tokio::test]
    async fn test_converge_creates_when_absent() {
        let server = MockServer::start_async().await;
        let list_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/zones/zone-1/recordsets")
                    .query_param("name", "mymaster.example.com");
                then.status(200).json_body(json!({ "recordsets": [] }));
            })
            .await;
        let create_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/zones/zone-1/recordsets");
                then.status(202).json_body(json!({ "id": "rec-new" }));
            })
            .await;

        let outcome = reconciler(server.url(""))
            .converge("mymaster", "10.0.0.2")
            .await
            .unwrap();
        list_mock.assert_async().await;
        create_mock.assert_async().await;
        assert_eq!(outcome, Converge::Created);
    }

    #[tokio::test]
    async fn test_converge_updates_existing_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/zones/zone-1/recordsets");
                then.status(200).json_body(json!({
                    "recordsets": [{
                        "id": "ff80",
                        "name": "mymaster.example.com.",
                        "type": "A",
                        "ttl": 60,
                        "records": ["10.0.0.1"]
                    }]
                }));
            })
            .await;
        let update_mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v2/zones/zone-1/recordsets/ff80")
                    .json_body(json!({
                        "type": "A",
                        "ttl": 60,
                        "records": ["10.0.0.2"]
                    }));
                then.status(200).json_body(json!({ "id": "ff80" }));
            })
            .await;

        let outcome = reconciler(server.url(""))
            .converge("mymaster", "10.0.0.2")
            .await
            .unwrap();
        update_mock.assert_async().await;
        assert_eq!(outcome, Converge::Updated);
    }
}
