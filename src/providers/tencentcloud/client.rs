use std::time::Duration;

use chrono::Utc;
use log::debug;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::providers::sign::{hmac_sha256, hmac_sha256_hex, sha256_hex};
use crate::providers::tencentcloud::error::TencentCloudError;
use crate::providers::tencentcloud::types::*;

pub const DEFAULT_ENDPOINT: &str = "https://privatedns.tencentcloudapi.com";

const SERVICE: &str = "privatedns";
const API_VERSION: &str = "2020-10-28";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

#[derive(Debug)]
pub struct TencentCloudConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub zone_id: String,
    /// Fixed API endpoint, overridable for tests.
    pub endpoint: String,
}

#[derive(Debug)]
pub struct TencentCloudClient {
    config: TencentCloudConfig,
    client: Client,
    host: String,
}

impl TencentCloudClient {
    pub fn new(config: TencentCloudConfig) -> Result<Self, TencentCloudError> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| TencentCloudError::Endpoint(format!("{}: {e}", config.endpoint)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(TencentCloudError::Endpoint(config.endpoint.clone())),
        };
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            config,
            client,
            host,
        })
    }

    /// List the zone's records for one subdomain. The API filter can match
    /// loosely; only exact `SubDomain` matches are returned.
    pub async fn describe(&self, host: &str) -> Result<Vec<PrivateZoneRecord>, TencentCloudError> {
        let payload = json!({
            "ZoneId": self.config.zone_id,
            "Filters": [{ "Name": "SubDomain", "Values": [host] }],
        });
        let result: DescribeRecordListResult =
            self.call("DescribePrivateZoneRecordList", payload).await?;
        Ok(result
            .record_set
            .into_iter()
            .filter(|record| record.sub_domain == host)
            .collect())
    }

    pub async fn create(
        &self,
        host: &str,
        rtype: &str,
        ttl: u32,
        value: &str,
    ) -> Result<String, TencentCloudError> {
        let payload = json!({
            "ZoneId": self.config.zone_id,
            "SubDomain": host,
            "RecordType": rtype,
            "RecordValue": value,
            "TTL": ttl,
        });
        let result: CreateRecordResult = self.call("CreatePrivateZoneRecord", payload).await?;
        Ok(result.record_id)
    }

    pub async fn modify(
        &self,
        record_id: &str,
        host: &str,
        rtype: &str,
        ttl: u32,
        value: &str,
    ) -> Result<(), TencentCloudError> {
        let payload = json!({
            "ZoneId": self.config.zone_id,
            "RecordId": record_id,
            "SubDomain": host,
            "RecordType": rtype,
            "RecordValue": value,
            "TTL": ttl,
        });
        let _: Value = self.call("ModifyPrivateZoneRecord", payload).await?;
        Ok(())
    }

    /// POST one API action. Errors come back inside the `Response` envelope
    /// with HTTP 200, so the envelope is checked before deserializing.
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: Value,
    ) -> Result<T, TencentCloudError> {
        let body = payload.to_string();
        let now = Utc::now();
        let timestamp = now.timestamp();
        let date = now.format("%Y-%m-%d").to_string();
        let authorization = self.sign(&body, timestamp, &date);

        debug!("tencentcloud {action} {}", self.config.endpoint);
        let response = self
            .client
            .post(self.config.endpoint.as_str())
            .header("Content-Type", CONTENT_TYPE)
            .header("Authorization", authorization)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", API_VERSION)
            .body(body)
            .send()
            .await?;

        let envelope: Value = response.json().await?;
        let result = envelope.get("Response").cloned().unwrap_or(Value::Null);
        if let Some(error) = result.get("Error") {
            let error: ApiErrorBody = serde_json::from_value(error.clone()).unwrap_or_default();
            return Err(TencentCloudError::Api {
                code: error.code,
                message: error.message,
            });
        }
        Ok(serde_json::from_value(result)?)
    }

    /// `TC3-HMAC-SHA256` request signature.
    fn sign(&self, body: &str, timestamp: i64, date: &str) -> String {
        let canonical_headers = format!("content-type:{CONTENT_TYPE}\nhost:{}\n", self.host);
        let canonical_request = format!(
            "POST\n/\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{}",
            sha256_hex(body.as_bytes())
        );
        let credential_scope = format!("{date}/{SERVICE}/tc3_request");
        let string_to_sign = format!(
            "TC3-HMAC-SHA256\n{timestamp}\n{credential_scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(
            format!("TC3{}", self.config.secret_key).as_bytes(),
            date.as_bytes(),
        );
        let secret_service = hmac_sha256(&secret_date, SERVICE.as_bytes());
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
        let signature = hmac_sha256_hex(&secret_signing, string_to_sign.as_bytes());

        format!(
            "TC3-HMAC-SHA256 Credential={}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.config.secret_id
        )
    }
}
