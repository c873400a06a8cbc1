use std::time::Duration;

use chrono::Utc;
use log::debug;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;

use crate::providers::huaweicloud::error::HuaweiCloudError;
use crate::providers::huaweicloud::types::*;
use crate::providers::sign::{hmac_sha256_hex, sha256_hex, uri_encode};

const SIGNED_HEADERS: &str = "content-type;host;x-sdk-date";

#[derive(Debug)]
pub struct HuaweiCloudConfig {
    pub access_key: String,
    pub secret_key: String,
    pub zone_id: String,
    /// `https://dns.{region}.myhuaweicloud.com`, overridable for tests.
    pub endpoint: String,
}

#[derive(Debug)]
pub struct HuaweiCloudClient {
    config: HuaweiCloudConfig,
    client: Client,
    host: String,
}

impl HuaweiCloudClient {
    pub fn new(config: HuaweiCloudConfig) -> Result<Self, HuaweiCloudError> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| HuaweiCloudError::Endpoint(format!("{}: {e}", config.endpoint)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(HuaweiCloudError::Endpoint(config.endpoint.clone())),
        };
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            config,
            client,
            host,
        })
    }

    pub async fn list(&self, fqdn: &str) -> Result<Vec<ApiRecordSet>, HuaweiCloudError> {
        let path = format!("/v2/zones/{}/recordsets", self.config.zone_id);
        let query = [("name", fqdn), ("search_mode", "equal")];
        let response: ListRecordSetsResponse =
            self.request(Method::GET, &path, &query, None).await?;
        Ok(response.recordsets)
    }

    pub async fn create(
        &self,
        fqdn: &str,
        rtype: &str,
        ttl: u32,
        records: &[String],
    ) -> Result<String, HuaweiCloudError> {
        let path = format!("/v2/zones/{}/recordsets", self.config.zone_id);
        let body = serde_json::to_string(&CreateRecordSetRequest {
            name: fqdn,
            rtype,
            ttl,
            records,
        })?;
        let response: CreateRecordSetResponse =
            self.request(Method::POST, &path, &[], Some(body)).await?;
        Ok(response.id)
    }

    pub async fn update(
        &self,
        record_id: &str,
        rtype: &str,
        ttl: u32,
        records: &[String],
    ) -> Result<(), HuaweiCloudError> {
        let path = format!(
            "/v2/zones/{}/recordsets/{record_id}",
            self.config.zone_id
        );
        let body = serde_json::to_string(&UpdateRecordSetRequest {
            rtype,
            ttl,
            records,
        })?;
        let _: serde_json::Value = self.request(Method::PUT, &path, &[], Some(body)).await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<T, HuaweiCloudError> {
        let body = body.unwrap_or_default();
        let (date, authorization) = self.sign(method.as_str(), path, query, &body);

        let url = format!("{}{path}", self.config.endpoint);
        debug!("huaweicloud {method} {url}");
        let mut request = self
            .client
            .request(method, url.as_str())
            .header("Content-Type", "application/json")
            .header("X-Sdk-Date", date)
            .header("Authorization", authorization);
        if !query.is_empty() {
            request = request.query(query);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        self.handle(request.send().await?).await
    }

    async fn handle<T: DeserializeOwned>(&self, response: Response) -> Result<T, HuaweiCloudError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let error: ApiErrorBody = response.json().await.unwrap_or_default();
        Err(HuaweiCloudError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        })
    }

    /// APIG `SDK-HMAC-SHA256` request signature.
    fn sign(&self, method: &str, path: &str, query: &[(&str, &str)], body: &str) -> (String, String) {
        let date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut pairs: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (uri_encode(k), uri_encode(v)))
            .collect();
        pairs.sort();
        let canonical_query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        // The canonical URI carries a trailing slash; the request path does not.
        let canonical_uri = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        let canonical_headers = format!(
            "content-type:application/json\nhost:{}\nx-sdk-date:{date}\n",
            self.host
        );
        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{SIGNED_HEADERS}\n{}",
            sha256_hex(body.as_bytes())
        );
        let string_to_sign = format!(
            "SDK-HMAC-SHA256\n{date}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );
        let signature =
            hmac_sha256_hex(self.config.secret_key.as_bytes(), string_to_sign.as_bytes());
        let authorization = format!(
            "SDK-HMAC-SHA256 Access={}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.config.access_key
        );
        (date, authorization)
    }
}
