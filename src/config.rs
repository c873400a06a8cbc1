use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sentinel: SentinelConfig,
    #[serde(rename = "dns-providers", default)]
    pub dns_providers: Vec<ProviderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentinelConfig {
    #[serde(default)]
    pub name: String,
    /// Comma-separated list accepted; only the first address is used.
    pub host: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub master_name: Vec<String>,
}

impl SentinelConfig {
    pub fn primary_addr(&self) -> &str {
        self.host.split(',').next().unwrap_or("").trim()
    }
}

/// One `dns-providers` entry as it appears in the YAML file. Mirrors the
/// operator-facing shape; `BackendConfig` is the validated form.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub domain: String,
    pub zone_id: String,
    #[serde(default)]
    pub record: Vec<RecordEntry>,
    #[serde(default)]
    pub huaweicloud: Option<HuaweiCloudCredentials>,
    #[serde(default)]
    pub tencentcloud: Option<TencentCloudCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordEntry {
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuaweiCloudCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TencentCloudCredentials {
    #[serde(rename = "secretId")]
    pub secret_id: String,
    #[serde(rename = "secretKey")]
    pub secret_key: String,
}

/// Validated per-backend configuration, owned read-only by the backend for
/// its lifetime.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub name: String,
    pub backend_type: String,
    pub domain: String,
    pub zone_id: String,
    pub record_type: String,
    pub ttl: u32,
    pub huaweicloud: Option<HuaweiCloudCredentials>,
    pub tencentcloud: Option<TencentCloudCredentials>,
}

impl TryFrom<&ProviderEntry> for BackendConfig {
    type Error = Error;

    fn try_from(entry: &ProviderEntry) -> Result<Self, Error> {
        let record = entry.record.first().ok_or_else(|| {
            Error::InvalidRecordConfig(format!("provider {}: record list is empty", entry.name))
        })?;
        if record.rtype.is_empty() {
            return Err(Error::InvalidRecordConfig(format!(
                "provider {}: record type is empty",
                entry.name
            )));
        }
        if record.ttl == 0 {
            return Err(Error::InvalidRecordConfig(format!(
                "provider {}: record ttl must be positive",
                entry.name
            )));
        }
        Ok(BackendConfig {
            name: entry.name.clone(),
            backend_type: entry.provider_type.clone(),
            domain: entry.domain.clone(),
            zone_id: entry.zone_id.clone(),
            record_type: record.rtype.clone(),
            ttl: record.ttl,
            huaweicloud: entry.huaweicloud.clone(),
            tencentcloud: entry.tencentcloud.clone(),
        })
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, Error> {
        serde_yaml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }
}

pub(crate) mod mock {
    use super::*;

    impl Default for BackendConfig {
        fn default() -> Self {
            BackendConfig {
                name: String::from("test-backend"),
                backend_type: String::from("huaweicloud-private"),
                domain: String::from("example.com"),
                zone_id: String::from("zone-1"),
                record_type: String::from("A"),
                ttl: 60,
                huaweicloud: None,
                tencentcloud: None,
            }
        }
    }
}
