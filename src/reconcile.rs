use async_trait::async_trait;
use log::{info, warn};
#[cfg(test)]
use mockall::automock;

use crate::backend::{Converge, DnsBackend};
use crate::config::BackendConfig;
use crate::error::{BackendError, Error};
use crate::record::{RecordName, RecordSet};

/// Raw record-management surface of one vendor API: list, create, update.
/// No upsert; the reconciler builds the idempotent converge on top.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordApi: Send + Sync {
    async fn list_records(&self, name: &RecordName) -> Result<Vec<RecordSet>, BackendError>;

    async fn create_record(
        &self,
        name: &RecordName,
        rtype: &str,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<String, BackendError>;

    async fn update_record(
        &self,
        id: &str,
        name: &RecordName,
        rtype: &str,
        ttl: u32,
        values: Vec<String>,
    ) -> Result<(), BackendError>;
}

/// Drives the create-or-update sequence against one backend. Shared across
/// every vendor; only the `RecordApi` plumbing differs.
pub struct Reconciler<A> {
    name: String,
    domain: String,
    record_type: String,
    ttl: u32,
    api: A,
}

impl<A> std::fmt::Debug for Reconciler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("record_type", &self.record_type)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<A: RecordApi> Reconciler<A> {
    pub fn new(cfg: &BackendConfig, api: A) -> Self {
        Self {
            name: cfg.name.clone(),
            domain: cfg.domain.clone(),
            record_type: cfg.record_type.clone(),
            ttl: cfg.ttl,
            api,
        }
    }
}

#[async_trait]
impl<A: RecordApi> DnsBackend for Reconciler<A> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn converge(&self, host: &str, address: &str) -> Result<Converge, Error> {
        let name = RecordName::new(host, &self.domain);
        let fqdn = name.fqdn();

        // Never cached: the record may have been changed out-of-band.
        let records = self
            .api
            .list_records(&name)
            .await
            .map_err(Error::QueryFailed)?;

        let Some(existing) = records.first() else {
            info!("No existing record for {fqdn}, creating");
            let id = self
                .api
                .create_record(&name, &self.record_type, self.ttl, vec![address.to_string()])
                .await
                .map_err(Error::CreateFailed)?;
            info!("Created record {fqdn} -> {address} (id={id})");
            return Ok(Converge::Created);
        };

        if records.len() > 1 {
            // No defined tie-break; the first record returned wins.
            warn!(
                "{} records match {fqdn}, converging the first ({})",
                records.len(),
                existing.name
            );
        }

        let id = existing
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::RecordIdentifierMissing(fqdn.clone()))?;

        if existing.is_converged(&self.record_type, self.ttl, address) {
            info!("Record {fqdn} already resolves to {address}");
            return Ok(Converge::Unchanged);
        }

        self.api
            .update_record(id, &name, &self.record_type, self.ttl, vec![address.to_string()])
            .await
            .map_err(Error::UpdateFailed)?;
        info!("Updated record {fqdn} -> {address} (id={id})");
        Ok(Converge::Updated)
    }
}
