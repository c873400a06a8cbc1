/// A record name as seen by a backend. Vendors address records differently:
/// some by fully-qualified name, some by the zone-relative label, so both
/// forms are carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordName {
    pub host: String,
    pub domain: String,
}

impl RecordName {
    pub fn new(host: &str, domain: &str) -> Self {
        Self {
            host: host.to_string(),
            domain: domain.to_string(),
        }
    }

    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.host, self.domain)
    }
}

/// A backend's current authoritative state for one record name. Always
/// re-fetched before a convergence attempt; the record may have been changed
/// out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Backend-assigned identifier, stable across value changes. Updates are
    /// keyed by this, never re-derived from the name.
    pub id: Option<String>,
    pub name: String,
    pub rtype: String,
    pub ttl: Option<u32>,
    pub values: Vec<String>,
}

impl RecordSet {
    /// True when this record already holds exactly the target state.
    pub fn is_converged(&self, rtype: &str, ttl: u32, address: &str) -> bool {
        self.rtype == rtype
            && self.ttl == Some(ttl)
            && self.values.len() == 1
            && self.values[0] == address
    }
}
