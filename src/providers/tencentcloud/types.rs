use serde::Deserialize;

use crate::record::RecordSet;

/// One record of a private zone. Each record holds a single value; multiple
/// values for one name arrive as separate records.
#[derive(Deserialize, Debug, Clone)]
pub struct PrivateZoneRecord {
    #[serde(rename = "RecordId")]
    pub record_id: Option<String>,
    #[serde(rename = "SubDomain")]
    pub sub_domain: String,
    #[serde(rename = "RecordType")]
    pub record_type: String,
    #[serde(rename = "RecordValue")]
    pub record_value: String,
    #[serde(rename = "TTL")]
    pub ttl: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DescribeRecordListResult {
    #[serde(rename = "RecordSet", default)]
    pub record_set: Vec<PrivateZoneRecord>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateRecordResult {
    #[serde(rename = "RecordId", default)]
    pub record_id: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ApiErrorBody {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl From<PrivateZoneRecord> for RecordSet {
    fn from(record: PrivateZoneRecord) -> Self {
        RecordSet {
            id: record.record_id,
            name: record.sub_domain,
            rtype: record.record_type,
            ttl: record.ttl,
            values: vec![record.record_value],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recordset_mapping() {
        let record = PrivateZoneRecord {
            record_id: Some("123".to_string()),
            sub_domain: "mymaster".to_string(),
            record_type: "A".to_string(),
            record_value: "10.0.0.1".to_string(),
            ttl: Some(60),
        };
        let rs = RecordSet::from(record);
        assert_eq!(rs.id.as_deref(), Some("123"));
        assert_eq!(rs.name, "mymaster");
        assert_eq!(rs.values, vec!["10.0.0.1"]);
    }
}
