use serde::{Deserialize, Serialize};

use crate::record::RecordSet;

#[derive(Deserialize, Debug)]
pub struct ListRecordSetsResponse {
    #[serde(default)]
    pub recordsets: Vec<ApiRecordSet>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiRecordSet {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: Option<u32>,
    #[serde(default)]
    pub records: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct CreateRecordSetRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub rtype: &'a str,
    pub ttl: u32,
    pub records: &'a [String],
}

#[derive(Serialize, Debug)]
pub struct UpdateRecordSetRequest<'a> {
    #[serde(rename = "type")]
    pub rtype: &'a str,
    pub ttl: u32,
    pub records: &'a [String],
}

#[derive(Deserialize, Debug)]
pub struct CreateRecordSetResponse {
    #[serde(default)]
    pub id: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl From<ApiRecordSet> for RecordSet {
    fn from(rs: ApiRecordSet) -> Self {
        RecordSet {
            id: rs.id,
            // Zone data comes back fully qualified, with the trailing dot.
            name: rs.name.trim_end_matches('.').to_string(),
            rtype: rs.rtype,
            ttl: rs.ttl,
            values: rs.records,
        }
    }
}
