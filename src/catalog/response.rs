//! Catalog response envelope.
//!
//! The service answers `{ success, data }` where `data` is sometimes an array
//! of records and sometimes a map of id -> record, depending on how the
//! payload was assembled upstream. Both shapes are coerced to a record array
//! here, before any other processing runs.

use crate::RawRecord;
use serde::Deserialize;
use serde_json::Value;

/// Wire envelope for every catalog endpoint
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<DataPayload>,
}

/// Array-or-map payload variant
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DataPayload {
    Records(Vec<RawRecord>),
    Keyed(serde_json::Map<String, Value>),
}

impl CatalogResponse {
    /// Coerce the payload into an array of raw records.
    ///
    /// Map payloads contribute their values in key order; non-object values
    /// are dropped. An absent payload yields an empty array.
    pub fn into_records(self) -> Vec<RawRecord> {
        match self.data {
            None => Vec::new(),
            Some(DataPayload::Records(records)) => records,
            Some(DataPayload::Keyed(map)) => map
                .into_iter()
                .filter_map(|(_, value)| match value {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
        }
    }
}
