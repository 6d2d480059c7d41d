//! Raw post records as returned by the upstream results source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One post/video's metrics exactly as the upstream returned it.
///
/// The upstream shape varies between platforms and API versions, so the record
/// is kept as untyped JSON and read through the extractors in
/// [`crate::domain::analytics::extract`]. Missing fields are never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPostRecord(pub Value);

impl RawPostRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawPostRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One page of raw post records plus the upstream's total count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsPage {
    pub records: Vec<RawPostRecord>,
    pub total: u64,
}

impl ResultsPage {
    pub fn new(records: Vec<RawPostRecord>, total: u64) -> Self {
        Self { records, total }
    }
}
