// Per-element decoding of fetched sample arrays.
// A sample with a bad timestamp or shape is dropped on its own instead of
// failing the whole batch or sorting as garbage later.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSample {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Decoded<R> {
    pub records: Vec<R>,
    pub rejected: Vec<RejectedSample>,
}

pub fn decode_samples<R: DeserializeOwned>(items: Vec<serde_json::Value>) -> Decoded<R> {
    let mut records = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<R>(item) {
            Ok(r) => records.push(r),
            Err(e) => {
                tracing::warn!(index, error = %e, operation = "decode_samples", "sample rejected");
                rejected.push(RejectedSample {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    Decoded { records, rejected }
}
