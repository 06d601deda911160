//! Locating and limiting records inside a decoded response.

use serde_json::Value;

use crate::endpoint::{ResultShape, PAYLOAD_KEY};

/// A finite, single-pass sequence of result records in response order.
///
/// Owns its records; once drained it stays empty.
#[derive(Debug)]
pub struct Records {
    inner: std::iter::Take<std::vec::IntoIter<Value>>,
}

impl Records {
    fn new(records: Vec<Value>, limit: Option<usize>) -> Self {
        Self {
            inner: records.into_iter().take(limit.unwrap_or(usize::MAX)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Treat the whole decoded document as the only record.
    pub fn single(document: Value) -> Self {
        Self::new(vec![document], None)
    }
}

impl Iterator for Records {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Records {}

/// Pull the records out of `document` at
/// `ABRPayloadSearchResults / response / list_key / record_key`.
///
/// A missing segment or a `null` node yields no records. A single object or
/// string (one matching element) yields one record.
pub fn extract_records(
    mut document: Value,
    list_key: &str,
    record_key: &str,
    limit: Option<usize>,
) -> Records {
    let node = document
        .get_mut(PAYLOAD_KEY)
        .and_then(|payload| payload.get_mut("response"))
        .and_then(|response| response.get_mut(list_key))
        .and_then(|list| list.get_mut(record_key))
        .map(Value::take);

    let records = match node {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(record) => vec![record],
    };
    Records::new(records, limit)
}

/// Apply an endpoint's result shape to a decoded document.
pub fn records_for(shape: ResultShape, document: Value) -> Records {
    match shape {
        ResultShape::SingleEntity => Records::single(document),
        ResultShape::List {
            list_key,
            record_key,
        } => extract_records(document, list_key, record_key, None),
    }
}
