//! Flat query-parameter list sent with every search.

use crate::types::State;

/// Query parameters in insertion order.
///
/// Values are sent verbatim, empty strings included: the service treats an
/// empty parameter the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, builder style.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    /// Replace every existing value for `key` with a single `value`,
    /// appending if the key is new.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.retain(|(k, _)| k != key);
        self.0.push((key.to_string(), value.into()));
    }

    /// Append one `Y`/`N` flag per state code. Only `selected` gets `Y`.
    pub fn with_state_flags(mut self, selected: Option<State>) -> Self {
        self.0.extend(state_flags(selected));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Expand a single selected state into the eight per-state flags.
pub fn state_flags(selected: Option<State>) -> Vec<(String, String)> {
    State::ALL
        .iter()
        .map(|&state| {
            let flag = if Some(state) == selected { "Y" } else { "N" };
            (state.code().to_string(), flag.to_string())
        })
        .collect()
}
