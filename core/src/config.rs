//! Client configuration.

use crate::endpoint::DEFAULT_BASE_URL;

/// Everything a client needs, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix of every endpoint URL, without the method name.
    pub base_url: String,
    /// Sent as `authenticationGuid` on every request.
    pub authentication_guid: String,
    /// Log each request and response at debug level.
    pub debug: bool,
}

impl ClientConfig {
    pub fn new(authentication_guid: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            authentication_guid: authentication_guid.into(),
            debug: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
