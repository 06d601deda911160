//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe a request and a response as plain data. The client
//! builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; a `Transport` (see `transport.rs`) performs the
//! actual round trip. Every request to the search service is a GET with all
//! inputs in the query string, so a request is just a URL plus headers.

/// A GET request described as plain data.
///
/// `url` already carries the encoded query string, including the
/// authentication GUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
