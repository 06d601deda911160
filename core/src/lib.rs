//! Synchronous client core for the ABN Lookup XML search service.
//!
//! # Overview
//! Nine search methods, one remote endpoint each. A call builds a query
//! string, performs one blocking GET, decodes the XML body into a generic
//! `serde_json::Value` tree and hands back the endpoint's records as a
//! single-pass `Records` iterator.
//!
//! # Design
//! - `AbnLookupClient` carries only read-only configuration: base URL,
//!   authentication GUID and a debug-logging flag.
//! - Each search is split into `build_*` (produces an `HttpRequest`) and
//!   `parse` (consumes an `HttpResponse`), with a `Transport` in between, so
//!   request construction and decoding can be tested without a network.
//! - Optional parameters are always sent, empty ones as empty values.
//! - No retries, timeouts or caching: any failure ends the call.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod params;
pub mod records;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::AbnLookupClient;
pub use config::ClientConfig;
pub use endpoint::{Endpoint, ResultShape, DEFAULT_BASE_URL, PAYLOAD_KEY};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use params::QueryParams;
pub use records::{extract_records, Records};
pub use transport::{Transport, UreqTransport};
pub use types::{AdvancedNameSearch, EventWindow, FilterCriteria, NameSearch, State, YesNo};
