//! Stand-in for the ABN Lookup XML search service.
//!
//! Serves a canned status and body per endpoint method under the real
//! service path and records every request URI (path plus query string) so
//! tests can assert on exactly what a client sent. Methods without a canned
//! response answer 404.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{OriginalUri, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

pub const SERVICE_PATH: &str = "/abrxmlsearchRPC/AbrXmlSearch.asmx";

pub const SINGLE_ENTITY_XML: &str = include_str!("../fixtures/single_entity.xml");
pub const SEARCH_RESULTS_XML: &str = include_str!("../fixtures/search_results.xml");
pub const ABN_LIST_XML: &str = include_str!("../fixtures/abn_list.xml");

#[derive(Clone, Debug)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Debug, Default)]
struct Inner {
    responses: HashMap<String, Canned>,
    requests: Vec<String>,
}

/// Shared handle to the server's canned responses and request log.
#[derive(Clone, Debug, Default)]
pub struct MockAbr {
    inner: Arc<Mutex<Inner>>,
}

impl MockAbr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample responses for all nine methods.
    pub fn with_fixtures() -> Self {
        let mock = Self::new();
        for method in ["ABRSearchByABN", "ABRSearchByASIC"] {
            mock.respond(method, 200, SINGLE_ENTITY_XML);
        }
        for method in [
            "ABRSearchByNameSimpleProtocol",
            "ABRSearchByNameAdvancedSimpleProtocol",
        ] {
            mock.respond(method, 200, SEARCH_RESULTS_XML);
        }
        for method in [
            "ABRSearchByPostcode",
            "ABRSearchByABNStatus",
            "ABRSearchByCharity",
            "ABRSearchByRegistrationEvent",
            "ABRSearchByUpdateEvent",
        ] {
            mock.respond(method, 200, ABN_LIST_XML);
        }
        mock
    }

    /// Answer `method` with `status` and `body` from now on.
    pub fn respond(&self, method: &str, status: u16, body: impl Into<String>) -> &Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.lock().responses.insert(
            method.to_string(),
            Canned {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// Every request URI seen so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<String> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn app(mock: MockAbr) -> Router {
    Router::new()
        .route(&format!("{SERVICE_PATH}/{{method}}"), get(search))
        .with_state(mock)
}

pub async fn run(listener: TcpListener, mock: MockAbr) -> Result<(), std::io::Error> {
    axum::serve(listener, app(mock)).await
}

/// Serve `mock` on a random local port from a background thread.
pub fn spawn(mock: MockAbr) -> Result<SocketAddr, std::io::Error> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::spawn(move || {
        let result = runtime.block_on(async {
            let listener = TcpListener::from_std(std_listener)?;
            run(listener, mock).await
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "mock server stopped");
        }
    });
    Ok(addr)
}

/// Base URL a client should use to reach a server listening on `addr`.
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}{SERVICE_PATH}")
}

async fn search(
    State(mock): State<MockAbr>,
    Path(method): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let canned = {
        let mut inner = mock.lock();
        inner.requests.push(uri.to_string());
        inner.responses.get(&method).cloned()
    };
    match canned {
        Some(canned) => (
            canned.status,
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            canned.body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
