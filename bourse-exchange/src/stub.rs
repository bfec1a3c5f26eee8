//! Stub transport for testing.
//!
//! Serves canned responses keyed by method and URL path and records every
//! request so tests can assert on what an adapter sent (or that it sent
//! nothing at all).

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::{ExchangeError, ExchangeResult};
use crate::ports::{HttpMethod, HttpResponse, SignedRequest, Transport};

struct StubRoute {
    method: HttpMethod,
    path: String,
    response: HttpResponse,
}

/// Stub transport with canned responses.
///
/// Later registrations for the same route win.
#[derive(Default)]
pub struct StubTransport {
    routes: RwLock<Vec<StubRoute>>,
    requests: RwLock<Vec<SignedRequest>>,
}

impl StubTransport {
    /// Create an empty stub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with a status and raw body.
    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: impl Into<String>) {
        let mut routes = self.routes.write().unwrap();
        routes.push(StubRoute {
            method,
            path: path.to_string(),
            response: HttpResponse {
                status,
                reason: reason_phrase(status).to_string(),
                body: body.into(),
            },
        });
    }

    /// Answer `method path` with 200 and a JSON body.
    pub fn respond_json(&self, method: HttpMethod, path: &str, body: serde_json::Value) {
        self.respond(method, path, 200, body.to_string());
    }

    /// Number of requests executed so far.
    pub fn call_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// All executed requests, oldest first.
    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<SignedRequest> {
        self.requests.read().unwrap().last().cloned()
    }

    /// Requests sent to a given path.
    pub fn requests_to(&self, path: &str) -> Vec<SignedRequest> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|request| request.path() == path)
            .cloned()
            .collect()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        418 => "I'm a teapot",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: SignedRequest) -> ExchangeResult<HttpResponse> {
        let response = {
            let routes = self.routes.read().unwrap();
            routes
                .iter()
                .rev()
                .find(|route| route.method == request.method && route.path == request.path())
                .map(|route| route.response.clone())
        };

        tracing::debug!(method = %request.method, url = %request.url, "Stub: request");
        let missing = format!("no stub response for {} {}", request.method, request.path());
        self.requests.write().unwrap().push(request);

        response.ok_or(ExchangeError::Network(missing))
    }
}
