//! Scripted in-memory transport.
//!
//! Routes are keyed by method and path. A route keeps answering with the
//! same reply until it is replaced, which suits polling loops that hit
//! the same endpoints on every tick. Every request is recorded so tests
//! can assert on what was sent (including the `Authorization` value).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{ApiRequest, ApiResponse, Method, Transport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(TransportError),
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct MemoryState {
    routes: HashMap<(Method, String), Route>,
    requests: Vec<ApiRequest>,
}

/// A [`Transport`] that answers from a route table instead of the network.
///
/// Cheap to clone; clones share the same routes and request log.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    /// Creates a transport with no routes. Unrouted requests fail with
    /// [`TransportError::NoRoute`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method path` with the given status and body.
    pub fn respond(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.insert(
            method,
            path,
            Route {
                reply: Reply::Respond(ApiResponse {
                    status,
                    body: body.into(),
                }),
                delay: None,
            },
        );
    }

    /// Like [`respond`](Self::respond) but only after `delay` has elapsed
    /// on the Tokio clock.
    pub fn respond_after(
        &self,
        method: Method,
        path: &str,
        delay: Duration,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.insert(
            method,
            path,
            Route {
                reply: Reply::Respond(ApiResponse {
                    status,
                    body: body.into(),
                }),
                delay: Some(delay),
            },
        );
    }

    /// Makes `method path` fail at the transport level.
    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.insert(
            method,
            path,
            Route {
                reply: Reply::Fail(error),
                delay: None,
            },
        );
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// How many times `method path` was requested.
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Forgets the request log (routes are kept).
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn insert(&self, method: Method, path: &str, route: Route) {
        self.lock().routes.insert((method, path.to_string()), route);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding this lock only happens inside a failing
        // test; keep serving the data rather than cascading the panic.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for MemoryTransport {
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let route = {
            let mut state = self.lock();
            state.requests.push(request.clone());
            state
                .routes
                .get(&(request.method, request.path.clone()))
                .cloned()
        };

        let Some(route) = route else {
            return Err(TransportError::NoRoute {
                method: request.method.to_string(),
                path: request.path,
            });
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }

        match route.reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(error) => Err(error),
        }
    }
}
