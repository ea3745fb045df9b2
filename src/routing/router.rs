//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the path → handler table and the default handler
//! - Invoke exactly one handler per request
//! - Turn every failure into a well-formed 500 response
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact path lookup via HashMap; no patterns, no wildcards
//! - A miss falls back to the default handler, never to a 404
//! - Handler panics are caught and reported like errors
//! - No logging here; the host adapter logs the returned response

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::{TriggerError, TriggerResult};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::outbound::Capabilities;
use crate::resilience::timeouts::with_timeout;

/// Future returned by a handler.
pub type HandlerFuture = BoxFuture<'static, TriggerResult<Response>>;

/// A request handler: owns the request, receives the caller's capabilities.
pub type HandlerFn = Arc<dyn Fn(Request, Capabilities) -> HandlerFuture + Send + Sync>;

/// Wrap an async function or closure as a [`HandlerFn`].
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Request, Capabilities) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TriggerResult<Response>> + Send + 'static,
{
    Arc::new(move |req, caps| f(req, caps).boxed())
}

/// Maps request paths to handlers and executes them.
#[derive(Clone)]
pub struct Dispatcher {
    routes: HashMap<String, HandlerFn>,
    default: HandlerFn,
    capabilities: Capabilities,
    verbose_errors: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<_> = self.routes.keys().collect();
        paths.sort();
        f.debug_struct("Dispatcher")
            .field("routes", &paths)
            .field("verbose_errors", &self.verbose_errors)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn builder(default: HandlerFn, capabilities: Capabilities) -> DispatcherBuilder {
        DispatcherBuilder {
            routes: HashMap::new(),
            default,
            capabilities,
            verbose_errors: false,
        }
    }

    /// Whether `path` has its own handler (as opposed to the default).
    pub fn is_routed(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Run the handler for `request` and return its response.
    ///
    /// Never fails: errors, panics and out-of-range statuses all become 500.
    pub async fn dispatch(&self, request: Request) -> Response {
        let handler = self
            .routes
            .get(request.path())
            .unwrap_or(&self.default)
            .clone();

        let invocation = AssertUnwindSafe(async move {
            handler(request, self.capabilities.clone()).await
        });

        match invocation.catch_unwind().await {
            Ok(Ok(response)) if response.has_valid_status() => response,
            Ok(Ok(response)) => self.failure(&TriggerError::handler(format!(
                "handler returned invalid status {}",
                response.status()
            ))),
            Ok(Err(err)) => self.failure(&err),
            Err(panic) => self.failure(&TriggerError::handler(panic_message(panic.as_ref()))),
        }
    }

    /// [`dispatch`](Self::dispatch) with a deadline. A handler still running
    /// at `limit` is dropped and the request fails with 500.
    pub async fn dispatch_within(&self, request: Request, limit: Duration) -> Response {
        match with_timeout(limit, self.dispatch(request)).await {
            Ok(response) => response,
            Err(elapsed) => {
                self.failure(&TriggerError::handler(format!("request {elapsed}")))
            }
        }
    }

    fn failure(&self, err: &TriggerError) -> Response {
        Response::internal_error(error_body(err, self.verbose_errors))
    }
}

/// Body of a 500 response for `err`.
pub fn error_body(err: &TriggerError, verbose: bool) -> String {
    if verbose {
        format!("Internal Server Error: {err}")
    } else {
        format!("Internal Server Error: {}", err.kind())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("handler panicked: {detail}")
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    routes: HashMap<String, HandlerFn>,
    default: HandlerFn,
    capabilities: Capabilities,
    verbose_errors: bool,
}

impl DispatcherBuilder {
    /// Register `handler` for the exact path `path`. A later registration
    /// for the same path replaces the earlier one.
    pub fn route(mut self, path: impl Into<String>, handler: HandlerFn) -> Self {
        self.routes.insert(path.into(), handler);
        self
    }

    pub fn verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            routes: self.routes,
            default: self.default,
            capabilities: self.capabilities,
            verbose_errors: self.verbose_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriggerConfig;
    use crate::http::request::Method;

    fn capabilities() -> Capabilities {
        Capabilities::from_config(&TriggerConfig::default()).unwrap()
    }

    fn text(body: &'static str) -> HandlerFn {
        handler(move |_req, _caps| async move { Ok(Response::ok().with_body_text(body)) })
    }

    fn body_of(resp: &Response) -> &str {
        resp.body_text().unwrap().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_exact_match_and_fallback() {
        let dispatcher = Dispatcher::builder(text("default"), capabilities())
            .route("/scroggins", text("warm"))
            .route("/redis", text("redis"))
            .build();

        let resp = dispatcher.dispatch(Request::new(Method::Get, "/redis")).await;
        assert_eq!(body_of(&resp), "redis");

        let resp = dispatcher
            .dispatch(Request::new(Method::Get, "http://host:3000/scroggins?x=1"))
            .await;
        assert_eq!(body_of(&resp), "warm");

        // No prefix or wildcard matching
        for path in ["/redis/extra", "/Redis", "/", "/unknown"] {
            let resp = dispatcher.dispatch(Request::new(Method::Get, path)).await;
            assert_eq!(resp.status(), 200);
            assert_eq!(body_of(&resp), "default", "{path}");
        }

        assert!(dispatcher.is_routed("/redis"));
        assert!(!dispatcher.is_routed("/unknown"));
    }

    #[tokio::test]
    async fn test_error_becomes_500() {
        let failing = handler(|_req, _caps| async {
            Err::<Response, _>(TriggerError::connection("redis://10.0.0.1:6379 refused"))
        });
        let quiet = Dispatcher::builder(failing.clone(), capabilities()).build();
        let verbose = Dispatcher::builder(failing, capabilities())
            .verbose_errors(true)
            .build();

        let resp = quiet.dispatch(Request::new(Method::Get, "/")).await;
        assert_eq!(resp.status(), 500);
        assert!(resp.headers().is_none());
        assert_eq!(body_of(&resp), "Internal Server Error: connection error");

        let resp = verbose.dispatch(Request::new(Method::Get, "/")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(
            body_of(&resp),
            "Internal Server Error: connection error: redis://10.0.0.1:6379 refused"
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let panicking = handler(|req: Request, _caps| async move {
            if req.path() == "/boom" {
                panic!("exploded");
            }
            Ok(Response::ok())
        });
        let dispatcher = Dispatcher::builder(panicking, capabilities())
            .verbose_errors(true)
            .build();

        let resp = dispatcher.dispatch(Request::new(Method::Get, "/boom")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(
            body_of(&resp),
            "Internal Server Error: handler error: handler panicked: exploded"
        );

        // The dispatcher is still usable afterwards
        let resp = dispatcher.dispatch(Request::new(Method::Get, "/fine")).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_invalid_status_becomes_500() {
        let bad = handler(|_req, _caps| async { Ok(Response::new(700)) });
        let dispatcher = Dispatcher::builder(bad, capabilities()).build();

        let resp = dispatcher.dispatch(Request::new(Method::Get, "/")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(body_of(&resp), "Internal Server Error: handler error");
    }

    #[tokio::test]
    async fn test_slow_handler_past_deadline_becomes_500() {
        let slow = handler(|req: Request, _caps| async move {
            if req.path() == "/slow" {
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
            Ok(Response::ok())
        });
        let dispatcher = Dispatcher::builder(slow, capabilities())
            .verbose_errors(true)
            .build();
        let limit = Duration::from_millis(50);

        let resp = dispatcher
            .dispatch_within(Request::new(Method::Get, "/slow"), limit)
            .await;
        assert_eq!(resp.status(), 500);
        assert_eq!(
            body_of(&resp),
            "Internal Server Error: handler error: request timed out after 50ms"
        );

        let resp = dispatcher
            .dispatch_within(Request::new(Method::Get, "/fast"), limit)
            .await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_handler_sees_request_unchanged() {
        let echo = handler(|req: Request, _caps| async move {
            let body = req.body().cloned();
            let resp = Response::new(201).with_header("X-Method", req.method().as_str());
            Ok(match body {
                Some(b) => resp.with_body(b),
                None => resp,
            })
        });
        let dispatcher = Dispatcher::builder(echo, capabilities()).build();

        let resp = dispatcher
            .dispatch(Request::new(Method::Put, "/x").with_body("payload"))
            .await;
        assert_eq!(resp.status(), 201);
        assert_eq!(resp.header("x-method"), Some("PUT"));
        assert_eq!(body_of(&resp), "payload");
    }
}
