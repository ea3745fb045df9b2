//! HTTP server setup and wire conversion.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, request ID)
//! - Enforce the body limit and the request deadline
//! - Convert wire requests into `Request` and `Response` back to the wire
//! - Dispatch requests and record metrics and logs for each one
//! - Stop accepting connections on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Request as WireRequest, StatusCode},
    response::{IntoResponse, Response as WireResponse},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::TriggerConfig;
use crate::http::body::Buffer;
use crate::http::headers::KeyValues;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::observability::metrics;
use crate::routing::Dispatcher;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Body returned when a handler response cannot be put on the wire.
const CONVERSION_ERROR: &str = "Internal error converting response";

/// Application state injected into the catch-all handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_size: usize,
    /// Deadline for a handler; past it the request fails with 500.
    pub request_timeout: Duration,
}

/// HTTP front end for the dispatcher.
pub struct HttpServer {
    router: Router,
    config: TriggerConfig,
}

impl HttpServer {
    /// Create a new HTTP server around `dispatcher`.
    pub fn new(config: TriggerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher,
            max_body_size: config.listener.max_body_size,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(x_request_id)),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = crate::lifecycle::signals::ctrl_c() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }
}

/// Catch-all handler: convert, dispatch, convert back.
async fn dispatch_handler(
    State(state): State<AppState>,
    request: WireRequest<Body>,
) -> WireResponse {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method_str = request.method().to_string();
    let path = request.uri().path().to_string();

    let request = match into_request(request, state.max_body_size).await {
        Ok(request) => request,
        Err(rejection) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method_str,
                path = %path,
                status = rejection.0.as_u16(),
                reason = rejection.1,
                "Request rejected"
            );
            metrics::record_request(&method_str, "rejected", rejection.0.as_u16(), start_time);
            return rejection.into_response();
        }
    };

    let route = if state.dispatcher.is_routed(&path) {
        path.as_str()
    } else {
        "default"
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method_str,
        path = %path,
        route,
        "Dispatching request"
    );

    let response = state
        .dispatcher
        .dispatch_within(request, state.request_timeout)
        .await;
    let status = response.status();

    if status >= 500 {
        tracing::error!(
            request_id = %request_id,
            path = %path,
            status,
            error = %String::from_utf8_lossy(
                response.body().map(Buffer::as_bytes).unwrap_or_default()
            ),
            "Handler failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method_str,
            path = %path,
            status,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Request handled"
        );
    }
    metrics::record_request(&method_str, route, status, start_time);

    into_wire_response(response)
}

/// Status and reason for a request that never reached a handler.
#[derive(Debug)]
struct Rejection(StatusCode, &'static str);

impl IntoResponse for Rejection {
    fn into_response(self) -> WireResponse {
        (self.0, self.1).into_response()
    }
}

async fn into_request(request: WireRequest<Body>, limit: usize) -> Result<Request, Rejection> {
    let method = Method::try_from(request.method())
        .map_err(|_| Rejection(StatusCode::METHOD_NOT_ALLOWED, "Method not supported"))?;
    let (parts, body) = request.into_parts();

    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let params: KeyValues = parts
        .uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let headers = headers_from_wire(&parts.headers);

    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| Rejection(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"))?;

    let declares_body = parts.headers.contains_key(header::CONTENT_LENGTH)
        || parts.headers.contains_key(header::TRANSFER_ENCODING);

    let request = Request::new(method, url).with_headers(headers).with_params(params);
    Ok(if bytes.is_empty() && !declares_body {
        request
    } else {
        request.with_body(Buffer::from(bytes))
    })
}

fn headers_from_wire(headers: &HeaderMap) -> KeyValues {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn into_wire_response(response: Response) -> WireResponse {
    let (status, headers, body) = response.into_parts();

    let mut builder = WireResponse::builder().status(status);
    for (name, value) in headers.iter().flat_map(|h| h.iter()) {
        builder = builder.header(name, value);
    }
    let body = body.map(|b| Body::from(b.into_bytes())).unwrap_or_else(Body::empty);

    builder.body(body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid response from handler");
        let mut resp = WireResponse::new(Body::from(CONVERSION_ERROR));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    })
}
