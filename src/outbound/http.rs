//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Send an `OutboundRequest` with method, headers, query and body
//! - Enforce the allowed-hosts capability before any I/O
//! - Return every status as an ordinary `Response`
//!
//! # Design Decisions
//! - Non-2xx statuses are not errors; the handler decides
//! - Transport failures (bad URL, refused, timeout) are `TriggerError::Transport`
//! - No retries

use std::time::{Duration, Instant};

use crate::config::{OutboundConfig, TimeoutConfig};
use crate::error::{TriggerError, TriggerResult};
use crate::http::body::Buffer;
use crate::http::headers::KeyValues;
use crate::http::request::OutboundRequest;
use crate::http::response::Response;
use crate::observability::metrics;

/// Hosts an outbound request may reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedHosts {
    Any,
    /// Lowercased `host` or `host:port` entries.
    List(Vec<String>),
}

impl AllowedHosts {
    pub fn from_entries(entries: &[String]) -> Self {
        if entries.iter().any(|e| e == "*") {
            AllowedHosts::Any
        } else {
            AllowedHosts::List(entries.iter().map(|e| e.to_lowercase()).collect())
        }
    }

    pub fn allows(&self, url: &url::Url) -> bool {
        match self {
            AllowedHosts::Any => true,
            AllowedHosts::List(entries) => {
                let Some(host) = url.host_str() else {
                    return false;
                };
                let host = host.to_lowercase();
                let with_port = url
                    .port_or_known_default()
                    .map(|p| format!("{host}:{p}"));
                entries
                    .iter()
                    .any(|e| *e == host || Some(e) == with_port.as_ref())
            }
        }
    }
}

/// HTTP client handed to handlers through their capabilities.
#[derive(Debug, Clone)]
pub struct OutboundHttp {
    client: reqwest::Client,
    allowed: AllowedHosts,
}

impl OutboundHttp {
    pub fn new(config: &OutboundConfig, timeouts: &TimeoutConfig) -> TriggerResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.outbound_connect_secs))
            .timeout(Duration::from_secs(timeouts.outbound_request_secs))
            .user_agent(config.user_agent.clone())
            .no_proxy()
            .build()
            .map_err(|e| TriggerError::transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            allowed: AllowedHosts::from_entries(&config.allowed_hosts),
        })
    }

    /// Send `req` and wait for the full response.
    pub async fn send(&self, req: OutboundRequest) -> TriggerResult<Response> {
        let mut url = url::Url::parse(&req.url)
            .map_err(|e| TriggerError::transport(format!("invalid URL '{}': {e}", req.url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TriggerError::transport(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        if !self.allowed.allows(&url) {
            return Err(TriggerError::transport(format!(
                "destination not allowed: {}",
                url.host_str().unwrap_or_default()
            )));
        }
        if !req.params.is_empty() {
            url.query_pairs_mut().extend_pairs(req.params.iter());
        }

        let method = req.method;
        let target = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
        let mut builder = self.client.request(method.into(), url);
        for (name, value) in req.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = req.body {
            builder = builder.body(body.into_bytes());
        }

        let start = Instant::now();
        let result = Self::execute(builder).await;
        metrics::record_outbound("http", if result.is_ok() { "ok" } else { "error" }, start);

        match &result {
            Ok(resp) => tracing::debug!(
                method = %method,
                target = %target,
                status = resp.status(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Outbound request completed"
            ),
            Err(e) => tracing::warn!(
                method = %method,
                target = %target,
                error = %e,
                "Outbound request failed"
            ),
        }
        result
    }

    async fn execute(builder: reqwest::RequestBuilder) -> TriggerResult<Response> {
        let resp = builder.send().await.map_err(transport_error)?;

        let status = resp.status().as_u16();
        let headers: KeyValues = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.bytes().await.map_err(transport_error)?;

        let mut response = Response::new(status).with_body(Buffer::from(body));
        if !headers.is_empty() {
            response = response.with_headers(headers);
        }
        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> TriggerError {
    let kind = if e.is_timeout() {
        "timed out"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_builder() {
        "invalid request"
    } else {
        "request failed"
    };
    // reqwest's Display omits the underlying cause
    let cause = std::error::Error::source(&e)
        .map(|s| format!(": {s}"))
        .unwrap_or_default();
    TriggerError::transport(format!("{kind}: {e}{cause}"))
}
