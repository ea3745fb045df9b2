//! Inbound and outbound request models.
//!
//! # Responsibilities
//! - Represent the method, URL, headers, parameters and optional body
//! - Derive the routing path from the URL on demand
//! - Provide the outbound request shape consumed by the HTTP client
//!
//! # Design Decisions
//! - Requests are immutable once built; builders consume `self`
//! - Body is `Option<Buffer>`: absent and empty are different states
//! - The path is derived lazily, the URL is stored as received

use std::fmt;
use std::str::FromStr;

use crate::http::body::Buffer;
use crate::http::headers::KeyValues;

/// Request methods understood by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}

impl TryFrom<&axum::http::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(method: &axum::http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// An inbound request, as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: String,
    headers: KeyValues,
    params: KeyValues,
    body: Option<Buffer>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: KeyValues::new(),
            params: KeyValues::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: KeyValues) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.append(name, value);
        self
    }

    pub fn with_params(mut self, params: KeyValues) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: impl Into<Buffer>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL stripped of scheme, host, query and fragment.
    pub fn path(&self) -> &str {
        path_of(&self.url)
    }

    pub fn headers(&self) -> &KeyValues {
        &self.headers
    }

    pub fn params(&self) -> &KeyValues {
        &self.params
    }

    pub fn body(&self) -> Option<&Buffer> {
        self.body.as_ref()
    }
}

/// A request sent to an external HTTP endpoint.
///
/// Built fresh for each call and consumed by
/// [`OutboundHttp::send`](crate::outbound::http::OutboundHttp::send).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: KeyValues,
    pub params: KeyValues,
    pub body: Option<Buffer>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: KeyValues::new(),
            params: KeyValues::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Buffer>) -> Self {
        self.body = Some(body.into());
        self
    }
}

fn path_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(scheme_end) => {
            let after_scheme = &url[scheme_end + 3..];
            match after_scheme.find(['/', '?', '#']) {
                Some(i) => &after_scheme[i..],
                None => "",
            }
        }
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = &rest[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
