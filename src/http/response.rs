//! Response model returned by handlers.
//!
//! # Responsibilities
//! - Carry status, optional headers and optional body
//! - Offer the string view of the body as a projection of the same buffer
//! - Build the plain-text diagnostic and internal-error shapes
//!
//! # Design Decisions
//! - Status is a raw `u16`; the dispatcher enforces the 100..=599 range
//! - Internal-error responses carry no headers, only a text body

use crate::error::TriggerResult;
use crate::http::body::Buffer;
use crate::http::headers::KeyValues;

/// Lowest and highest status codes a response may carry.
pub const STATUS_RANGE: std::ops::RangeInclusive<u16> = 100..=599;

/// A response produced by a handler or an outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Option<KeyValues>,
    body: Option<Buffer>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: None,
            body: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// A 500 response with a text body and no headers.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(500).with_body_text(message)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(KeyValues::new).insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: KeyValues) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_body(mut self, body: impl Into<Buffer>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_body_text(self, text: impl Into<String>) -> Self {
        self.with_body(Buffer::from_string(text))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn has_valid_status(&self) -> bool {
        STATUS_RANGE.contains(&self.status)
    }

    pub fn headers(&self) -> Option<&KeyValues> {
        self.headers.as_ref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|h| h.get(name))
    }

    pub fn body(&self) -> Option<&Buffer> {
        self.body.as_ref()
    }

    /// The body decoded as UTF-8; `None` when there is no body.
    pub fn body_text(&self) -> TriggerResult<Option<&str>> {
        self.body.as_ref().map(Buffer::as_str).transpose()
    }

    pub fn into_parts(self) -> (u16, Option<KeyValues>, Option<Buffer>) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_is_a_view_of_body() {
        let resp = Response::ok().with_body_text("ping");
        assert_eq!(resp.body().map(Buffer::as_bytes), Some(&b"ping"[..]));
        assert_eq!(resp.body_text().unwrap(), Some("ping"));

        let resp = Response::ok();
        assert_eq!(resp.body_text().unwrap(), None);

        let resp = Response::ok().with_body(vec![0xff]);
        assert!(resp.body_text().is_err());
    }

    #[test]
    fn test_header_builder_replaces() {
        let resp = Response::ok()
            .with_header("Content-Type", "text/html")
            .with_header("content-type", "text/plain");

        assert_eq!(resp.headers().map(KeyValues::len), Some(1));
        assert_eq!(resp.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_status_predicates() {
        assert!(Response::new(204).is_success());
        assert!(!Response::new(302).is_success());
        assert!(Response::new(599).has_valid_status());
        assert!(!Response::new(99).has_valid_status());
        assert!(!Response::new(600).has_valid_status());

        let err = Response::internal_error("boom");
        assert_eq!(err.status(), 500);
        assert!(err.headers().is_none());
        assert_eq!(err.body_text().unwrap(), Some("boom"));
    }
}
