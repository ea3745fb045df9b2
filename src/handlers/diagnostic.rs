//! Diagnostic text over requests and responses.
//!
//! The line shapes here are compared verbatim by clients; change them only
//! together with every consumer.

use std::fmt::Write as _;

use crate::error::TriggerResult;
use crate::http::headers::KeyValues;
use crate::http::request::Request;
use crate::http::response::Response;

pub const CONTENT_TYPE: &str = "text/plain";
pub const TEST_HEADER: (&str, &str) = ("X-TestHeader", "this is a test");

/// Describe method, URL, headers, parameters and body of `request`.
///
/// Fails with `Encoding` if the body is present but not UTF-8.
pub fn describe_request(request: &Request) -> TriggerResult<String> {
    let mut text = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(text, "Called with method {}, Url {}", request.method(), request.url());

    for (name, value) in request.headers().iter() {
        let _ = writeln!(text, "Header '{name}' had value '{value}'");
    }
    for (name, value) in request.params().iter() {
        let _ = writeln!(text, "Parameter '{name}' had value '{value}'");
    }

    match request.body() {
        Some(body) => {
            let _ = writeln!(text, "The body (as a string) was: {}\n", body.as_str()?);
        }
        None => text.push_str("The body was empty\n\n"),
    }
    Ok(text)
}

/// Headers as `name=value / name=value`, or `<no headers>`.
pub fn format_headers_short(headers: Option<&KeyValues>) -> String {
    match headers {
        Some(headers) if !headers.is_empty() => headers
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" / "),
        _ => "<no headers>".to_string(),
    }
}

/// A 200 `text/plain` response carrying `text` and the test header.
pub fn text_response(text: impl Into<String>) -> Response {
    Response::ok()
        .with_header("Content-Type", CONTENT_TYPE)
        .with_header(TEST_HEADER.0, TEST_HEADER.1)
        .with_body_text(text)
}
