//! Startup orchestration.
//!
//! # Responsibilities
//! - Warm the dispatcher with a synthetic request before traffic arrives

use crate::http::request::{Method, Request};
use crate::routing::Dispatcher;

/// Dispatch one synthetic GET to `path` and return its status.
///
/// Returns `None` when warm-up is disabled (empty path).
pub async fn warm_up(dispatcher: &Dispatcher, path: &str) -> Option<u16> {
    if path.is_empty() {
        tracing::debug!("Warm-up disabled");
        return None;
    }

    let response = dispatcher.dispatch(Request::new(Method::Get, path)).await;
    let status = response.status();
    if response.is_success() {
        tracing::info!(path, status, "Warm-up complete");
    } else {
        tracing::warn!(path, status, "Warm-up request did not succeed");
    }
    Some(status)
}
