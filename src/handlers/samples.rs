//! Sample handlers served by the trigger.
//!
//! - `warm`: echoes a diagnostic of the request (also the default route)
//! - `redis`: stores the body, reads it back, publishes it
//! - `outbound`: calls an external endpoint and reports what happened

use crate::config::{SamplesConfig, StatusBand};
use crate::error::{TriggerError, TriggerResult};
use crate::handlers::diagnostic::{describe_request, format_headers_short, text_response};
use crate::http::request::{Method, OutboundRequest, Request};
use crate::http::response::Response;
use crate::outbound::Capabilities;

/// Diagnostic echo of the inbound request.
pub async fn warm(request: Request, _caps: Capabilities) -> TriggerResult<Response> {
    Ok(text_response(describe_request(&request)?))
}

/// Where `/redis` keeps and announces the payload.
#[derive(Debug, Clone)]
pub struct RedisTarget {
    pub address: String,
    pub key: String,
    pub channel: String,
}

impl From<&SamplesConfig> for RedisTarget {
    fn from(config: &SamplesConfig) -> Self {
        Self {
            address: config.redis_address.clone(),
            key: config.redis_key.clone(),
            channel: config.redis_channel.clone(),
        }
    }
}

/// Set the body under the configured key, read it back, publish it.
///
/// The response body is the value read back from the store.
pub async fn redis(
    target: &RedisTarget,
    request: Request,
    caps: Capabilities,
) -> TriggerResult<Response> {
    let payload = request
        .body()
        .cloned()
        .ok_or_else(|| TriggerError::handler("cannot read body"))?;

    caps.kv().set(&target.address, &target.key, payload.clone()).await?;
    let stored = caps.kv().get(&target.address, &target.key).await?;
    let text = stored.to_utf8_string()?;
    caps.pubsub().publish(&target.address, &target.channel, payload).await?;

    Ok(Response::ok().with_body_text(text))
}

/// Target and status predicates for `/outbound`.
#[derive(Debug, Clone)]
pub struct OutboundProbe {
    pub url: String,
    /// Statuses counted as a successful call.
    pub success: StatusBand,
    /// Statuses for which the response body is shown.
    pub show_body: StatusBand,
}

impl From<&SamplesConfig> for OutboundProbe {
    fn from(config: &SamplesConfig) -> Self {
        Self {
            url: config.outbound_url.clone(),
            success: config.outbound_success,
            show_body: config.outbound_show_body,
        }
    }
}

impl OutboundProbe {
    fn request(&self) -> OutboundRequest {
        OutboundRequest::new(Method::Delete, self.url.clone())
            .with_header("X-Outbound-Test", "From Rust")
            .with_header("Accept", "text/plain")
            .with_param("myquery", "qqq")
            .with_body("see the little goblin, see his little feet")
    }

    /// One report line for the outcome of the outbound call.
    pub fn report(&self, outcome: TriggerResult<Response>) -> String {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => return format!("Onbound call exception {e}"),
        };

        let status = response.status();
        if !self.success.contains(status) {
            return format!("Tragically the onbound request failed with code {status}\n");
        }

        let text = if self.show_body.contains(status) {
            match response.body_text() {
                Ok(text) => text.unwrap_or_default().to_string(),
                Err(e) => return format!("Onbound call exception {e}"),
            }
        } else {
            "<error>".to_string()
        };
        let headers = response.headers();
        format!(
            "The onbound request returned status {status} with {} headers ({}) and the body was:\n{text}\n",
            headers.map_or(0, |h| h.len()),
            format_headers_short(headers),
        )
    }
}

/// Call the configured endpoint, then describe both requests.
pub async fn outbound(
    probe: &OutboundProbe,
    request: Request,
    caps: Capabilities,
) -> TriggerResult<Response> {
    let outcome = caps.http().send(probe.request()).await;
    let report = probe.report(outcome);

    let mut text = describe_request(&request)?;
    text.push_str(&report);
    text.push('\n');
    Ok(text_response(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::Buffer;

    fn probe() -> OutboundProbe {
        OutboundProbe::from(&SamplesConfig::default())
    }

    #[test]
    fn test_report_success_with_body() {
        let resp = Response::ok()
            .with_header("content-type", "text/plain")
            .with_body_text("hello");
        assert_eq!(
            probe().report(Ok(resp)),
            "The onbound request returned status 200 with 1 headers (content-type=text/plain) \
             and the body was:\nhello\n"
        );
    }

    #[test]
    fn test_report_success_band_and_display_band_are_independent() {
        let resp = Response::new(204);
        assert_eq!(
            probe().report(Ok(resp.clone())),
            "The onbound request returned status 204 with 0 headers (<no headers>) \
             and the body was:\n<error>\n"
        );

        let wide = OutboundProbe {
            show_body: StatusBand::new(200, 299),
            ..probe()
        };
        assert!(wide.report(Ok(resp)).ends_with("the body was:\n\n"));
    }

    #[test]
    fn test_report_failure_status() {
        assert_eq!(
            probe().report(Ok(Response::new(404).with_body_text("nope"))),
            "Tragically the onbound request failed with code 404\n"
        );
    }

    #[test]
    fn test_report_transport_error() {
        let report = probe().report(Err(TriggerError::transport("connection failed: refused")));
        assert_eq!(
            report,
            "Onbound call exception transport error: connection failed: refused"
        );
    }

    #[test]
    fn test_report_undecodable_body() {
        let resp = Response::ok().with_body(Buffer::from(vec![0xff]));
        assert!(probe().report(Ok(resp)).starts_with("Onbound call exception encoding error"));
    }

    #[test]
    fn test_outbound_request_shape() {
        let req = probe().request();
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.url, "http://127.0.0.1:3001/hibblebibbdle");
        assert_eq!(req.headers.get("accept"), Some("text/plain"));
        assert_eq!(req.params.get("myquery"), Some("qqq"));
        assert!(req.body.is_some());
    }
}
