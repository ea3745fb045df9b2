//! Handlers and the response formatter.
//!
//! # Routes
//! ```text
//! /scroggins → samples::warm      (also the default for unknown paths)
//! /redis     → samples::redis     (key-value set/get + publish)
//! /outbound  → samples::outbound  (outbound HTTP call + report)
//! ```

pub mod diagnostic;
pub mod samples;

use std::sync::Arc;

use crate::config::TriggerConfig;
use crate::outbound::Capabilities;
use crate::routing::{handler, Dispatcher};

use self::samples::{OutboundProbe, RedisTarget};

/// Build the dispatcher serving the sample routes.
pub fn build_dispatcher(config: &TriggerConfig, capabilities: Capabilities) -> Dispatcher {
    let redis_target = Arc::new(RedisTarget::from(&config.samples));
    let probe = Arc::new(OutboundProbe::from(&config.samples));

    Dispatcher::builder(handler(samples::warm), capabilities)
        .route("/scroggins", handler(samples::warm))
        .route(
            "/redis",
            handler(move |req, caps| {
                let target = redis_target.clone();
                async move { samples::redis(&target, req, caps).await }
            }),
        )
        .route(
            "/outbound",
            handler(move |req, caps| {
                let probe = probe.clone();
                async move { samples::outbound(&probe, req, caps).await }
            }),
        )
        .verbose_errors(config.dispatch.verbose_errors)
        .build()
}
