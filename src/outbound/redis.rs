//! Redis-backed key-value and pub/sub connector.
//!
//! # Responsibilities
//! - Parse `redis://[user:pass@]host[:port][/db]` addresses
//! - Run one command per call over a fresh TCP connection
//! - Map protocol replies onto `TriggerError`
//!
//! # Design Decisions
//! - Connect-use-release: no connection survives a call
//! - Connect and request deadlines are enforced separately
//! - Passwords never appear in logs or error messages

use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use crate::config::TimeoutConfig;
use crate::error::{TriggerError, TriggerResult};
use crate::http::body::Buffer;
use crate::observability::metrics;
use crate::outbound::resp::{encode_command, read_reply, Reply};
use crate::outbound::{KeyValueStore, PubSub};
use crate::resilience::timeouts::with_timeout;

const DEFAULT_PORT: u16 = 6379;

/// A parsed store address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisAddress {
    pub host: String,
    pub port: u16,
    pub db: Option<u32>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RedisAddress {
    pub fn parse(address: &str) -> TriggerResult<Self> {
        let url = url::Url::parse(address)
            .map_err(|e| TriggerError::connection(format!("invalid store address: {e}")))?;

        if url.scheme() != "redis" {
            return Err(TriggerError::connection(format!(
                "unsupported store scheme '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TriggerError::connection("store address has no host"))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();

        let db = match url.path().trim_start_matches('/') {
            "" => None,
            n => Some(n.parse::<u32>().map_err(|_| {
                TriggerError::connection(format!("invalid database index '{n}'"))
            })?),
        };

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        Ok(Self {
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            db,
            username,
            password: url.password().map(str::to_string),
        })
    }

    /// `host:port`, safe to log.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Stateless connector speaking RESP2 to a Redis-compatible server.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl RedisConnector {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
        }
    }

    pub fn from_config(timeouts: &TimeoutConfig) -> Self {
        Self::new(
            Duration::from_secs(timeouts.store_connect_secs),
            Duration::from_secs(timeouts.store_request_secs),
        )
    }

    /// Connect, authenticate, select the database, run one command, disconnect.
    async fn execute(&self, address: &str, command: &[&[u8]]) -> TriggerResult<Reply> {
        let target = RedisAddress::parse(address)?;
        let endpoint = target.endpoint();
        let start = Instant::now();

        let result = self.round_trip(&target, &endpoint, command).await;

        let outcome = match &result {
            Ok(Reply::Error(_)) | Err(_) => "error",
            Ok(_) => "ok",
        };
        metrics::record_outbound("redis", outcome, start);
        tracing::debug!(
            endpoint = %endpoint,
            command = %String::from_utf8_lossy(command[0]),
            outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Store command finished"
        );

        match result? {
            Reply::Error(message) => Err(TriggerError::connection(format!(
                "store at {endpoint} replied with error: {message}"
            ))),
            reply => Ok(reply),
        }
    }

    async fn round_trip(
        &self,
        target: &RedisAddress,
        endpoint: &str,
        command: &[&[u8]],
    ) -> TriggerResult<Reply> {
        let stream = with_timeout(
            self.connect_timeout,
            TcpStream::connect((target.host.as_str(), target.port)),
        )
        .await
        .map_err(|e| TriggerError::connection(format!("connect to {endpoint}: {e}")))?
        .map_err(|e| TriggerError::connection(format!("connect to {endpoint}: {e}")))?;

        let mut stream = BufStream::new(stream);

        let exchange = async {
            if let Some(password) = &target.password {
                let reply = match &target.username {
                    Some(user) => {
                        send(&mut stream, &[b"AUTH", user.as_bytes(), password.as_bytes()]).await?
                    }
                    None => send(&mut stream, &[b"AUTH", password.as_bytes()]).await?,
                };
                expect_ok(reply, "AUTH")?;
            }
            if let Some(db) = target.db {
                let index = db.to_string();
                let reply = send(&mut stream, &[b"SELECT", index.as_bytes()]).await?;
                expect_ok(reply, "SELECT")?;
            }
            send(&mut stream, command).await
        };

        with_timeout(self.request_timeout, exchange)
            .await
            .map_err(|e| TriggerError::connection(format!("request to {endpoint}: {e}")))?
            .map_err(|e| match e {
                TriggerError::Connection { reason } => {
                    TriggerError::connection(format!("{endpoint}: {reason}"))
                }
                other => other,
            })
    }
}

async fn send(stream: &mut BufStream<TcpStream>, command: &[&[u8]]) -> TriggerResult<Reply> {
    let frame = encode_command(command);
    stream
        .write_all(&frame)
        .await
        .map_err(|e| TriggerError::connection(format!("write failed: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| TriggerError::connection(format!("write failed: {e}")))?;
    read_reply(stream)
        .await
        .map_err(|e| TriggerError::connection(e.to_string()))
}

fn expect_ok(reply: Reply, command: &str) -> TriggerResult<()> {
    match reply {
        Reply::Status(_) => Ok(()),
        Reply::Error(message) => Err(TriggerError::connection(format!(
            "{command} rejected: {message}"
        ))),
        other => Err(TriggerError::connection(format!(
            "unexpected {command} reply: {other:?}"
        ))),
    }
}

impl KeyValueStore for RedisConnector {
    fn get<'a>(&'a self, address: &'a str, key: &'a str) -> BoxFuture<'a, TriggerResult<Buffer>> {
        async move {
            match self.execute(address, &[b"GET", key.as_bytes()]).await? {
                Reply::Bulk(Some(bytes)) => Ok(Buffer::from(bytes)),
                Reply::Bulk(None) => Err(TriggerError::NotFound {
                    key: key.to_string(),
                }),
                other => Err(TriggerError::connection(format!(
                    "unexpected GET reply: {other:?}"
                ))),
            }
        }
        .boxed()
    }

    fn set<'a>(
        &'a self,
        address: &'a str,
        key: &'a str,
        value: Buffer,
    ) -> BoxFuture<'a, TriggerResult<()>> {
        async move {
            let reply = self
                .execute(address, &[b"SET", key.as_bytes(), value.as_bytes()])
                .await?;
            expect_ok(reply, "SET")
        }
        .boxed()
    }
}

impl PubSub for RedisConnector {
    fn publish<'a>(
        &'a self,
        address: &'a str,
        channel: &'a str,
        payload: Buffer,
    ) -> BoxFuture<'a, TriggerResult<()>> {
        async move {
            match self
                .execute(address, &[b"PUBLISH", channel.as_bytes(), payload.as_bytes()])
                .await?
            {
                Reply::Integer(_) => Ok(()),
                other => Err(TriggerError::connection(format!(
                    "unexpected PUBLISH reply: {other:?}"
                ))),
            }
        }
        .boxed()
    }
}
