//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::{TcpListener, TcpStream};

use http_trigger::config::TriggerConfig;
use http_trigger::handlers::build_dispatcher;
use http_trigger::outbound::resp::{read_reply, Reply};
use http_trigger::outbound::Capabilities;
use http_trigger::{Dispatcher, HttpServer, Shutdown};

/// Bind an ephemeral local port.
pub async fn bind_local() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Start the trigger with `config` on an ephemeral port.
///
/// The server stops when the returned `Shutdown` is triggered or dropped.
pub async fn start_trigger(config: TriggerConfig) -> (SocketAddr, Shutdown) {
    let caps = Capabilities::from_config(&config).unwrap();
    let dispatcher = build_dispatcher(&config, caps);
    start_trigger_with(config, dispatcher).await
}

/// Start the trigger serving `dispatcher` on an ephemeral port.
pub async fn start_trigger_with(
    config: TriggerConfig,
    dispatcher: Dispatcher,
) -> (SocketAddr, Shutdown) {
    let (listener, addr) = bind_local().await;
    let dispatcher = Arc::new(dispatcher);
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, dispatcher);
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    (addr, shutdown)
}

/// What a mock backend saw of one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a programmable mock HTTP backend; returns its address and the
/// requests it received.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Vec<(&'static str, &'static str)>, String)> + Send + 'static,
{
    let (listener, addr) = bind_local().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);
    let log = seen.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_http_request(&mut socket).await {
                            log.lock().unwrap().push(request);
                        }
                        let (status, headers, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let mut response = format!("HTTP/1.1 {status_text}\r\n");
                        for (name, value) in headers {
                            response.push_str(&format!("{name}: {value}\r\n"));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        ));
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    (addr, seen)
}

async fn read_http_request(socket: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();
    let length: usize = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(SeenRequest {
        request_line,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// In-memory state of the mock Redis server.
#[derive(Debug, Default)]
pub struct MockRedis {
    pub values: Mutex<HashMap<Vec<u8>, Bytes>>,
    pub published: Mutex<Vec<(String, Bytes)>>,
    /// AUTH and SELECT commands received, space-joined.
    pub handshakes: Mutex<Vec<String>>,
    /// When set, every data command is answered with `-<message>`.
    pub fail_with: Mutex<Option<String>>,
}

/// Start a mock Redis server speaking enough RESP for AUTH, SELECT, SET, GET
/// and PUBLISH.
pub async fn start_mock_redis() -> (SocketAddr, Arc<MockRedis>) {
    let (listener, addr) = bind_local().await;
    let state = Arc::new(MockRedis::default());
    let shared = state.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let state = shared.clone();
            tokio::spawn(async move {
                let mut stream = BufStream::new(socket);
                while let Ok(Reply::Array(Some(items))) = read_reply(&mut stream).await {
                    let args: Vec<Bytes> = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Reply::Bulk(Some(b)) => Some(b),
                            _ => None,
                        })
                        .collect();
                    let reply = handle_command(&state, &args);
                    if stream.write_all(&reply).await.is_err() || stream.flush().await.is_err() {
                        break;
                    }
                }
            });
        }
    });
    (addr, state)
}

fn handle_command(state: &MockRedis, args: &[Bytes]) -> Vec<u8> {
    let command = args
        .first()
        .map(|c| String::from_utf8_lossy(c).to_ascii_uppercase())
        .unwrap_or_default();
    if matches!(command.as_str(), "AUTH" | "SELECT") {
        let line: Vec<String> = args
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .collect();
        state.handshakes.lock().unwrap().push(line.join(" "));
        return b"+OK\r\n".to_vec();
    }
    if let Some(message) = state.fail_with.lock().unwrap().clone() {
        return format!("-{message}\r\n").into_bytes();
    }

    match (command.as_str(), args.len()) {
        ("SET", 3) => {
            state
                .values
                .lock()
                .unwrap()
                .insert(args[1].to_vec(), args[2].clone());
            b"+OK\r\n".to_vec()
        }
        ("GET", 2) => match state.values.lock().unwrap().get(&args[1][..]) {
            Some(value) => {
                let mut out = format!("${}\r\n", value.len()).into_bytes();
                out.extend_from_slice(value);
                out.extend_from_slice(b"\r\n");
                out
            }
            None => b"$-1\r\n".to_vec(),
        },
        ("PUBLISH", 3) => {
            state.published.lock().unwrap().push((
                String::from_utf8_lossy(&args[1]).into_owned(),
                args[2].clone(),
            ));
            b":0\r\n".to_vec()
        }
        _ => b"-ERR unknown command\r\n".to_vec(),
    }
}
