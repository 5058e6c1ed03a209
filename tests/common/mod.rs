//! Shared test helpers: a scripted RESP server and live-server settings.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use redisbloom::resp::decode_value;
use redisbloom::{AsyncClient, Value};

/// Reply payload that makes the mock drop the connection instead of answering.
pub const HANG_UP: &[u8] = b"";

/// A RESP server that answers each command with the next scripted reply and
/// records every command it receives.
pub struct MockServer {
    pub port: u16,
    commands: Arc<Mutex<Vec<Vec<Bytes>>>>,
    replies: Arc<Mutex<VecDeque<(Duration, Bytes)>>>,
    accepted: Arc<AtomicUsize>,
}

impl MockServer {
    /// Start listening on an ephemeral port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = Self {
            port,
            commands: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            accepted: Arc::new(AtomicUsize::new(0)),
        };

        let commands = server.commands.clone();
        let replies = server.replies.clone();
        let accepted = server.accepted.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(socket, commands.clone(), replies.clone()));
            }
        });

        server
    }

    /// Queue raw reply bytes, answered in order across all connections.
    pub fn reply(&self, raw: &'static [u8]) -> &Self {
        self.reply_bytes(Bytes::from_static(raw))
    }

    /// Queue an owned reply.
    pub fn reply_bytes(&self, raw: impl Into<Bytes>) -> &Self {
        self.replies.lock().push_back((Duration::ZERO, raw.into()));
        self
    }

    /// Queue a reply that is written only after `delay` has elapsed.
    pub fn reply_after(&self, delay: Duration, raw: &'static [u8]) -> &Self {
        self.replies
            .lock()
            .push_back((delay, Bytes::from_static(raw)));
        self
    }

    /// A client with default pool settings pointed at this server.
    pub async fn client(&self) -> AsyncClient {
        AsyncClient::connect("127.0.0.1", self.port).await.unwrap()
    }

    /// Every command received so far, arguments rendered as text.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands
            .lock()
            .iter()
            .map(|args| {
                args.iter()
                    .map(|a| String::from_utf8_lossy(a).into_owned())
                    .collect()
            })
            .collect()
    }

    /// The last command received, arguments rendered as text.
    pub fn last_command(&self) -> Vec<String> {
        self.commands().pop().unwrap_or_default()
    }

    /// Every command received so far, arguments kept as raw bytes.
    pub fn raw_commands(&self) -> Vec<Vec<Bytes>> {
        self.commands.lock().clone()
    }

    /// Number of TCP connections accepted.
    pub fn connections_accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

async fn serve(
    mut socket: TcpStream,
    commands: Arc<Mutex<Vec<Vec<Bytes>>>>,
    replies: Arc<Mutex<VecDeque<(Duration, Bytes)>>>,
) {
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        match socket.read_buf(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        while let Ok(Some(value)) = decode_value(&mut buf) {
            let args = match value {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|v| v.as_bytes().map(Bytes::copy_from_slice))
                    .collect(),
                _ => return,
            };
            commands.lock().push(args);

            let (delay, reply) = replies.lock().pop_front().unwrap_or_else(|| {
                (Duration::ZERO, Bytes::from_static(b"-ERR no scripted reply\r\n"))
            });
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if reply.is_empty() {
                return;
            }
            if socket.write_all(&reply).await.is_err() {
                return;
            }
        }
    }
}

/// Encode a bulk string reply.
pub fn bulk(data: &[u8]) -> Bytes {
    let mut out = format!("${}\r\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    Bytes::from(out)
}

/// Host of a live RedisBloom server, from `REDISBLOOM_TEST_HOST`
/// (default `localhost:6379`).
pub fn live_host() -> String {
    std::env::var("REDISBLOOM_TEST_HOST").unwrap_or_else(|_| "localhost:6379".to_string())
}

/// Password of the live server, from `REDISBLOOM_TEST_PASSWORD`.
pub fn live_password() -> Option<String> {
    std::env::var("REDISBLOOM_TEST_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
}

/// A client connected to the live server, with the database flushed.
pub async fn live_client() -> AsyncClient {
    let client = AsyncClient::new(
        &live_host(),
        "redisbloom-test-client",
        live_password().as_deref(),
    )
    .unwrap();
    client.flush_all().await.unwrap();
    client
}
