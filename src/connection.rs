//! TCP and TLS connection management.
//!
//! This module provides the low-level connection abstraction over TCP (and
//! optionally TLS) streams, with buffered RESP protocol I/O. Every new
//! connection is authenticated, switched to the configured database and named
//! before it is handed out.

use std::fmt;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::resp;
use crate::types::Value;

/// Default read/write buffer size (8 KB).
const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// Configuration for connecting to a RedisBloom-enabled server.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Optional password for AUTH.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Database index to SELECT on connect.
    pub database: u8,
    /// Name announced with `CLIENT SETNAME` on every new connection.
    pub client_name: Option<String>,
    /// Read/write buffer size in bytes.
    pub buffer_size: usize,
    /// Maximum time to wait for the TCP handshake. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Enable TLS (requires the `tls` feature).
    pub tls: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 6379,
            password: None,
            database: 0,
            client_name: None,
            buffer_size: DEFAULT_BUF_SIZE,
            connect_timeout: None,
            tls: false,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("client_name", &self.client_name)
            .field("buffer_size", &self.buffer_size)
            .field("connect_timeout", &self.connect_timeout)
            .field("tls", &self.tls)
            .finish()
    }
}

impl ConnectionConfig {
    /// Create a config for the given host and port.
    pub fn from_addr(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Parse a `host:port` address. The port defaults to 6379 when omitted.
    pub fn parse_addr(addr: &str) -> Result<Self> {
        let mut config = Self::default();
        match addr.rsplit_once(':') {
            Some((host, port)) => {
                config.port = port
                    .parse()
                    .map_err(|_| Error::InvalidArgument(format!("invalid port: {port}")))?;
                if !host.is_empty() {
                    config.host = host.to_string();
                }
            }
            None if !addr.is_empty() => config.host = addr.to_string(),
            None => {}
        }
        Ok(config)
    }

    /// Parse a `redis://[password@]host[:port][/db]` URL.
    ///
    /// `rediss://` enables TLS.
    pub fn from_url(url: &str) -> Result<Self> {
        let (rest, tls) = if let Some(rest) = url.strip_prefix("rediss://") {
            (rest, true)
        } else if let Some(rest) = url.strip_prefix("redis://") {
            (rest, false)
        } else {
            return Err(Error::InvalidArgument(format!("invalid url: {url}")));
        };

        let (password, rest) = match rest.rsplit_once('@') {
            // `user:password@` is accepted; only the password is used.
            Some((auth, rest)) => {
                let password = auth.rsplit_once(':').map_or(auth, |(_, p)| p);
                (Some(password.to_string()), rest)
            }
            None => (None, rest),
        };

        let (host_port, database) = match rest.split_once('/') {
            Some((hp, db)) => (hp, Some(db)),
            None => (rest, None),
        };

        let mut config = Self::parse_addr(host_port)?;
        config.password = password.filter(|p| !p.is_empty());
        config.tls = tls;
        if let Some(db) = database.filter(|db| !db.is_empty()) {
            config.database = db
                .parse()
                .map_err(|_| Error::InvalidArgument(format!("invalid database: {db}")))?;
        }
        Ok(config)
    }

    /// Set the AUTH password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the name announced with `CLIENT SETNAME`.
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Set the database index.
    pub fn with_database(mut self, database: u8) -> Self {
        self.database = database;
        self
    }

    /// Set the TCP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A wrapper around a TCP (or TLS) stream with buffered RESP I/O.
pub struct Connection {
    stream: Stream,
    read_buf: BytesMut,
    write_buf: BytesMut,
    broken: bool,
}

/// Abstraction over plain TCP and TLS streams.
enum Stream {
    Tcp(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl Connection {
    /// Open a new connection using the given configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let addr = config.addr();
        let tcp = match config.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, TcpStream::connect(&addr))
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => TcpStream::connect(&addr).await?,
        };
        tcp.set_nodelay(true).map_err(Error::Io)?;
        debug!(%addr, tls = config.tls, "connected");

        let stream = if config.tls {
            #[cfg(feature = "tls")]
            {
                use std::sync::Arc;
                use tokio_rustls::TlsConnector;

                let mut root_store = rustls::RootCertStore::empty();
                root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

                let tls_config = rustls::ClientConfig::builder()
                    .with_root_certificates(root_store)
                    .with_no_client_auth();

                let connector = TlsConnector::from(Arc::new(tls_config));
                let domain = rustls::pki_types::ServerName::try_from(config.host.clone())
                    .map_err(|e| Error::Protocol(format!("invalid TLS server name: {}", e)))?;

                let tls_stream = connector.connect(domain, tcp).await.map_err(Error::Io)?;
                Stream::Tls(Box::new(tls_stream))
            }
            #[cfg(not(feature = "tls"))]
            {
                return Err(Error::Protocol(
                    "TLS support requires the `tls` feature".into(),
                ));
            }
        } else {
            Stream::Tcp(tcp)
        };

        let mut conn = Self {
            stream,
            read_buf: BytesMut::with_capacity(config.buffer_size),
            write_buf: BytesMut::with_capacity(config.buffer_size),
            broken: false,
        };
        conn.handshake(config).await?;
        Ok(conn)
    }

    async fn handshake(&mut self, config: &ConnectionConfig) -> Result<()> {
        if let Some(ref password) = config.password {
            let reply = self
                .execute(&[Bytes::from("AUTH"), Bytes::copy_from_slice(password.as_bytes())])
                .await?;
            match reply {
                Value::Status(ref s) if s == "OK" => debug!("authenticated"),
                Value::Error(msg) => return Err(Error::Auth(msg)),
                other => {
                    return Err(Error::Auth(format!("unexpected AUTH response: {}", other)))
                }
            }
        }

        if config.database != 0 {
            let reply = self
                .execute(&[
                    Bytes::from("SELECT"),
                    Bytes::from(config.database.to_string()),
                ])
                .await?
                .into_result()?;
            expect_ok("SELECT", reply)?;
        }

        if let Some(ref name) = config.client_name {
            let reply = self
                .execute(&[
                    Bytes::from("CLIENT"),
                    Bytes::from("SETNAME"),
                    Bytes::copy_from_slice(name.as_bytes()),
                ])
                .await?
                .into_result()?;
            expect_ok("CLIENT SETNAME", reply)?;
            debug!(client_name = %name, "connection named");
        }

        Ok(())
    }

    /// Send a command and read exactly one reply.
    ///
    /// Error replies come back as [`Value::Error`]; callers decide how to
    /// surface them. I/O and framing failures mark the connection broken, and
    /// so does dropping the future before the reply has been read.
    pub async fn execute(&mut self, args: &[Bytes]) -> Result<Value> {
        if let Some(keyword) = args.first() {
            trace!(command = %String::from_utf8_lossy(keyword), argc = args.len(), "sending command");
        }
        // Cleared only once a complete reply frame has been consumed.
        self.broken = true;
        let result = match self.send_command(args).await {
            Ok(()) => self.read_response().await,
            Err(e) => Err(e),
        };
        self.broken = match &result {
            Ok(_) => false,
            Err(e) => e.poisons_connection(),
        };
        result
    }

    /// Returns `true` once an I/O or framing error, or an exchange abandoned
    /// mid-flight, left the connection in an unknown state.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    async fn send_command(&mut self, args: &[Bytes]) -> Result<()> {
        self.write_buf.clear();
        resp::encode_command(args, &mut self.write_buf);

        match &mut self.stream {
            Stream::Tcp(tcp) => {
                tcp.write_all(&self.write_buf).await?;
                tcp.flush().await?;
            }
            #[cfg(feature = "tls")]
            Stream::Tls(tls) => {
                tls.write_all(&self.write_buf).await?;
                tls.flush().await?;
            }
        }

        self.write_buf.clear();
        Ok(())
    }

    async fn read_response(&mut self) -> Result<Value> {
        loop {
            if let Some(value) = resp::decode_value(&mut self.read_buf)? {
                return Ok(value);
            }

            let n = match &mut self.stream {
                Stream::Tcp(tcp) => tcp.read_buf(&mut self.read_buf).await?,
                #[cfg(feature = "tls")]
                Stream::Tls(tls) => tls.read_buf(&mut self.read_buf).await?,
            };

            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
        }
    }
}

fn expect_ok(command: &str, reply: Value) -> Result<()> {
    match reply {
        Value::Status(ref s) if s == "OK" => Ok(()),
        other => Err(Error::Protocol(format!(
            "unexpected {} response: {}",
            command, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        let config = ConnectionConfig::parse_addr("redis.internal:6380").unwrap();
        assert_eq!(config.host, "redis.internal");
        assert_eq!(config.port, 6380);

        let config = ConnectionConfig::parse_addr("localhost").unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6379);

        assert!(ConnectionConfig::parse_addr("localhost:port").is_err());
    }

    #[test]
    fn test_from_url() {
        let config = ConnectionConfig::from_url("redis://s3cret@db.example.com:6390/2").unwrap();
        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.port, 6390);
        assert_eq!(config.password.as_deref(), Some("s3cret"));
        assert_eq!(config.database, 2);
        assert!(!config.tls);

        let config = ConnectionConfig::from_url("rediss://default:pw@host").unwrap();
        assert_eq!(config.password.as_deref(), Some("pw"));
        assert_eq!(config.port, 6379);
        assert!(config.tls);

        assert!(ConnectionConfig::from_url("http://host").is_err());
        assert!(ConnectionConfig::from_url("redis://host/db").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::default().with_password("hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"host":"bloom.local","client_name":"bloom-client-1"}"#)
                .unwrap();
        assert_eq!(config.host, "bloom.local");
        assert_eq!(config.port, 6379);
        assert_eq!(config.client_name.as_deref(), Some("bloom-client-1"));
        assert_eq!(config.buffer_size, DEFAULT_BUF_SIZE);
    }
}
