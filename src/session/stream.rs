//! Blocking session over a TCP or Unix-domain stream.
//!
//! I/O is driven by a private current-thread tokio runtime; every public
//! call blocks the caller until it completes. The connection is opened
//! lazily by the first `send` and dropped on any transport failure, so the
//! next `send` reconnects. Diagnostics go to an injected [`Log`] under
//! [`LogModule::Transport`].
//!
//! # Example
//!
//! ```ignore
//! use coordinator_client::session::{SessionConfig, StreamSession};
//! use coordinator_client::CoordinatorClient;
//!
//! let session = StreamSession::open("tcp: host=127.0.0.1, port=12246", SessionConfig::default())?;
//! let mut client = CoordinatorClient::new(session);
//! client.ping()?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::runtime::Runtime;

use super::config::SessionConfig;
use super::frame::{Frame, FrameBuffer, FrameHeader};
use super::locator::ServiceLocator;
use super::Session;
use crate::error::{Error, Result, TransportError};
use crate::logging::{log_at, Log, LogLevel, LogModule, Logger};

/// Read chunk size.
const READ_CHUNK: usize = 16 * 1024;

trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Tcp(String),
    #[cfg(unix)]
    Unix(std::path::PathBuf),
}

impl Target {
    fn from_locator(locator: &ServiceLocator) -> Result<Option<Self>> {
        match locator.protocol() {
            "tcp" => {
                let host = locator.require("host")?;
                let port: u16 = locator.require("port")?.parse().map_err(|_| {
                    Error::Config(format!("bad port in locator {:?}", locator.original()))
                })?;
                Ok(Some(Target::Tcp(format!("{}:{}", host, port))))
            }
            #[cfg(unix)]
            "unix" => Ok(Some(Target::Unix(locator.require("path")?.into()))),
            _ => Ok(None),
        }
    }

    async fn connect(&self) -> std::result::Result<Box<dyn Connection>, std::io::Error> {
        match self {
            Target::Tcp(addr) => {
                let stream = tokio::net::TcpStream::connect(addr.as_str()).await?;
                stream.set_nodelay(true)?;
                Ok(Box::new(stream))
            }
            #[cfg(unix)]
            Target::Unix(path) => Ok(Box::new(tokio::net::UnixStream::connect(path).await?)),
        }
    }
}

/// Run `fut`, failing with [`TransportError::Timeout`] after `limit`.
async fn within<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = std::result::Result<T, TransportError>>,
) -> std::result::Result<T, TransportError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| TransportError::Timeout(limit))?,
        None => fut.await,
    }
}

/// A [`Session`] to one coordinator endpoint over a byte stream.
pub struct StreamSession {
    locator: ServiceLocator,
    target: Target,
    config: SessionConfig,
    runtime: Runtime,
    logger: Arc<dyn Log>,
    conn: Option<Box<dyn Connection>>,
    frames: FrameBuffer,
    next_request_id: u32,
    /// Request id awaiting its response, if any.
    outstanding: Option<u32>,
}

impl StreamSession {
    /// Prepare a session for the first supported alternative in `locator`.
    ///
    /// No connection is made yet; see [`connect`](Self::connect).
    pub fn open(locator: &str, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let mut chosen = None;
        for alternative in ServiceLocator::parse_all(locator)? {
            if let Some(target) = Target::from_locator(&alternative)? {
                chosen = Some((alternative, target));
                break;
            }
        }
        let (locator, target) = chosen.ok_or_else(|| {
            Error::Config(format!("no supported transport in locator {:?}", locator))
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            frames: FrameBuffer::new(config.max_response_bytes),
            locator,
            target,
            config,
            runtime,
            logger: Arc::new(Logger::default()),
            conn: None,
            next_request_id: 1,
            outstanding: None,
        })
    }

    /// Log through `logger` instead of a default [`Logger`].
    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = logger;
        self
    }

    /// Connect now instead of on the first `send`.
    pub fn connect(&mut self) -> std::result::Result<(), TransportError> {
        let result = self.ensure_connected();
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// The locator alternative this session uses.
    pub fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn ensure_connected(&mut self) -> std::result::Result<(), TransportError> {
        if self.conn.is_some() {
            return Ok(());
        }
        let limit = self.config.connect_timeout();
        let locator = self.locator.to_string();
        let target = &self.target;
        let conn = self
            .runtime
            .block_on(within(Some(limit), async {
                target.connect().await.map_err(|e| TransportError::Connect {
                    locator: locator.clone(),
                    message: e.to_string(),
                })
            }))
            .map_err(|e| match e {
                TransportError::Timeout(_) => TransportError::Connect {
                    locator: locator.clone(),
                    message: format!("timed out after {:?}", limit),
                },
                other => other,
            })?;
        log_at!(
            self.logger,
            LogModule::Transport,
            LogLevel::Debug,
            "connected to coordinator at {}",
            self.locator
        );
        self.conn = Some(conn);
        Ok(())
    }

    /// Forget the connection and any partial input.
    fn reset(&mut self) {
        self.conn = None;
        self.frames.clear();
        self.outstanding = None;
    }

    fn fail(&mut self, err: TransportError) -> TransportError {
        log_at!(
            self.logger,
            LogModule::Transport,
            LogLevel::Warning,
            "dropping connection to {}: {}",
            self.locator,
            err
        );
        self.reset();
        err
    }

    fn write_frame(&mut self, request_id: u32, request: &[u8]) -> std::result::Result<(), TransportError> {
        let length = u32::try_from(request.len()).map_err(|_| {
            TransportError::Protocol(format!("request of {} bytes too large", request.len()))
        })?;
        let header = FrameHeader::new(0, request_id, length);

        let Self {
            runtime,
            conn,
            config,
            ..
        } = self;
        let conn = conn
            .as_mut()
            .ok_or_else(|| TransportError::Unsupported("no connection".to_string()))?;
        runtime.block_on(within(config.rpc_timeout(), write_frame(conn, &header, request)))
    }

    fn read_frame(&mut self, request_id: u32) -> std::result::Result<Bytes, TransportError> {
        let Self {
            runtime,
            conn,
            config,
            frames,
            ..
        } = self;
        let conn = conn
            .as_mut()
            .ok_or_else(|| TransportError::Unsupported("no connection".to_string()))?;
        let frame = runtime.block_on(within(config.rpc_timeout(), read_frame(conn, frames)))?;

        if !frame.header.is_response() {
            return Err(TransportError::Protocol(
                "received a request frame instead of a response".to_string(),
            ));
        }
        if frame.header.request_id != request_id {
            return Err(TransportError::Protocol(format!(
                "response for request {} while waiting for {}",
                frame.header.request_id, request_id
            )));
        }
        if !frames.is_empty() {
            return Err(TransportError::Protocol(format!(
                "{} trailing bytes after response",
                frames.len()
            )));
        }
        Ok(frame.payload)
    }
}

async fn write_frame(
    conn: &mut Box<dyn Connection>,
    header: &FrameHeader,
    body: &[u8],
) -> std::result::Result<(), TransportError> {
    conn.write_all(&header.encode()).await?;
    conn.write_all(body).await?;
    conn.flush().await?;
    Ok(())
}

/// Read until exactly one frame is complete.
async fn read_frame(
    conn: &mut Box<dyn Connection>,
    frames: &mut FrameBuffer,
) -> std::result::Result<Frame, TransportError> {
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = conn.read(&mut chunk).await?;
        if n == 0 {
            return Err(TransportError::Closed);
        }
        let mut complete = frames.push(&chunk[..n])?;
        match complete.len() {
            0 => continue,
            1 => return Ok(complete.remove(0)),
            extra => {
                return Err(TransportError::Protocol(format!(
                    "{} frames received for one request",
                    extra
                )))
            }
        }
    }
}

impl Session for StreamSession {
    fn send(&mut self, request: Bytes) -> std::result::Result<(), TransportError> {
        if let Some(stale) = self.outstanding {
            // Its response may still arrive; only a fresh connection is safe.
            log_at!(
                self.logger,
                LogModule::Transport,
                LogLevel::Notice,
                "abandoning unanswered request {} to {}",
                stale,
                self.locator
            );
            self.reset();
        }
        if let Err(e) = self.ensure_connected() {
            return Err(self.fail(e));
        }

        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);

        match self.write_frame(request_id, &request) {
            Ok(()) => {
                self.outstanding = Some(request_id);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn receive(&mut self) -> std::result::Result<Bytes, TransportError> {
        let request_id = self.outstanding.take().ok_or_else(|| {
            TransportError::Unsupported("receive called with no request outstanding".to_string())
        })?;
        self.read_frame(request_id).map_err(|e| self.fail(e))
    }
}
