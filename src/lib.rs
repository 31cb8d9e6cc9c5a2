//! # coordinator-client
//!
//! Blocking RPC client for the coordinator of a distributed in-memory
//! storage cluster.
//!
//! The coordinator owns the table namespace, the list of live servers, and
//! the tablet map. This crate encodes requests for those operations, sends
//! them over a caller-supplied [`session::Session`], and turns replies into
//! typed results or named failures.
//!
//! ## Layers
//!
//! - **protocol**: opcodes, status codes, fixed request/response headers
//! - **invoke**: one round trip plus the mandatory status check
//! - **client**: one method per coordinator operation
//! - **session**: framed TCP / Unix-domain transport
//!
//! ## Example
//!
//! ```ignore
//! use coordinator_client::session::{SessionConfig, StreamSession};
//! use coordinator_client::{CoordinatorClient, ServerType};
//!
//! let session = StreamSession::open("tcp: host=coord, port=12246", SessionConfig::default())?;
//! let mut client = CoordinatorClient::new(session);
//!
//! client.create_table("users")?;
//! let table = client.open_table("users")?;
//! let tablets = client.get_tablet_map()?;
//! ```

pub mod codec;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod protocol;
pub mod retry;
pub mod session;
pub mod snapshot;

mod client;

pub use client::{ClientBuilder, CoordinatorClient, ServerId, TableId};
pub use error::{Error, Result, TransportError};
pub use logging::{Log, LogLevel, LogModule, Logger};
pub use protocol::{ServerType, Status};
pub use snapshot::{ServerList, ServerListEntry, Tablet, TabletState, Tablets};
