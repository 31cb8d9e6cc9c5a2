//! Coordinator client and its builder.
//!
//! [`CoordinatorClient`] exposes one blocking method per coordinator RPC.
//! Each call builds a request, performs one round trip over the session,
//! checks the status, and only then reads the response.
//!
//! # Example
//!
//! ```ignore
//! use coordinator_client::{ClientBuilder, LogLevel, ServerType};
//! use coordinator_client::session::{SessionConfig, StreamSession};
//!
//! let session = StreamSession::open("tcp: host=10.0.0.1, port=12246", SessionConfig::default())?;
//! let mut client = ClientBuilder::new()
//!     .log_level(LogLevel::Notice)
//!     .build(session);
//!
//! let server_id = client.enlist_server(ServerType::Master, "tcp: host=10.0.0.2, port=12247")?;
//! client.create_table("users")?;
//! let table = client.open_table("users")?;
//! ```

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::invoke::call;
use crate::logging::{log_at, Log, LogLevel, LogModule, Logger};
use crate::protocol::{
    c_str_len, CreateTableRpc, DropTableRpc, EnlistServerRequest, EnlistServerRpc,
    GetServerListRpc, GetTabletMapRpc, OpenTableRpc, PingRpc, RequestBuffer, Rpc, ServerType,
    TableNameRequest,
};
use crate::retry::retry_on_transport;
use crate::session::Session;
use crate::snapshot::{ServerList, Tablets};

/// Handle for a table, returned by [`CoordinatorClient::open_table`].
pub type TableId = u32;

/// Permanent, never-reused server identity from [`CoordinatorClient::enlist_server`].
pub type ServerId = u64;

/// Builder for configuring a [`CoordinatorClient`].
pub struct ClientBuilder {
    logger: Arc<dyn Log>,
}

impl ClientBuilder {
    /// A builder logging through a default [`Logger`] at `Notice`.
    pub fn new() -> Self {
        Self {
            logger: Arc::new(Logger::default()),
        }
    }

    /// Log through `logger` instead of the default.
    pub fn logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = logger;
        self
    }

    /// Use a fresh [`Logger`] with every module at `level`.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.logger = Arc::new(Logger::new(level));
        self
    }

    /// Build a client over `session`.
    pub fn build<S: Session>(self, session: S) -> CoordinatorClient<S> {
        CoordinatorClient {
            session,
            logger: self.logger,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking client for the cluster coordinator.
///
/// One call at a time: every method takes `&mut self` and holds the session
/// for its whole round trip.
pub struct CoordinatorClient<S> {
    session: S,
    logger: Arc<dyn Log>,
}

/// Request for one of the name-addressed table RPCs.
fn table_name_request<R: Rpc<Request = TableNameRequest>>(name: &str) -> Bytes {
    RequestBuffer::new::<R>(&TableNameRequest {
        name_length: c_str_len(name),
    })
    .append_c_str(name)
    .freeze()
}

impl<S: Session> CoordinatorClient<S> {
    /// A client with default settings.
    pub fn new(session: S) -> Self {
        ClientBuilder::new().build(session)
    }

    /// Create a new table.
    ///
    /// # Errors
    ///
    /// `Status(NoTableSpace)`, `Status(InternalError)`, or a transport failure.
    pub fn create_table(&mut self, name: &str) -> Result<()> {
        let request = table_name_request::<CreateTableRpc>(name);
        call::<CreateTableRpc, _>(&mut self.session, request)?;
        Ok(())
    }

    /// Delete a table and everything in it.
    ///
    /// Dropping a table that doesn't exist succeeds without doing anything.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        let request = table_name_request::<DropTableRpc>(name);
        call::<DropTableRpc, _>(&mut self.session, request)?;
        Ok(())
    }

    /// Look up a table by name and return its id.
    ///
    /// # Errors
    ///
    /// `Status(TableDoesntExist)`, `Status(InternalError)`, or a transport failure.
    pub fn open_table(&mut self, name: &str) -> Result<TableId> {
        let request = table_name_request::<OpenTableRpc>(name);
        let response = call::<OpenTableRpc, _>(&mut self.session, request)?;
        Ok(response.header().table_id)
    }

    /// Register this server with the coordinator.
    ///
    /// Transport failures are logged and retried without limit, so this
    /// returns only once the coordinator answers. A non-OK status is
    /// returned immediately. The id returned has never been issued before.
    pub fn enlist_server(
        &mut self,
        server_type: ServerType,
        local_service_locator: &str,
    ) -> Result<ServerId> {
        let Self { session, logger } = self;
        let log: &dyn Log = &**logger;
        let server_id = retry_on_transport(log, || {
            let request = RequestBuffer::new::<EnlistServerRpc>(&EnlistServerRequest {
                server_type: server_type as u32,
                service_locator_length: c_str_len(local_service_locator),
            })
            .append_c_str(local_service_locator)
            .freeze();
            let response = call::<EnlistServerRpc, _>(&mut *session, request)?;
            Ok(response.header().server_id)
        })?;

        log_at!(
            log,
            LogModule::Rpc,
            LogLevel::Debug,
            "enlisted {:?} at {} as server {}",
            server_type,
            local_service_locator,
            server_id
        );
        Ok(server_id)
    }

    /// List all live servers.
    pub fn get_server_list(&mut self) -> Result<ServerList> {
        let request = RequestBuffer::new::<GetServerListRpc>(&()).freeze();
        let response = call::<GetServerListRpc, _>(&mut self.session, request)?;
        response.parse_payload(response.header().length)
    }

    /// Fetch the whole tablet map.
    ///
    /// Each tablet carries the service locator of the master serving it.
    pub fn get_tablet_map(&mut self) -> Result<Tablets> {
        let request = RequestBuffer::new::<GetTabletMapRpc>(&()).freeze();
        let response = call::<GetTabletMapRpc, _>(&mut self.session, request)?;
        response.parse_payload(response.header().length)
    }

    /// Check that the coordinator is alive.
    pub fn ping(&mut self) -> Result<()> {
        let request = RequestBuffer::new::<PingRpc>(&()).freeze();
        call::<PingRpc, _>(&mut self.session, request)?;
        Ok(())
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Give the session back to the caller.
    pub fn into_session(self) -> S {
        self.session
    }
}
