//! Shared test doubles: an in-memory coordinator and a recording logger.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use bytes::{Buf, Bytes};
use coordinator_client::protocol::{
    CreateTableRpc, DropTableRpc, EnlistServerRequest, EnlistServerResponse, EnlistServerRpc,
    GetServerListRpc, GetTabletMapRpc, HeaderFields, Opcode, OpenTableResponse, OpenTableRpc,
    PayloadLengthResponse, PingRpc, RequestCommon, ResponseCommon, Rpc, Status,
    TableNameRequest, REQUEST_COMMON_SIZE,
};
use coordinator_client::snapshot::serialize_to_response;
use coordinator_client::{
    Log, LogLevel, LogModule, ServerList, ServerListEntry, ServerType, Tablet, TabletState,
    Tablets, TransportError,
};

/// In-memory coordinator reachable through the [`Session`] trait.
///
/// [`Session`]: coordinator_client::session::Session
pub struct StubCoordinator {
    tables: HashMap<String, u32>,
    next_table_id: u32,
    max_tables: usize,
    servers: ServerList,
    next_server_id: u64,
    tablets: Tablets,
    /// Fail this many upcoming sends in transport.
    pub fail_sends: usize,
    /// Serve this many upcoming requests but lose their replies.
    pub fail_receives: usize,
    /// Reply to every request with this status instead of serving it.
    pub force_status: Option<Status>,
    /// Truncate every reply to this many bytes.
    pub truncate_replies: Option<usize>,
    pub sends: usize,
    pending: Option<Bytes>,
}

impl Default for StubCoordinator {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            next_table_id: 0,
            max_tables: usize::MAX,
            servers: ServerList::default(),
            next_server_id: 1,
            tablets: Tablets::default(),
            fail_sends: 0,
            fail_receives: 0,
            force_status: None,
            truncate_replies: None,
            sends: 0,
            pending: None,
        }
    }
}

impl StubCoordinator {
    pub fn with_table_limit(max_tables: usize) -> Self {
        Self {
            max_tables,
            ..Self::default()
        }
    }

    fn reply(opcode: Opcode, status: Status, fields: &impl HeaderFields, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        ResponseCommon::new(opcode, status).put(&mut buf);
        fields.put(&mut buf);
        buf.extend_from_slice(payload);
        buf
    }

    fn status_only(opcode: Opcode, status: Status) -> Vec<u8> {
        Self::reply(opcode, status, &(), b"")
    }

    /// A full-size reply to `opcode` with zeroed fields.
    fn forced(opcode: Opcode, status: Status) -> Vec<u8> {
        let size = match opcode {
            Opcode::Ping => PingRpc::response_header_size(),
            Opcode::CreateTable => CreateTableRpc::response_header_size(),
            Opcode::OpenTable => OpenTableRpc::response_header_size(),
            Opcode::DropTable => DropTableRpc::response_header_size(),
            Opcode::EnlistServer => EnlistServerRpc::response_header_size(),
            Opcode::GetServerList => GetServerListRpc::response_header_size(),
            Opcode::GetTabletMap => GetTabletMapRpc::response_header_size(),
        };
        let mut buf = Self::status_only(opcode, status);
        buf.resize(size, 0);
        buf
    }

    fn c_str(mut body: &[u8], length: u32) -> String {
        let length = (length as usize).min(body.len());
        body = &body[..length];
        let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        String::from_utf8_lossy(&body[..end]).into_owned()
    }

    fn table_name(request: &[u8]) -> String {
        let mut fields = &request[REQUEST_COMMON_SIZE..];
        let header = TableNameRequest::get(&mut fields);
        Self::c_str(fields, header.name_length)
    }

    fn serve(&mut self, request: &[u8]) -> Vec<u8> {
        let opcode = RequestCommon::decode(request)
            .expect("request carries a known opcode")
            .opcode;
        if let Some(status) = self.force_status {
            return Self::forced(opcode, status);
        }

        match opcode {
            Opcode::Ping => Self::status_only(opcode, Status::Ok),
            Opcode::CreateTable => {
                let name = Self::table_name(request);
                if self.tables.contains_key(&name) {
                    return Self::status_only(opcode, Status::Ok);
                }
                if self.tables.len() >= self.max_tables {
                    return Self::status_only(opcode, Status::NoTableSpace);
                }
                let table_id = self.next_table_id;
                self.next_table_id += 1;
                self.tables.insert(name, table_id);

                let master = self.servers.of_type(ServerType::Master).next().cloned();
                self.tablets.tablet.push(Tablet {
                    table_id,
                    start_object_id: 0,
                    end_object_id: u64::MAX,
                    state: TabletState::Normal,
                    server_id: master.as_ref().map_or(0, |m| m.server_id),
                    service_locator: master.map_or_else(String::new, |m| m.service_locator),
                });
                Self::status_only(opcode, Status::Ok)
            }
            Opcode::OpenTable => match self.tables.get(&Self::table_name(request)) {
                Some(&table_id) => {
                    Self::reply(opcode, Status::Ok, &OpenTableResponse { table_id }, b"")
                }
                None => Self::reply(
                    opcode,
                    Status::TableDoesntExist,
                    &OpenTableResponse { table_id: 0 },
                    b"",
                ),
            },
            Opcode::DropTable => {
                if let Some(table_id) = self.tables.remove(&Self::table_name(request)) {
                    self.tablets.tablet.retain(|t| t.table_id != table_id);
                }
                Self::status_only(opcode, Status::Ok)
            }
            Opcode::EnlistServer => {
                let mut fields = &request[REQUEST_COMMON_SIZE..];
                let header = EnlistServerRequest::get(&mut fields);
                let server_type =
                    ServerType::from_wire(header.server_type).expect("known server type");
                let server_id = self.next_server_id;
                self.next_server_id += 1;
                self.servers.server.push(ServerListEntry {
                    server_type,
                    server_id,
                    service_locator: Self::c_str(fields, header.service_locator_length),
                    backup_read_mbytes_per_sec: None,
                });
                Self::reply(opcode, Status::Ok, &EnlistServerResponse { server_id }, b"")
            }
            Opcode::GetServerList => {
                let mut payload = Vec::new();
                let length = serialize_to_response(&self.servers, &mut payload).unwrap();
                Self::reply(opcode, Status::Ok, &PayloadLengthResponse { length }, &payload)
            }
            Opcode::GetTabletMap => {
                let mut payload = Vec::new();
                let length = serialize_to_response(&self.tablets, &mut payload).unwrap();
                Self::reply(opcode, Status::Ok, &PayloadLengthResponse { length }, &payload)
            }
        }
    }
}

impl coordinator_client::session::Session for StubCoordinator {
    fn send(&mut self, request: Bytes) -> Result<(), TransportError> {
        self.sends += 1;
        if self.fail_sends > 0 {
            self.fail_sends -= 1;
            return Err(TransportError::Connect {
                locator: "tcp: host=coordinator, port=12246".to_string(),
                message: "connection refused".to_string(),
            });
        }
        assert!(request.remaining() >= REQUEST_COMMON_SIZE);
        let mut reply = self.serve(&request);
        if let Some(len) = self.truncate_replies {
            reply.truncate(len);
        }
        self.pending = Some(Bytes::from(reply));
        Ok(())
    }

    fn receive(&mut self) -> Result<Bytes, TransportError> {
        let reply = self.pending.take().ok_or(TransportError::Closed)?;
        if self.fail_receives > 0 {
            self.fail_receives -= 1;
            return Err(TransportError::Timeout(std::time::Duration::from_millis(100)));
        }
        Ok(reply)
    }
}

/// Keeps every line logged through it.
#[derive(Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(LogModule, LogLevel, String)>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<(LogModule, LogLevel, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl Log for RecordingLog {
    fn is_logging(&self, _module: LogModule, _level: LogLevel) -> bool {
        true
    }

    fn log(&self, module: LogModule, level: LogLevel, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push((module, level, args.to_string()));
    }
}
