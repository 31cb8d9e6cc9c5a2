//! Operation descriptors.
//!
//! Each coordinator RPC is a zero-sized marker type implementing [`Rpc`],
//! binding its opcode to the fixed request and response fields that follow
//! the common headers.

use bytes::{Buf, BufMut};

use super::wire_format::{HeaderFields, Opcode, REQUEST_COMMON_SIZE, RESPONSE_COMMON_SIZE};

/// Compile-time description of one RPC kind.
pub trait Rpc {
    /// Opcode written into the request and echoed in the response.
    const OPCODE: Opcode;

    /// Fixed request fields after [`RequestCommon`](super::RequestCommon).
    type Request: HeaderFields;

    /// Fixed response fields after [`ResponseCommon`](super::ResponseCommon).
    type Response: HeaderFields;

    /// Total size of the fixed request header.
    fn request_header_size() -> usize {
        REQUEST_COMMON_SIZE + <Self::Request as HeaderFields>::SIZE
    }

    /// Total size of the fixed response header.
    fn response_header_size() -> usize {
        RESPONSE_COMMON_SIZE + <Self::Response as HeaderFields>::SIZE
    }
}

/// Role a server plays in the cluster.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ServerType {
    Master = 0,
    Backup = 1,
}

impl ServerType {
    /// Decode from the wire; `None` for unknown values.
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(ServerType::Master),
            1 => Some(ServerType::Backup),
            _ => None,
        }
    }
}

/// Request fields for the three name-addressed table RPCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableNameRequest {
    /// Length of the NUL-terminated name that follows, terminator included.
    pub name_length: u32,
}

impl HeaderFields for TableNameRequest {
    const SIZE: usize = 4;

    fn put(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.name_length);
    }

    fn get(buf: &mut impl Buf) -> Self {
        Self {
            name_length: buf.get_u32_le(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTableResponse {
    pub table_id: u32,
}

impl HeaderFields for OpenTableResponse {
    const SIZE: usize = 4;

    fn put(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.table_id);
    }

    fn get(buf: &mut impl Buf) -> Self {
        Self {
            table_id: buf.get_u32_le(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnlistServerRequest {
    /// Raw [`ServerType`] value.
    pub server_type: u32,
    /// Length of the NUL-terminated locator that follows, terminator included.
    pub service_locator_length: u32,
}

impl HeaderFields for EnlistServerRequest {
    const SIZE: usize = 8;

    fn put(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.server_type);
        buf.put_u32_le(self.service_locator_length);
    }

    fn get(buf: &mut impl Buf) -> Self {
        Self {
            server_type: buf.get_u32_le(),
            service_locator_length: buf.get_u32_le(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnlistServerResponse {
    pub server_id: u64,
}

impl HeaderFields for EnlistServerResponse {
    const SIZE: usize = 8;

    fn put(&self, buf: &mut impl BufMut) {
        buf.put_u64_le(self.server_id);
    }

    fn get(buf: &mut impl Buf) -> Self {
        Self {
            server_id: buf.get_u64_le(),
        }
    }
}

/// Response fields for RPCs that return a structured payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLengthResponse {
    /// Number of payload bytes following the header.
    pub length: u32,
}

impl HeaderFields for PayloadLengthResponse {
    const SIZE: usize = 4;

    fn put(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.length);
    }

    fn get(buf: &mut impl Buf) -> Self {
        Self {
            length: buf.get_u32_le(),
        }
    }
}

macro_rules! rpc {
    ($(#[$meta:meta])* $name:ident, $opcode:ident, $req:ty, $resp:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Rpc for $name {
            const OPCODE: Opcode = Opcode::$opcode;
            type Request = $req;
            type Response = $resp;
        }
    };
}

rpc!(
    /// Liveness check.
    PingRpc, Ping, (), ()
);
rpc!(
    /// Create a table by name.
    CreateTableRpc, CreateTable, TableNameRequest, ()
);
rpc!(
    /// Look up a table id by name.
    OpenTableRpc, OpenTable, TableNameRequest, OpenTableResponse
);
rpc!(
    /// Delete a table by name; succeeds if it doesn't exist.
    DropTableRpc, DropTable, TableNameRequest, ()
);
rpc!(
    /// Register a server and obtain its permanent id.
    EnlistServerRpc, EnlistServer, EnlistServerRequest, EnlistServerResponse
);
rpc!(
    /// Fetch the list of live servers.
    GetServerListRpc, GetServerList, (), PayloadLengthResponse
);
rpc!(
    /// Fetch the full tablet map.
    GetTabletMapRpc, GetTabletMap, (), PayloadLengthResponse
);
