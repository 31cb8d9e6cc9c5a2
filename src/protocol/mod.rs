//! Protocol module - RPC headers, operation descriptors, and request building.
//!
//! This module implements the coordinator wire format:
//! - Common request/response headers (opcode, status)
//! - One [`Rpc`] descriptor per operation
//! - [`RequestBuffer`] for laying out header + variable-length fields

mod request;
mod rpcs;
mod status;
mod wire_format;

pub use request::{c_str_len, RequestBuffer};
pub use rpcs::{
    CreateTableRpc, DropTableRpc, EnlistServerRequest, EnlistServerResponse, EnlistServerRpc,
    GetServerListRpc, GetTabletMapRpc, OpenTableResponse, OpenTableRpc, PayloadLengthResponse,
    PingRpc, Rpc, ServerType, TableNameRequest,
};
pub use status::Status;
pub use wire_format::{
    HeaderFields, Opcode, RequestCommon, ResponseCommon, REQUEST_COMMON_SIZE,
    RESPONSE_COMMON_SIZE, STATUS_OFFSET,
};
